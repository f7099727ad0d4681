//! Atomic creation and replacement of a file inside a capability directory.
//!
//! Contents go to a hidden temporary sibling that is fsynced first, so
//! readers observe either no document, the old document, or the complete new
//! one. Replacement renames the sibling over the target; creation links it
//! into place and fails if the target already exists.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use cap_std::fs::{Dir, OpenOptions};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Replace `file_name` in `dir` with `contents`.
///
/// The temporary file is removed on failure; the previous target stays in
/// place.
pub(super) fn replace_file(dir: &Dir, file_name: &str, contents: &[u8]) -> io::Result<()> {
    let tmp_name = write_temp(dir, file_name, contents)?;
    if let Err(err) = rename_over(dir, &tmp_name, file_name) {
        drop(dir.remove_file(&tmp_name));
        return Err(err);
    }
    sync_directory(dir);
    Ok(())
}

/// Create `file_name` in `dir` with `contents` unless it already exists.
///
/// Fails with [`io::ErrorKind::AlreadyExists`] and leaves the existing file
/// untouched when another writer got there first.
pub(super) fn create_file(dir: &Dir, file_name: &str, contents: &[u8]) -> io::Result<()> {
    let tmp_name = write_temp(dir, file_name, contents)?;
    let linked = dir.hard_link(&tmp_name, dir, file_name);
    drop(dir.remove_file(&tmp_name));
    linked?;
    sync_directory(dir);
    Ok(())
}

fn write_temp(dir: &Dir, file_name: &str, contents: &[u8]) -> io::Result<String> {
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());
    let tmp_name = format!(".{file_name}.tmp.{}.{nanos}.{counter}", std::process::id());

    if let Err(err) = write_synced(dir, &tmp_name, contents) {
        drop(dir.remove_file(&tmp_name));
        return Err(err);
    }
    Ok(tmp_name)
}

fn write_synced(dir: &Dir, tmp_name: &str, contents: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = dir.open_with(tmp_name, &options)?;
    file.write_all(contents)?;
    file.sync_all()
}

#[cfg(windows)]
fn rename_over(dir: &Dir, tmp_name: &str, target_name: &str) -> io::Result<()> {
    match dir.remove_file(target_name) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    dir.rename(tmp_name, dir, target_name)
}

#[cfg(not(windows))]
fn rename_over(dir: &Dir, tmp_name: &str, target_name: &str) -> io::Result<()> {
    dir.rename(tmp_name, dir, target_name)
}

/// Best effort: some platforms cannot fsync a directory handle.
fn sync_directory(dir: &Dir) {
    drop(dir.open(".").and_then(|handle| handle.sync_all()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use cap_std::ambient_authority;

    fn open(tmp: &tempfile::TempDir) -> Dir {
        Dir::open_ambient_dir(tmp.path(), ambient_authority()).expect("open temp dir")
    }

    #[test]
    fn replaces_existing_contents() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let dir = open(&tmp);
        replace_file(&dir, "doc.json", b"[]").expect("first write");
        replace_file(&dir, "doc.json", b"[1]").expect("second write");

        assert_eq!(dir.read_to_string("doc.json").expect("read back"), "[1]");
    }

    #[test]
    fn leaves_no_temporary_files_behind() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let dir = open(&tmp);
        replace_file(&dir, "doc.json", b"[]").expect("write");

        let names: Vec<String> = std::fs::read_dir(tmp.path())
            .expect("list dir")
            .filter_map(Result::ok)
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["doc.json".to_owned()]);
    }

    #[test]
    fn failed_rename_keeps_previous_document() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let dir = open(&tmp);
        dir.create_dir("doc.json").expect("occupy target with a directory");

        let result = replace_file(&dir, "doc.json", b"[]");

        assert!(result.is_err());
        assert!(dir.is_dir("doc.json"));
        let leftovers = std::fs::read_dir(tmp.path()).expect("list dir").count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn create_writes_a_missing_document() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let dir = open(&tmp);

        create_file(&dir, "doc.json", b"[]").expect("create");

        assert_eq!(dir.read_to_string("doc.json").expect("read back"), "[]");
        let entries = std::fs::read_dir(tmp.path()).expect("list dir").count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn create_never_overwrites_an_existing_document() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let dir = open(&tmp);
        replace_file(&dir, "doc.json", b"[1]").expect("seed");

        let err = create_file(&dir, "doc.json", b"[]").expect_err("target exists");

        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(dir.read_to_string("doc.json").expect("read back"), "[1]");
        let entries = std::fs::read_dir(tmp.path()).expect("list dir").count();
        assert_eq!(entries, 1);
    }
}
