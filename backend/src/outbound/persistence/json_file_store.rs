//! Record store backed by a single pretty-printed JSON document.
//!
//! The document is a JSON array of records, newest first, written with
//! two-space indentation so it stays readable and diff-friendly. Reads and
//! writes run on the blocking pool; writes replace the file atomically.

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use tracing::{debug, info};

use crate::domain::CollectionRequest;
use crate::domain::ports::{CollectionRequestStore, CollectionRequestStoreError};

use super::atomic_file::{create_file, replace_file};

/// Contents written when the document does not exist yet.
const EMPTY_DOCUMENT: &str = "[]";

/// Default location of the record document, relative to the working
/// directory.
pub const DEFAULT_DATA_PATH: &str = "data/collectes.json";

/// [`CollectionRequestStore`] persisting to one JSON file.
///
/// # Examples
/// ```no_run
/// use backend::outbound::persistence::JsonFileCollectionRequestStore;
///
/// let store = JsonFileCollectionRequestStore::new("data/collectes.json");
/// assert!(store.path().ends_with("collectes.json"));
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileCollectionRequestStore {
    path: PathBuf,
}

impl JsonFileCollectionRequestStore {
    /// Store whose document lives at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CollectionRequestStore for JsonFileCollectionRequestStore {
    async fn load_all(&self) -> Result<Vec<CollectionRequest>, CollectionRequestStoreError> {
        let path = self.path.clone();
        run_blocking(&self.path, move || load_document(&path)).await
    }

    async fn save_all(
        &self,
        records: &[CollectionRequest],
    ) -> Result<(), CollectionRequestStoreError> {
        let encoded = serde_json::to_vec_pretty(records).map_err(|err| {
            CollectionRequestStoreError::io(display(&self.path), format!("encode failed: {err}"))
        })?;
        let count = records.len();
        let path = self.path.clone();
        run_blocking(&self.path, move || save_document(&path, &encoded)).await?;
        debug!(path = %self.path.display(), records = count, "collection request document saved");
        Ok(())
    }
}

async fn run_blocking<T, F>(path: &Path, job: F) -> Result<T, CollectionRequestStoreError>
where
    F: FnOnce() -> Result<T, CollectionRequestStoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(job).await.map_err(|err| {
        CollectionRequestStoreError::io(display(path), format!("blocking task failed: {err}"))
    })?
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

fn io_error(path: &Path) -> impl Fn(io::Error) -> CollectionRequestStoreError + '_ {
    move |err| CollectionRequestStoreError::io(display(path), err.to_string())
}

/// Split `path` into its directory, created on demand, and file name.
fn open_parent(path: &Path) -> io::Result<(Dir, &str)> {
    let file_name = path.file_name().and_then(OsStr::to_str).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "document path must end in a UTF-8 file name",
        )
    })?;
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    Dir::create_ambient_dir_all(parent, ambient_authority())?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

fn load_document(path: &Path) -> Result<Vec<CollectionRequest>, CollectionRequestStoreError> {
    let (dir, file_name) = open_parent(path).map_err(io_error(path))?;
    let contents = match dir.read_to_string(file_name) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            initialise_document(&dir, file_name, path)?
        }
        Err(err) => return Err(io_error(path)(err)),
    };
    serde_json::from_str(&contents)
        .map_err(|err| CollectionRequestStoreError::corrupt(display(path), err.to_string()))
}

/// Write the empty document, or read the one a concurrent writer created.
fn initialise_document(
    dir: &Dir,
    file_name: &str,
    path: &Path,
) -> Result<String, CollectionRequestStoreError> {
    match create_file(dir, file_name, EMPTY_DOCUMENT.as_bytes()) {
        Ok(()) => {
            info!(path = %path.display(), "initialised empty collection request document");
            Ok(EMPTY_DOCUMENT.to_owned())
        }
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            debug!(path = %path.display(), "collection request document appeared concurrently");
            dir.read_to_string(file_name).map_err(io_error(path))
        }
        Err(err) => Err(io_error(path)(err)),
    }
}

fn save_document(path: &Path, encoded: &[u8]) -> Result<(), CollectionRequestStoreError> {
    let (dir, file_name) = open_parent(path).map_err(io_error(path))?;
    replace_file(&dir, file_name, encoded).map_err(io_error(path))
}
