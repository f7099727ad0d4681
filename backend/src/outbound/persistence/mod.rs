//! Persistence adapters for the collection request document.

mod atomic_file;
mod json_file_store;

pub use json_file_store::{DEFAULT_DATA_PATH, JsonFileCollectionRequestStore};
