//! Object store gateway.
//!
//! The pipeline talks to storage only through the [`ObjectStore`] trait, so
//! the extractor and loader can run against a directory tree in production
//! and an in-memory map in tests. Stores are passed in explicitly; nothing in
//! this crate holds a global client.

pub mod local;
pub mod memory;

pub use local::LocalStore;
pub use memory::InMemoryStore;

use thiserror::Error;

/// Structured error types for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("invalid object key '{0}'")]
    InvalidKey(String),

    #[error("I/O error on '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

/// Minimal key/value object store: list by prefix, whole-object get and put.
///
/// Keys are `/`-separated strings. Implementations make no read-after-write
/// promise; the pipeline never reads back what it wrote in the same run.
pub trait ObjectStore: Send + Sync {
    /// Human-readable name of this store, for logs.
    fn name(&self) -> &str;

    /// Keys starting with `prefix`, sorted ascending. An empty prefix lists
    /// the whole store.
    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Full contents of one object.
    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Store one object, replacing any existing object with the same key.
    fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError>;
}
