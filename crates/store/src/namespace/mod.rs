//! Filesystem-like key/value namespace.
//!
//! Everything the stores need from storage is expressed here: existence,
//! whole-value reads and writes, exclusive creation, exclusive linking,
//! atomic rename, removal and listing of a directory. Sets are keys with empty values, so any
//! ordered or hashed engine that offers these primitives can back the service.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;
use crate::key::Key;

mod fs;
mod memory;

pub use fs::FsNamespace;
pub use memory::MemoryNamespace;

#[async_trait]
pub trait Namespace: Send + Sync + std::fmt::Debug {
    /// Checks that the namespace can serve requests.
    async fn ready(&self) -> Result<()>;

    /// Whether `key` names a value or has children.
    async fn exists(&self, key: &Key) -> Result<bool>;

    /// The whole value at `key`, or `None` if absent.
    async fn read(&self, key: &Key) -> Result<Option<Bytes>>;

    /// Creates or truncates `key` with `data`. Not atomic with respect to readers.
    async fn write(&self, key: &Key, data: Bytes) -> Result<()>;

    /// Creates `key` with `data` only if it does not exist yet.
    /// Answers `false` when it already exists.
    async fn create(&self, key: &Key, data: Bytes) -> Result<bool>;

    /// Makes the value at `from` also visible at `to`, only if `to` does not
    /// exist yet. The value appears at `to` all at once. Answers `false` when
    /// `to` already exists.
    async fn link(&self, from: &Key, to: &Key) -> Result<bool>;

    /// Atomically replaces `to` with the value at `from`.
    async fn rename(&self, from: &Key, to: &Key) -> Result<()>;

    /// Removes the value at `key`. Answers whether anything was removed.
    async fn remove(&self, key: &Key) -> Result<bool>;

    /// Removes `key` and everything beneath it. Answers whether anything was removed.
    async fn remove_all(&self, key: &Key) -> Result<bool>;

    /// Names of the entries directly beneath `key`, sorted. Empty when
    /// nothing lies beneath it.
    async fn list(&self, key: &Key) -> Result<Vec<String>>;
}

pub type DynNamespace = Arc<dyn Namespace>;

/// Keys beneath `dir` named `<tag>.<extension>`. Temporaries carry a further
/// `.<token>` and never match.
pub(crate) async fn stored_keys(ns: &DynNamespace, dir: &Key, tag: &str) -> Result<Vec<Key>> {
    // Rejects tags that are not plain file names.
    dir.join(tag)?;
    let mut keys = Vec::new();
    for name in ns.list(dir).await? {
        if let Some((stem, extension)) = name.rsplit_once('.') {
            if stem == tag && !extension.is_empty() {
                keys.push(dir.join(name)?);
            }
        }
    }
    Ok(keys)
}
