use std::collections::{BTreeMap, BTreeSet};
use std::io::{Error as IoError, ErrorKind};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;

use super::Namespace;
use crate::error::Result;
use crate::key::Key;

/// In-process namespace, used by tests and ephemeral daemons.
///
/// Directories are implicit: a key "exists" if it holds a value or if any
/// stored key lies beneath it. Every operation yields once before touching
/// the map so that concurrent tasks interleave as they would on disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryNamespace {
    entries: Arc<RwLock<BTreeMap<Key, Bytes>>>,
}

impl MemoryNamespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

fn not_found(key: &Key) -> IoError {
    IoError::new(ErrorKind::NotFound, key.to_string())
}

#[async_trait]
impl Namespace for MemoryNamespace {
    async fn ready(&self) -> Result<()> {
        Ok(())
    }

    async fn exists(&self, key: &Key) -> Result<bool> {
        tokio::task::yield_now().await;
        let entries = self.entries.read();
        Ok(entries.contains_key(key) || entries.keys().any(|stored| key.is_prefix_of(stored)))
    }

    async fn read(&self, key: &Key) -> Result<Option<Bytes>> {
        tokio::task::yield_now().await;
        Ok(self.entries.read().get(key).cloned())
    }

    async fn write(&self, key: &Key, data: Bytes) -> Result<()> {
        tokio::task::yield_now().await;
        self.entries.write().insert(key.clone(), data);
        Ok(())
    }

    async fn create(&self, key: &Key, data: Bytes) -> Result<bool> {
        tokio::task::yield_now().await;
        let mut entries = self.entries.write();
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.clone(), data);
        Ok(true)
    }

    async fn link(&self, from: &Key, to: &Key) -> Result<bool> {
        tokio::task::yield_now().await;
        let mut entries = self.entries.write();
        if entries.contains_key(to) {
            return Ok(false);
        }
        let data = entries.get(from).cloned().ok_or_else(|| not_found(from))?;
        entries.insert(to.clone(), data);
        Ok(true)
    }

    async fn rename(&self, from: &Key, to: &Key) -> Result<()> {
        tokio::task::yield_now().await;
        let mut entries = self.entries.write();
        let data = entries.remove(from).ok_or_else(|| not_found(from))?;
        entries.insert(to.clone(), data);
        Ok(())
    }

    async fn remove(&self, key: &Key) -> Result<bool> {
        tokio::task::yield_now().await;
        Ok(self.entries.write().remove(key).is_some())
    }

    async fn remove_all(&self, key: &Key) -> Result<bool> {
        tokio::task::yield_now().await;
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|stored, _| !key.is_prefix_of(stored));
        Ok(entries.len() != before)
    }

    async fn list(&self, key: &Key) -> Result<Vec<String>> {
        tokio::task::yield_now().await;
        let depth = key.segments().len();
        let names: BTreeSet<String> = self
            .entries
            .read()
            .keys()
            .filter(|stored| stored.segments().len() > depth && key.is_prefix_of(stored))
            .map(|stored| stored.segments()[depth].clone())
            .collect();
        Ok(names.into_iter().collect())
    }
}
