//! Write-once, content-addressed collections (thing, media).
//!
//! A tag is published by linking a fully written temporary onto the canonical
//! key. The link fails instead of overwriting, so the canonical key appears
//! exactly once and always with its whole content. Existence of that key is
//! the only synchronization between concurrent writers.

use std::sync::Arc;

use bytes::Bytes;
use common::prelude::{Collection, IdentityProvider};

use crate::error::{Result, StoreError};
use crate::key::Key;
use crate::namespace::{stored_keys, DynNamespace};

/// How an immutable put ended. Neither outcome is an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome {
    /// This write published the tag.
    Created,
    /// The tag was already published. For noun collections `existing` holds
    /// the authoritative stored record.
    Exists { existing: Option<Bytes> },
}

#[derive(Debug, Clone)]
pub struct ImmutableCollection {
    ns: DynNamespace,
    collection: Collection,
    base: Key,
    identity: Arc<dyn IdentityProvider>,
}

impl ImmutableCollection {
    pub fn new(
        ns: DynNamespace,
        collection: Collection,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self> {
        let base = Key::new([collection.mutability().dir(), collection.name()])?;
        Ok(Self {
            ns,
            collection,
            base,
            identity,
        })
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub(crate) fn key(&self, tag: &str, extension: &str) -> Result<Key> {
        self.base.join(format!("{}.{}", tag, extension))
    }

    /// Every key `tag` is stored under, whatever its extension.
    pub(crate) async fn stored_keys(&self, tag: &str) -> Result<Vec<Key>> {
        stored_keys(&self.ns, &self.base, tag).await
    }

    /// Stores `payload` under `tag`, which must already be its content digest.
    pub async fn put(&self, tag: &str, extension: &str, payload: Bytes) -> Result<PutOutcome> {
        let key = self.key(tag, extension)?;
        let temp = key.with_suffix(&self.identity.token())?;

        if !self.ns.create(&temp, payload).await? {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("temporary {} already exists", temp),
            )));
        }
        let published = self.ns.link(&temp, &key).await;
        if let Err(e) = self.ns.remove(&temp).await {
            tracing::warn!(key = %temp, error = %e, "failed to remove temporary");
        }

        if published? {
            tracing::debug!(%key, "published immutable noun");
            return Ok(PutOutcome::Created);
        }

        tracing::debug!(%key, "immutable noun already published");
        let existing = if self.collection.is_noun() {
            self.ns.read(&key).await?
        } else {
            None
        };
        Ok(PutOutcome::Exists { existing })
    }

    pub async fn get(&self, tag: &str, extension: &str) -> Result<Option<Bytes>> {
        let key = self.key(tag, extension)?;
        self.ns.read(&key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::MemoryNamespace;
    use common::prelude::Sha256Identity;

    fn collection(ns: Arc<MemoryNamespace>, collection: Collection) -> ImmutableCollection {
        ImmutableCollection::new(ns, collection, Arc::new(Sha256Identity)).unwrap()
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let ns = Arc::new(MemoryNamespace::new());
        let things = collection(ns.clone(), Collection::Thing);

        let outcome = things
            .put("t1", "json", Bytes::from_static(b"{\"a\":1}"))
            .await
            .unwrap();
        assert_eq!(outcome, PutOutcome::Created);
        assert_eq!(
            things.get("t1", "json").await.unwrap().unwrap(),
            Bytes::from_static(b"{\"a\":1}")
        );
        assert!(things.get("t1", "txt").await.unwrap().is_none());
        assert_eq!(ns.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_noun_returns_existing() {
        let ns = Arc::new(MemoryNamespace::new());
        let things = collection(ns.clone(), Collection::Thing);

        things
            .put("t1", "json", Bytes::from_static(b"first"))
            .await
            .unwrap();
        let outcome = things
            .put("t1", "json", Bytes::from_static(b"second"))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            PutOutcome::Exists {
                existing: Some(Bytes::from_static(b"first"))
            }
        );
        assert_eq!(ns.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_media_reports_tag_only() {
        let ns = Arc::new(MemoryNamespace::new());
        let media = collection(ns, Collection::Media);

        media
            .put("m1", "png", Bytes::from_static(b"\x89PNG"))
            .await
            .unwrap();
        let outcome = media
            .put("m1", "png", Bytes::from_static(b"\x89PNG"))
            .await
            .unwrap();
        assert_eq!(outcome, PutOutcome::Exists { existing: None });
    }
}
