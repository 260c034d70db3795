//! Key-addressed collections replaced in place (owner, place).
//!
//! Each write lands in a temporary created exclusively under a fresh token and
//! is then renamed over the canonical key. Readers see the whole previous
//! record or the whole new one. Concurrent writers are not ordered; the last
//! rename wins.

use std::sync::Arc;

use bytes::Bytes;
use common::prelude::{Collection, IdentityProvider, Receipt};

use crate::error::{Result, StoreError};
use crate::key::Key;
use crate::namespace::{stored_keys, DynNamespace};

#[derive(Debug, Clone)]
pub struct MutableCollection {
    ns: DynNamespace,
    collection: Collection,
    base: Key,
    identity: Arc<dyn IdentityProvider>,
}

impl MutableCollection {
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

    pub async fn put(
        &self,
        tag: &str,
        extension: &str,
        payload: Bytes,
        author: Option<String>,
        timestamp: Option<i64>,
    ) -> Result<Receipt> {
        let key = self.key(tag, extension)?;
        let temp = key.with_suffix(&self.identity.token())?;

        if !self.ns.create(&temp, payload).await? {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("temporary {} already exists", temp),
            )));
        }
        if let Err(e) = self.ns.rename(&temp, &key).await {
            if let Err(cleanup) = self.ns.remove(&temp).await {
                tracing::warn!(key = %temp, error = %cleanup, "failed to remove temporary");
            }
            return Err(e);
        }

        tracing::debug!(%key, "replaced mutable noun");
        Ok(Receipt::new(tag).by(author).at(timestamp))
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

    #[tokio::test]
    async fn test_put_replaces() {
        let ns = Arc::new(MemoryNamespace::new());
        let owners =
            MutableCollection::new(ns.clone(), Collection::Owner, Arc::new(Sha256Identity))
                .unwrap();

        let receipt = owners
            .put("u", "json", Bytes::from_static(b"v1"), Some("u".into()), Some(1))
            .await
            .unwrap();
        assert_eq!(receipt, Receipt::new("u").by(Some("u".into())).at(Some(1)));

        owners
            .put("u", "json", Bytes::from_static(b"v2"), None, None)
            .await
            .unwrap();
        assert_eq!(
            owners.get("u", "json").await.unwrap().unwrap(),
            Bytes::from_static(b"v2")
        );
        assert_eq!(ns.len(), 1);
    }

    #[tokio::test]
    async fn test_restricted_tag_is_a_distinct_key() {
        let ns = Arc::new(MemoryNamespace::new());
        let places =
            MutableCollection::new(ns, Collection::Place, Arc::new(Sha256Identity)).unwrap();

        places
            .put("!p", "json", Bytes::from_static(b"secret"), None, None)
            .await
            .unwrap();
        assert!(places.get("p", "json").await.unwrap().is_none());
        assert!(places.get("!p", "json").await.unwrap().is_some());
        assert_eq!(
            places.key("!p", "json").unwrap().to_string(),
            "mutable/place/!p.json"
        );
    }
}
