//! Per-subject private properties, kept apart from public noun data.

use std::sync::Arc;

use bytes::Bytes;
use common::prelude::IdentityProvider;

use crate::error::{Result, StoreError};
use crate::key::Key;
use crate::namespace::DynNamespace;

#[derive(Debug, Clone)]
pub struct PrivatePropertyStore {
    ns: DynNamespace,
    base: Key,
    identity: Arc<dyn IdentityProvider>,
}

impl PrivatePropertyStore {
    pub fn new(ns: DynNamespace, base: Key, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { ns, base, identity }
    }

    fn key(&self, subject: &str, property: &str) -> Result<Key> {
        self.base.join(subject)?.join(property)
    }

    pub async fn read(&self, subject: &str, property: &str) -> Result<Option<String>> {
        let key = self.key(subject, property)?;
        let Some(data) = self.ns.read(&key).await? else {
            return Ok(None);
        };
        String::from_utf8(data.to_vec())
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                key: key.to_string(),
                reason: e.to_string(),
            })
    }

    /// Replaces the property. Readers see the old or the new value, never a
    /// truncated one.
    pub async fn write(&self, subject: &str, property: &str, value: &str) -> Result<()> {
        let key = self.key(subject, property)?;
        let temp = key.with_suffix(&self.identity.token())?;
        self.ns
            .create(&temp, Bytes::copy_from_slice(value.as_bytes()))
            .await?;
        if let Err(e) = self.ns.rename(&temp, &key).await {
            if let Err(cleanup) = self.ns.remove(&temp).await {
                tracing::warn!(key = %temp, error = %cleanup, "failed to remove temporary");
            }
            return Err(e);
        }
        tracing::debug!(subject, property, "wrote private property");
        Ok(())
    }

    /// Drops every property of `subject`.
    pub async fn remove_subject(&self, subject: &str) -> Result<bool> {
        let key = self.base.join(subject)?;
        self.ns.remove_all(&key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::{MemoryNamespace, Namespace};
    use common::prelude::Sha256Identity;

    fn store(ns: Arc<MemoryNamespace>) -> PrivatePropertyStore {
        PrivatePropertyStore::new(
            ns,
            Key::new(["mutable", "userProperties"]).unwrap(),
            Arc::new(Sha256Identity),
        )
    }

    #[tokio::test]
    async fn test_read_write() {
        let ns = Arc::new(MemoryNamespace::new());
        let props = store(ns.clone());
        assert_eq!(props.read("u", "hashedPassword").await.unwrap(), None);

        props.write("u", "hashedPassword", "abc").await.unwrap();
        props.write("u", "hashedPassword", "def").await.unwrap();
        assert_eq!(
            props.read("u", "hashedPassword").await.unwrap().as_deref(),
            Some("def")
        );
        // No temporaries left behind.
        assert_eq!(ns.len(), 1);

        assert!(props.remove_subject("u").await.unwrap());
        assert_eq!(props.read("u", "hashedPassword").await.unwrap(), None);
    }

    /// Memory namespace whose renames always fail.
    #[derive(Debug, Default)]
    struct RenameFails(MemoryNamespace);

    #[async_trait::async_trait]
    impl Namespace for RenameFails {
        async fn ready(&self) -> Result<()> {
            self.0.ready().await
        }
        async fn exists(&self, key: &Key) -> Result<bool> {
            self.0.exists(key).await
        }
        async fn read(&self, key: &Key) -> Result<Option<Bytes>> {
            self.0.read(key).await
        }
        async fn write(&self, key: &Key, data: Bytes) -> Result<()> {
            self.0.write(key, data).await
        }
        async fn create(&self, key: &Key, data: Bytes) -> Result<bool> {
            self.0.create(key, data).await
        }
        async fn link(&self, from: &Key, to: &Key) -> Result<bool> {
            self.0.link(from, to).await
        }
        async fn rename(&self, _from: &Key, to: &Key) -> Result<()> {
            Err(StoreError::Unavailable(format!("cannot rename onto {}", to)))
        }
        async fn remove(&self, key: &Key) -> Result<bool> {
            self.0.remove(key).await
        }
        async fn remove_all(&self, key: &Key) -> Result<bool> {
            self.0.remove_all(key).await
        }
        async fn list(&self, key: &Key) -> Result<Vec<String>> {
            self.0.list(key).await
        }
    }

    #[tokio::test]
    async fn test_failed_write_removes_temporary() {
        let ns = Arc::new(RenameFails::default());
        let props = PrivatePropertyStore::new(
            ns.clone(),
            Key::new(["mutable", "userProperties"]).unwrap(),
            Arc::new(Sha256Identity),
        );

        assert!(matches!(
            props.write("u", "hashedPassword", "abc").await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(ns.0.is_empty());
    }

    #[tokio::test]
    async fn test_non_utf8_is_corrupt() {
        let ns = Arc::new(MemoryNamespace::new());
        let key = Key::new(["mutable", "userProperties", "u", "p"]).unwrap();
        ns.write(&key, Bytes::from_static(&[0xff, 0xfe])).await.unwrap();
        assert!(matches!(
            store(ns).read("u", "p").await,
            Err(StoreError::Corrupt { .. })
        ));
    }
}
