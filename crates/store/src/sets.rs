//! Membership sets stored as empty keys: `<base>/<scope>/<member>`.
//!
//! Backs restriction lists (who may read a restricted place) and friend lists
//! (who befriended an owner). Sets are append-only; adding is idempotent.

use bytes::Bytes;

use crate::error::Result;
use crate::key::Key;
use crate::namespace::DynNamespace;

#[derive(Debug, Clone)]
pub struct SetStore {
    ns: DynNamespace,
    base: Key,
}

impl SetStore {
    pub fn new(ns: DynNamespace, base: Key) -> Self {
        Self { ns, base }
    }

    fn scope_key(&self, scope: &str) -> Result<Key> {
        self.base.join(scope)
    }

    fn entry_key(&self, scope: &str, member: &str) -> Result<Key> {
        self.scope_key(scope)?.join(member)
    }

    pub async fn is_member(&self, scope: &str, member: &str) -> Result<bool> {
        let key = self.entry_key(scope, member)?;
        self.ns.exists(&key).await
    }

    /// Adds `member` to `scope` and answers the scope.
    pub async fn add_member(&self, scope: &str, member: &str) -> Result<String> {
        let key = self.entry_key(scope, member)?;
        if self.ns.create(&key, Bytes::new()).await? {
            tracing::debug!(set = %self.base, scope, member, "added set member");
        }
        Ok(scope.to_string())
    }

    /// Whether `scope` has any members at all.
    pub async fn has_scope(&self, scope: &str) -> Result<bool> {
        let key = self.scope_key(scope)?;
        self.ns.exists(&key).await
    }

    pub async fn remove_scope(&self, scope: &str) -> Result<bool> {
        let key = self.scope_key(scope)?;
        self.ns.remove_all(&key).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::StoreError;
    use crate::namespace::MemoryNamespace;

    fn restrictions() -> SetStore {
        SetStore::new(
            Arc::new(MemoryNamespace::new()),
            Key::new(["mutable", "restriction"]).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_membership() {
        let sets = restrictions();
        assert!(!sets.is_member("place", "alice").await.unwrap());
        assert!(!sets.has_scope("place").await.unwrap());

        assert_eq!(sets.add_member("place", "alice").await.unwrap(), "place");
        assert!(sets.is_member("place", "alice").await.unwrap());
        assert!(!sets.is_member("place", "bob").await.unwrap());
        assert!(sets.has_scope("place").await.unwrap());
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let sets = restrictions();
        sets.add_member("place", "alice").await.unwrap();
        sets.add_member("place", "alice").await.unwrap();
        assert!(sets.is_member("place", "alice").await.unwrap());

        assert!(sets.remove_scope("place").await.unwrap());
        assert!(!sets.is_member("place", "alice").await.unwrap());
    }

    #[tokio::test]
    async fn test_rejects_bad_segments() {
        let sets = restrictions();
        assert!(matches!(
            sets.add_member("..", "alice").await,
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(
            sets.is_member("place", "a/b").await,
            Err(StoreError::InvalidKey(_))
        ));
    }
}
