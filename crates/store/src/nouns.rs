use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use common::prelude::{Collection, IdentityProvider};
use futures::future::join_all;

use crate::error::Result;
use crate::immutable::ImmutableCollection;
use crate::key::Key;
use crate::mutable::MutableCollection;
use crate::namespace::{DynNamespace, FsNamespace, MemoryNamespace};
use crate::properties::PrivatePropertyStore;
use crate::sets::SetStore;

/// Every store the service needs, sharing one namespace.
#[derive(Debug, Clone)]
pub struct NounStore {
    ns: DynNamespace,
    things: ImmutableCollection,
    media: ImmutableCollection,
    owners: MutableCollection,
    places: MutableCollection,
    restrictions: SetStore,
    friends: SetStore,
    properties: PrivatePropertyStore,
}

impl NounStore {
    pub fn new(ns: DynNamespace, identity: Arc<dyn IdentityProvider>) -> Result<Self> {
        Ok(Self {
            things: ImmutableCollection::new(ns.clone(), Collection::Thing, identity.clone())?,
            media: ImmutableCollection::new(ns.clone(), Collection::Media, identity.clone())?,
            owners: MutableCollection::new(ns.clone(), Collection::Owner, identity.clone())?,
            places: MutableCollection::new(ns.clone(), Collection::Place, identity.clone())?,
            restrictions: SetStore::new(ns.clone(), Key::new(["mutable", "restriction"])?),
            friends: SetStore::new(ns.clone(), Key::new(["mutable", "friend"])?),
            properties: PrivatePropertyStore::new(
                ns.clone(),
                Key::new(["mutable", "userProperties"])?,
                identity,
            ),
            ns,
        })
    }

    /// Opens a store over the directory `root`, creating it if needed.
    pub async fn open(root: impl Into<PathBuf>, identity: Arc<dyn IdentityProvider>) -> Result<Self> {
        let ns = FsNamespace::new(root).await?;
        Self::new(Arc::new(ns), identity)
    }

    pub fn in_memory(identity: Arc<dyn IdentityProvider>) -> Result<Self> {
        Self::new(Arc::new(MemoryNamespace::new()), identity)
    }

    pub fn things(&self) -> &ImmutableCollection {
        &self.things
    }

    pub fn media(&self) -> &ImmutableCollection {
        &self.media
    }

    pub fn owners(&self) -> &MutableCollection {
        &self.owners
    }

    pub fn places(&self) -> &MutableCollection {
        &self.places
    }

    pub fn restrictions(&self) -> &SetStore {
        &self.restrictions
    }

    pub fn friends(&self) -> &SetStore {
        &self.friends
    }

    pub fn properties(&self) -> &PrivatePropertyStore {
        &self.properties
    }

    /// Reads a stored noun from whichever collection holds it.
    pub async fn read(
        &self,
        collection: Collection,
        tag: &str,
        extension: &str,
    ) -> Result<Option<Bytes>> {
        match collection {
            Collection::Thing => self.things.get(tag, extension).await,
            Collection::Media => self.media.get(tag, extension).await,
            Collection::Owner => self.owners.get(tag, extension).await,
            Collection::Place => self.places.get(tag, extension).await,
        }
    }

    pub async fn ready(&self) -> Result<()> {
        self.ns.ready().await
    }

    /// Removes `tag` from every collection, under whatever extensions it is
    /// stored with.
    ///
    /// When anything matched, also drops the tag's friend set, its private
    /// properties and the restriction set of the unprefixed tag. Answers
    /// whether anything matched.
    pub async fn purge(&self, tag: &str) -> Result<bool> {
        let found = join_all(Collection::ALL.into_iter().map(|collection| async move {
            match collection {
                Collection::Thing => self.things.stored_keys(tag).await,
                Collection::Media => self.media.stored_keys(tag).await,
                Collection::Owner => self.owners.stored_keys(tag).await,
                Collection::Place => self.places.stored_keys(tag).await,
            }
        }))
        .await;
        let mut keys = Vec::new();
        for result in found {
            keys.extend(result?);
        }

        let removed = join_all(keys.iter().map(|key| self.ns.remove(key))).await;
        let mut matched = false;
        for result in removed {
            matched |= result?;
        }
        if !matched {
            return Ok(false);
        }

        self.friends.remove_scope(tag).await?;
        self.properties.remove_subject(tag).await?;
        let place = tag.strip_prefix('!').unwrap_or(tag);
        if !place.is_empty() {
            self.restrictions.remove_scope(place).await?;
        }
        tracing::info!(tag, "purged noun");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::prelude::Sha256Identity;

    fn store() -> NounStore {
        NounStore::in_memory(Arc::new(Sha256Identity)).unwrap()
    }

    #[tokio::test]
    async fn test_read_dispatches_by_collection() {
        let store = store();
        store
            .owners()
            .put("u", "json", Bytes::from_static(b"{}"), None, None)
            .await
            .unwrap();
        assert!(store
            .read(Collection::Owner, "u", "json")
            .await
            .unwrap()
            .is_some());
        assert!(store
            .read(Collection::Place, "u", "json")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_purge_removes_dependents() {
        let store = store();
        store
            .places()
            .put("!p", "json", Bytes::from_static(b"{}"), None, None)
            .await
            .unwrap();
        store.restrictions().add_member("p", "alice").await.unwrap();
        store.friends().add_member("!p", "bob").await.unwrap();
        store
            .properties()
            .write("!p", "hashedPassword", "h")
            .await
            .unwrap();

        assert!(store.purge("!p").await.unwrap());
        assert!(store.places().get("!p", "json").await.unwrap().is_none());
        assert!(!store.restrictions().has_scope("p").await.unwrap());
        assert!(!store.friends().has_scope("!p").await.unwrap());
        assert!(store
            .properties()
            .read("!p", "hashedPassword")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_purge_finds_any_extension() {
        let store = store();
        for extension in ["svg+xml", "avif", "json"] {
            store
                .media()
                .put("m", extension, Bytes::from_static(b"<svg/>"))
                .await
                .unwrap();
        }
        store
            .media()
            .put("m.x", "png", Bytes::from_static(b"other"))
            .await
            .unwrap();

        assert!(store.purge("m").await.unwrap());
        assert!(store.media().get("m", "svg+xml").await.unwrap().is_none());
        assert!(store.media().get("m", "avif").await.unwrap().is_none());
        assert!(store.media().get("m.x", "png").await.unwrap().is_some());
        assert!(!store.purge("m").await.unwrap());
    }

    #[tokio::test]
    async fn test_purge_miss_keeps_dependents() {
        let store = store();
        store.restrictions().add_member("p", "alice").await.unwrap();
        assert!(!store.purge("p").await.unwrap());
        assert!(store.restrictions().is_member("p", "alice").await.unwrap());
    }

    #[tokio::test]
    async fn test_ready() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = NounStore::open(temp_dir.path().join("db"), Arc::new(Sha256Identity))
            .await
            .unwrap();
        store.ready().await.unwrap();
    }
}
