use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncWriteExt;

use super::Namespace;
use crate::error::{Result, StoreError};
use crate::key::Key;

/// Namespace rooted at a local directory. Keys map to files beneath it.
#[derive(Debug, Clone)]
pub struct FsNamespace {
    root: PathBuf,
}

impl FsNamespace {
    /// Opens (creating if needed) a namespace rooted at `root`.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        tracing::info!(root = %root.display(), "opened filesystem namespace");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, key: &Key) -> PathBuf {
        key.to_path(&self.root)
    }

    async fn ensure_parent(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Namespace for FsNamespace {
    async fn ready(&self) -> Result<()> {
        match tokio::fs::metadata(&self.root).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(StoreError::Unavailable(format!(
                "{} is not a directory",
                self.root.display()
            ))),
            Err(e) => Err(StoreError::Unavailable(format!(
                "{}: {}",
                self.root.display(),
                e
            ))),
        }
    }

    async fn exists(&self, key: &Key) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.path(key)).await?)
    }

    async fn read(&self, key: &Key) -> Result<Option<Bytes>> {
        match tokio::fs::read(self.path(key)).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, key: &Key, data: Bytes) -> Result<()> {
        let path = self.path(key);
        Self::ensure_parent(&path).await?;
        tokio::fs::write(&path, &data).await?;
        Ok(())
    }

    async fn create(&self, key: &Key, data: Bytes) -> Result<bool> {
        let path = self.path(key);
        Self::ensure_parent(&path).await?;
        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        file.write_all(&data).await?;
        file.sync_all().await?;
        Ok(true)
    }

    async fn link(&self, from: &Key, to: &Key) -> Result<bool> {
        let target = self.path(to);
        Self::ensure_parent(&target).await?;
        match tokio::fs::hard_link(self.path(from), &target).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn rename(&self, from: &Key, to: &Key) -> Result<()> {
        let target = self.path(to);
        Self::ensure_parent(&target).await?;
        tokio::fs::rename(self.path(from), &target).await?;
        Ok(())
    }

    async fn remove(&self, key: &Key) -> Result<bool> {
        match tokio::fs::remove_file(self.path(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove_all(&self, key: &Key) -> Result<bool> {
        let path = self.path(key);
        let meta = match tokio::fs::metadata(&path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        let removed = if meta.is_dir() {
            tokio::fs::remove_dir_all(&path).await
        } else {
            tokio::fs::remove_file(&path).await
        };
        match removed {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, key: &Key) -> Result<Vec<String>> {
        let mut dir = match tokio::fs::read_dir(self.path(key)).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut names = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => tracing::warn!(?name, "skipping non-utf8 entry"),
            }
        }
        names.sort();
        Ok(names)
    }
}
