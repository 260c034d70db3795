use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};

/// A validated, `/`-separated location in a namespace.
///
/// Segments frequently come straight from request paths, so each one is
/// checked to be a plain file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key {
    segments: Vec<String>,
}

fn check_segment(segment: &str) -> Result<()> {
    let bad = segment.is_empty()
        || segment == "."
        || segment == ".."
        || segment.contains(['/', '\\', '\0']);
    if bad {
        return Err(StoreError::InvalidKey(segment.to_string()));
    }
    Ok(())
}

impl Key {
    pub fn new<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(StoreError::InvalidKey(String::new()));
        }
        for segment in &segments {
            check_segment(segment)?;
        }
        Ok(Self { segments })
    }

    /// A child of this key.
    pub fn join(&self, segment: impl Into<String>) -> Result<Self> {
        let segment = segment.into();
        check_segment(&segment)?;
        let mut segments = self.segments.clone();
        segments.push(segment);
        Ok(Self { segments })
    }

    /// A sibling whose last segment is extended with `.suffix`.
    pub fn with_suffix(&self, suffix: &str) -> Result<Self> {
        let mut segments = self.segments.clone();
        if let Some(last) = segments.last_mut() {
            last.push('.');
            last.push_str(suffix);
            check_segment(last)?;
        }
        Ok(Self { segments })
    }

    pub fn parent(&self) -> Option<Self> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_prefix_of(&self, other: &Key) -> bool {
        other.segments.starts_with(&self.segments)
    }

    /// The filesystem path of this key under `root`.
    pub fn to_path(&self, root: &Path) -> PathBuf {
        self.segments
            .iter()
            .fold(root.to_path_buf(), |path, segment| path.join(segment))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_keys() {
        let key = Key::new(["mutable", "place"]).unwrap().join("!abc.json").unwrap();
        assert_eq!(key.to_string(), "mutable/place/!abc.json");
        assert_eq!(key.parent().unwrap().to_string(), "mutable/place");
        assert_eq!(
            key.to_path(Path::new("/db")),
            PathBuf::from("/db/mutable/place/!abc.json")
        );
    }

    #[test]
    fn test_rejects_traversal() {
        let base = Key::new(["immutable", "thing"]).unwrap();
        assert!(base.join("..").is_err());
        assert!(base.join("a/b").is_err());
        assert!(base.join("a\\b").is_err());
        assert!(base.join("").is_err());
        assert!(Key::new(Vec::<String>::new()).is_err());
    }

    #[test]
    fn test_suffix_and_prefix() {
        let key = Key::new(["mutable", "owner", "u.json"]).unwrap();
        let temp = key.with_suffix("token").unwrap();
        assert_eq!(temp.to_string(), "mutable/owner/u.json.token");
        assert!(Key::new(["mutable"]).unwrap().is_prefix_of(&temp));
        assert!(!Key::new(["immutable"]).unwrap().is_prefix_of(&temp));
    }
}
