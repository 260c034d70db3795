use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Whether a collection is write-once or replaced in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mutability {
    Immutable,
    Mutable,
}

impl Mutability {
    /// Top-level directory of the namespace this mutability lives under.
    pub fn dir(&self) -> &'static str {
        match self {
            Mutability::Immutable => "immutable",
            Mutability::Mutable => "mutable",
        }
    }
}

/// A named collection of nouns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    /// Content-addressed JSON nouns.
    Thing,
    /// Content-addressed raw bytes (images, text).
    Media,
    /// One record per user, written only by that user.
    Owner,
    /// Client-named records that may be restricted to a set of readers.
    Place,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Owner,
        Collection::Place,
        Collection::Thing,
        Collection::Media,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Collection::Thing => "thing",
            Collection::Media => "media",
            Collection::Owner => "owner",
            Collection::Place => "place",
        }
    }

    pub fn mutability(&self) -> Mutability {
        match self {
            Collection::Thing | Collection::Media => Mutability::Immutable,
            Collection::Owner | Collection::Place => Mutability::Mutable,
        }
    }

    pub fn is_mutable(&self) -> bool {
        self.mutability() == Mutability::Mutable
    }

    /// Noun-style collections hold JSON records carrying an author and timestamp.
    /// Media holds opaque bytes.
    pub fn is_noun(&self) -> bool {
        !matches!(self, Collection::Media)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown collection: {0}")]
pub struct UnknownCollection(pub String);

impl FromStr for Collection {
    type Err = UnknownCollection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "thing" => Ok(Collection::Thing),
            "media" => Ok(Collection::Media),
            "owner" => Ok(Collection::Owner),
            "place" => Ok(Collection::Place),
            other => Err(UnknownCollection(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_collections() {
        for collection in Collection::ALL {
            assert_eq!(collection.name().parse::<Collection>().unwrap(), collection);
        }
        assert!("friend".parse::<Collection>().is_err());
    }

    #[test]
    fn test_mutability() {
        assert_eq!(Collection::Thing.mutability(), Mutability::Immutable);
        assert_eq!(Collection::Media.mutability().dir(), "immutable");
        assert!(Collection::Owner.is_mutable());
        assert!(Collection::Place.is_mutable());
        assert!(!Collection::Media.is_noun());
        assert!(Collection::Thing.is_noun());
    }
}
