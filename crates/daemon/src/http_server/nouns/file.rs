use common::prelude::Collection;

use crate::http_server::error::ApiError;

/// A `<tag>.<extension>` path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NounFile {
    pub tag: String,
    pub extension: String,
}

impl NounFile {
    /// Splits on the last dot. Segments that do not name a file in
    /// `collection` are answered as a missing item.
    pub fn parse(collection: Collection, segment: &str) -> Result<Self, ApiError> {
        match segment.rsplit_once('.') {
            Some((tag, extension)) if !tag.is_empty() && !extension.is_empty() => Ok(Self {
                tag: tag.to_string(),
                extension: extension.to_string(),
            }),
            _ => Err(ApiError::missing_item(collection.name(), segment)),
        }
    }

    /// Like [`NounFile::parse`], for collections that only hold JSON records.
    pub fn json(collection: Collection, segment: &str) -> Result<Self, ApiError> {
        let file = Self::parse(collection, segment)?;
        if file.extension != "json" {
            return Err(ApiError::missing_item(collection.name(), segment));
        }
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let file = NounFile::parse(Collection::Media, "abc.def.png").unwrap();
        assert_eq!(file.tag, "abc.def");
        assert_eq!(file.extension, "png");

        assert!(matches!(
            NounFile::parse(Collection::Thing, "abc"),
            Err(ApiError::MissingItem { .. })
        ));
        assert!(NounFile::parse(Collection::Thing, ".json").is_err());
        assert!(NounFile::parse(Collection::Thing, "abc.").is_err());
    }

    #[test]
    fn test_json_only() {
        assert!(NounFile::json(Collection::Owner, "u.json").is_ok());
        assert!(matches!(
            NounFile::json(Collection::Owner, "u.txt"),
            Err(ApiError::MissingItem { .. })
        ));
    }
}
