//! Reference to a newly uploaded object, as delivered by the trigger.

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_FILE_NAME_LEN, THUMBNAIL_PREFIX};
use crate::error::IngestError;

/// Bucket and key of an uploaded object. Immutable once received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceObject {
    pub bucket: String,
    pub name: String,
}

impl SourceObject {
    pub fn new(bucket: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            name: name.into(),
        }
    }

    /// Last path segment of the object key.
    ///
    /// This is the name used for the local working copy and for the archived
    /// original. Keys without a usable final segment are rejected.
    pub fn file_name(&self) -> Result<String, IngestError> {
        let base = self.name.rsplit('/').next().unwrap_or_default();

        if base.is_empty() || base == "." || base == ".." {
            return Err(IngestError::InvalidObjectName(self.name.clone()));
        }
        if base.len() > MAX_FILE_NAME_LEN {
            return Err(IngestError::InvalidObjectName(format!(
                "{} (file name longer than {} bytes)",
                self.name, MAX_FILE_NAME_LEN
            )));
        }
        if base.chars().any(|c| c.is_control() || c == '\\') {
            return Err(IngestError::InvalidObjectName(self.name.clone()));
        }

        Ok(base.to_string())
    }

    /// Name of the thumbnail derived from this object: `thumb_<file name>`.
    pub fn thumbnail_name(&self) -> Result<String, IngestError> {
        Ok(format!("{}{}", THUMBNAIL_PREFIX, self.file_name()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_plain_key() {
        let source = SourceObject::new("uploads", "beach.jpg");
        assert_eq!(source.file_name().unwrap(), "beach.jpg");
        assert_eq!(source.thumbnail_name().unwrap(), "thumb_beach.jpg");
    }

    #[test]
    fn test_file_name_nested_key_uses_last_segment() {
        let source = SourceObject::new("uploads", "2024/06/beach day.jpg");
        assert_eq!(source.file_name().unwrap(), "beach day.jpg");
        assert_eq!(source.thumbnail_name().unwrap(), "thumb_beach day.jpg");
    }

    #[test]
    fn test_file_name_rejects_directory_markers() {
        for key in ["", "photos/", "photos/..", "..", "a/./"] {
            let source = SourceObject::new("uploads", key);
            assert!(
                matches!(source.file_name(), Err(IngestError::InvalidObjectName(_))),
                "key {:?} should be rejected",
                key
            );
        }
    }

    #[test]
    fn test_file_name_allows_double_dots_inside_name() {
        let source = SourceObject::new("uploads", "beach..jpg");
        assert_eq!(source.file_name().unwrap(), "beach..jpg");

        let source = SourceObject::new("uploads", "2024/IMG..0001.jpg");
        assert_eq!(source.file_name().unwrap(), "IMG..0001.jpg");
        assert_eq!(source.thumbnail_name().unwrap(), "thumb_IMG..0001.jpg");
    }

    #[test]
    fn test_file_name_rejects_overlong_segment() {
        let source = SourceObject::new("uploads", "x".repeat(MAX_FILE_NAME_LEN + 1));
        assert!(source.file_name().is_err());
    }
}
