//! Shared key validation for storage backends.

use crate::traits::{StorageError, StorageResult};

/// Reject keys that could escape their bucket on a filesystem-backed store.
pub fn validate_key(storage_key: &str) -> StorageResult<()> {
    if storage_key.is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }
    if storage_key.starts_with('/')
        || storage_key.split('/').any(|segment| segment == "..")
    {
        return Err(StorageError::InvalidKey(format!(
            "Storage key contains invalid path segments: {}",
            storage_key
        )));
    }
    Ok(())
}

/// Join a base URL, bucket and key into `<base>/<bucket>/<key>`.
///
/// Each `/`-separated segment of the key is percent-encoded.
pub fn join_url(base: &str, bucket: &str, storage_key: &str) -> String {
    let key = storage_key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!(
        "{}/{}/{}",
        base.trim_end_matches('/'),
        bucket.trim_matches('/'),
        key
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("beach.jpg").is_ok());
        assert!(validate_key("thumb_beach.jpg").is_ok());
        assert!(validate_key("2024/beach..jpg").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("/etc/passwd").is_err());
        assert!(validate_key("../secrets").is_err());
        assert!(validate_key("a/../../b").is_err());
    }

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("https://s3.eu-west-1.amazonaws.com/", "finals", "a.jpg"),
            "https://s3.eu-west-1.amazonaws.com/finals/a.jpg"
        );
    }

    #[test]
    fn test_join_url_encodes_segments() {
        assert_eq!(
            join_url("https://cdn.example.com", "finals", "2024/06/beach day.png"),
            "https://cdn.example.com/finals/2024/06/beach%20day.png"
        );
        assert_eq!(
            join_url("https://cdn.example.com", "finals", "100%.jpg"),
            "https://cdn.example.com/finals/100%25.jpg"
        );
        assert_eq!(
            join_url("https://cdn.example.com", "thumbnails", "thumb_café.jpg"),
            "https://cdn.example.com/thumbnails/thumb_caf%C3%A9.jpg"
        );
    }
}
