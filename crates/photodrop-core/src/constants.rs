//! Application-wide constants.

/// Prefix marking a thumbnail derived from an uploaded original.
pub const THUMBNAIL_PREFIX: &str = "thumb_";

/// Thumbnails are always produced at exactly this size; aspect ratio is not preserved.
pub const THUMBNAIL_WIDTH: u32 = 64;
pub const THUMBNAIL_HEIGHT: u32 = 64;

/// Upper bound on a single path segment we are willing to write to local scratch space.
pub const MAX_FILE_NAME_LEN: usize = 255;

/// Directory name (under the configured work root) holding per-invocation directories.
pub const WORK_DIR_NAME: &str = "photodrop";
