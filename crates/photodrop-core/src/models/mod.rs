//! Data models for the ingest pipeline

mod photo;
mod source_object;

pub use photo::*;
pub use source_object::*;
