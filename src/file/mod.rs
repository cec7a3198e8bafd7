//! File management module for fileshare.
//!
//! This module provides upload/download functionality including:
//! - Safe stored-name generation
//! - Streaming physical storage under a flat root directory
//! - File metadata persistence (SQLite or in-memory)
//! - The service that keeps both in step

mod memory;
mod metadata;
mod naming;
mod service;
mod storage;

pub use memory::InMemoryFileRepository;
pub use metadata::{FileRecord, MetadataRepository, NewFileRecord, SqliteFileRepository};
pub use naming::{
    generate_stored_name, is_valid_stored_name, sanitize_name, MAX_SANITIZED_NAME_LENGTH, UNNAMED,
};
pub use service::{Download, FileService};
pub use storage::FileStorage;

/// Content type recorded when the uploader supplies none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
