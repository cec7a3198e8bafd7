//! fileshare - a small file storage service
//!
//! Accepts uploaded files, stores them under collision-free names in a flat
//! directory, tracks their metadata in SQLite, and serves them back over HTTP.

pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod file;
pub mod format;
pub mod logging;
pub mod web;

pub use config::Config;
pub use db::Database;
pub use error::{FileshareError, Result};
pub use file::{
    Download, FileRecord, FileService, FileStorage, InMemoryFileRepository, MetadataRepository,
    NewFileRecord, SqliteFileRepository,
};
pub use format::format_size;
pub use web::WebServer;
