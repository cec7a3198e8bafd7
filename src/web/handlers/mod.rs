//! API handlers.

pub mod file;

pub use file::*;

use std::sync::Arc;

use crate::file::FileService;

/// Shared application state.
pub struct AppState {
    /// File service.
    pub files: Arc<FileService>,
    /// Timezone name for display timestamps.
    pub timezone: String,
}

impl AppState {
    /// Create a new application state.
    pub fn new(files: Arc<FileService>, timezone: impl Into<String>) -> Self {
        Self {
            files,
            timezone: timezone.into(),
        }
    }
}
