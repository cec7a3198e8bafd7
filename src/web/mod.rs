//! HTTP API module for fileshare.
//!
//! Exposes listing, upload, metadata, download and deletion of stored files
//! as a small REST API.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
