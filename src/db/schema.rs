//! Database schema and migrations for fileshare.
//!
//! Migrations are applied sequentially when the database is first opened
//! or upgraded.

/// Database migrations.
///
/// Each migration is a SQL script that will be executed in order.
/// The schema_version table tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: Initial schema - file metadata
    r#"
-- One row per stored file. AUTOINCREMENT keeps ids from being reissued after delete.
CREATE TABLE files (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    original_name   TEXT NOT NULL,
    stored_name     TEXT NOT NULL UNIQUE,
    size_bytes      INTEGER NOT NULL CHECK (size_bytes >= 0),
    content_type    TEXT NOT NULL,
    uploaded_at     TEXT NOT NULL          -- fixed-width UTC, see datetime::to_db_string
);

CREATE INDEX idx_files_uploaded_at ON files(uploaded_at DESC, id ASC);
"#,
];
