//! Response DTOs for the HTTP API.

use serde::Serialize;

use crate::datetime::{format_utc_datetime, to_rfc3339, DISPLAY_FORMAT};
use crate::file::FileRecord;
use crate::format::format_size;

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// File information in responses.
#[derive(Debug, Serialize)]
pub struct FileResponse {
    /// File ID.
    pub id: i64,
    /// Original filename.
    pub filename: String,
    /// File size in bytes.
    pub size: i64,
    /// File size for display (e.g. "2.00 KB").
    pub size_display: String,
    /// MIME type.
    pub content_type: String,
    /// Upload time (RFC3339, UTC).
    pub uploaded_at: String,
    /// Upload time in the configured timezone.
    pub uploaded_at_display: String,
}

impl FileResponse {
    /// Build a response from a metadata record.
    pub fn from_record(record: &FileRecord, timezone: &str) -> Self {
        Self {
            id: record.id,
            filename: record.original_name.clone(),
            size: record.size_bytes,
            size_display: format_size(u64::try_from(record.size_bytes).unwrap_or(0)),
            content_type: record.content_type.clone(),
            uploaded_at: to_rfc3339(&record.uploaded_at),
            uploaded_at_display: format_utc_datetime(
                &record.uploaded_at,
                timezone,
                DISPLAY_FORMAT,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample_record() -> FileRecord {
        FileRecord {
            id: 5,
            original_name: "report 2024.pdf".to_string(),
            stored_name: "0b6c3f0e-3c1f-4a51-9d1e-2f7a1c9e8b10_report_2024.pdf".to_string(),
            size_bytes: 2048,
            content_type: "application/pdf".to_string(),
            uploaded_at: Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_file_response_from_record() {
        let response = FileResponse::from_record(&sample_record(), "UTC");

        assert_eq!(response.id, 5);
        assert_eq!(response.filename, "report 2024.pdf");
        assert_eq!(response.size, 2048);
        assert_eq!(response.size_display, "2.00 KB");
        assert_eq!(response.content_type, "application/pdf");
        assert_eq!(response.uploaded_at, "2024-01-15T10:30:00Z");
        assert_eq!(response.uploaded_at_display, "Jan 15, 2024 10:30");
    }

    #[test]
    fn test_file_response_timezone() {
        let response = FileResponse::from_record(&sample_record(), "Asia/Tokyo");

        assert_eq!(response.uploaded_at, "2024-01-15T10:30:00Z");
        assert_eq!(response.uploaded_at_display, "Jan 15, 2024 19:30");
    }

    #[test]
    fn test_api_response_envelope() {
        let json = serde_json::to_value(ApiResponse::new(FileResponse::from_record(
            &sample_record(),
            "UTC",
        )))
        .unwrap();

        assert_eq!(json["data"]["id"], 5);
        assert_eq!(json["data"]["filename"], "report 2024.pdf");
        assert!(json["data"].get("stored_name").is_none());
    }
}
