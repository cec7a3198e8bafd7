//! File handlers for the HTTP API.

use std::io;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{
        multipart::{Multipart, MultipartError},
        Path, State,
    },
    http::{header, StatusCode},
    response::Response,
    Json,
};
use futures::TryStreamExt;
use tokio_util::io::{ReaderStream, StreamReader};

use crate::web::dto::{ApiResponse, FileResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::FileshareError;

/// Name of the multipart field carrying the upload.
pub const UPLOAD_FIELD: &str = "file";

/// Generate a safe Content-Disposition header value for file downloads.
///
/// Control characters are dropped, quotes and backslashes are replaced in the
/// plain `filename` parameter, and non-ASCII names are also sent as an
/// RFC 5987 `filename*` parameter.
fn content_disposition_header(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            _ => c,
        })
        .collect();

    if filename.is_ascii() && sanitized == filename {
        return format!("attachment; filename=\"{}\"", filename);
    }

    let encoded = urlencoding::encode(filename);

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        sanitized, encoded
    )
}

/// Map a multipart failure to an API error.
fn multipart_rejection(e: &MultipartError) -> ApiError {
    tracing::warn!("Failed to read multipart data: {}", e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large("Upload exceeds the maximum allowed size")
    } else {
        ApiError::bad_request("Invalid multipart data")
    }
}

/// Map a store failure to an API error, surfacing client-side stream errors.
fn upload_error(err: FileshareError) -> ApiError {
    if let FileshareError::Storage(io_err) = &err {
        if let Some(multipart_err) = io_err
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<MultipartError>())
        {
            return multipart_rejection(multipart_err);
        }
    }
    err.into()
}

/// GET /api/files - List all files, newest first.
pub async fn list_files(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<FileResponse>>>, ApiError> {
    let files = state.files.list_all().await?;

    let response: Vec<FileResponse> = files
        .iter()
        .map(|record| FileResponse::from_record(record, &state.timezone))
        .collect();

    Ok(Json(ApiResponse::new(response)))
}

/// POST /api/files - Upload a file.
///
/// Request body: multipart/form-data with a "file" field. The field is
/// streamed to storage as it arrives.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<FileResponse>>), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_rejection(&e))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);

        let body = field.map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e));
        let reader = StreamReader::new(body);
        tokio::pin!(reader);

        let record = state
            .files
            .store(filename.as_deref(), reader, content_type.as_deref())
            .await
            .map_err(upload_error)?;

        return Ok((
            StatusCode::CREATED,
            Json(ApiResponse::new(FileResponse::from_record(
                &record,
                &state.timezone,
            ))),
        ));
    }

    Err(ApiError::bad_request("No file provided"))
}

/// GET /api/files/:id - Get file metadata.
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<i64>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let record = state.files.get_metadata(file_id).await?;

    Ok(Json(ApiResponse::new(FileResponse::from_record(
        &record,
        &state.timezone,
    ))))
}

/// GET /api/files/:id/download - Stream a file's content.
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<i64>,
) -> Result<Response<Body>, ApiError> {
    let download = state.files.download(file_id).await?;

    let length = download
        .file
        .metadata()
        .await
        .map_err(FileshareError::from)?
        .len();

    let response = Response::builder()
        .header(header::CONTENT_TYPE, &download.record.content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&download.record.original_name),
        )
        .header(header::CONTENT_LENGTH, length)
        .body(Body::from_stream(ReaderStream::new(download.file)))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })?;

    Ok(response)
}

/// DELETE /api/files/:id - Delete a file.
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.files.delete(file_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
