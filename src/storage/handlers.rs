use axum::{
    Json,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
};
use std::sync::Arc;

use super::protocol::{
    FileResponse, PutSegmentsRequest, RegisterFileRequest, SegmentsResponse, StatusUpdateRequest,
    WriteResponse,
};
use super::types::AudioFile;
use crate::error::{ApiError, SearchError};
use crate::search::service::{SearchService, WriteReport};

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| ApiError(SearchError::Validation(e.body_text())))
}

pub(crate) fn write_response(report: WriteReport) -> WriteResponse {
    WriteResponse {
        success: true,
        file_id: report.file_id,
        generation: report.generation,
        segment_count: report.segments,
        indexed: report.indexed,
    }
}

pub async fn handle_register_file(
    Extension(service): Extension<Arc<SearchService>>,
    payload: Result<Json<RegisterFileRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<FileResponse>), ApiError> {
    let req = body(payload)?;
    let file_id = req
        .file_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let file = service
        .register_file(AudioFile::new(file_id, req.filename, req.duration))
        .await?;
    tracing::debug!("Registered {} via API", file.file_id);

    Ok((
        StatusCode::CREATED,
        Json(FileResponse {
            success: true,
            file,
        }),
    ))
}

pub async fn handle_get_file(
    Path(file_id): Path<String>,
    Extension(service): Extension<Arc<SearchService>>,
) -> Result<(StatusCode, Json<FileResponse>), ApiError> {
    let file = service.get_file(&file_id).await?;
    Ok((
        StatusCode::OK,
        Json(FileResponse {
            success: true,
            file,
        }),
    ))
}

pub async fn handle_update_status(
    Path(file_id): Path<String>,
    Extension(service): Extension<Arc<SearchService>>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<FileResponse>), ApiError> {
    let req = body(payload)?;
    let file = service.set_status(&file_id, req.status).await?;
    Ok((
        StatusCode::OK,
        Json(FileResponse {
            success: true,
            file,
        }),
    ))
}

pub async fn handle_get_segments(
    Path(file_id): Path<String>,
    Extension(service): Extension<Arc<SearchService>>,
) -> Result<(StatusCode, Json<SegmentsResponse>), ApiError> {
    let segments = service.get_segments(&file_id).await?;
    Ok((
        StatusCode::OK,
        Json(SegmentsResponse {
            file_id,
            count: segments.len(),
            segments,
        }),
    ))
}

pub async fn handle_put_segments(
    Path(file_id): Path<String>,
    Extension(service): Extension<Arc<SearchService>>,
    payload: Result<Json<PutSegmentsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<WriteResponse>), ApiError> {
    let req = body(payload)?;
    let report = service.put_segments(&file_id, req.segments).await?;
    Ok((StatusCode::OK, Json(write_response(report))))
}
