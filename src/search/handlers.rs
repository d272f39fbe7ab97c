use super::service::SearchService;
use super::types::{
    PlaybackInfoResponse, SearchParams, SearchRequest, SearchResponse, TranscriptResponse,
};
use crate::error::{ApiError, SearchError};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::{Extension, Json};
use std::sync::Arc;

pub async fn handle_search(
    Extension(service): Extension<Arc<SearchService>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<(StatusCode, Json<SearchResponse>), ApiError> {
    let Query(params) = params.map_err(|e| SearchError::InvalidQuery(e.body_text()))?;
    let response = service.search(SearchRequest::from(params)).await?;
    Ok((StatusCode::OK, Json(response)))
}

pub async fn handle_search_post(
    Extension(service): Extension<Arc<SearchService>>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SearchResponse>), ApiError> {
    let Json(request) = body.map_err(|e| SearchError::InvalidQuery(e.body_text()))?;
    let response = service.search(request).await?;
    Ok((StatusCode::OK, Json(response)))
}

pub async fn handle_get_transcript(
    Path(file_id): Path<String>,
    Extension(service): Extension<Arc<SearchService>>,
) -> Result<(StatusCode, Json<TranscriptResponse>), ApiError> {
    service.get_file(&file_id).await?;
    let transcript = service.transcript_text(&file_id).await?;
    Ok((StatusCode::OK, Json(TranscriptResponse { file_id, transcript })))
}

pub async fn handle_playback_info(
    Path(file_id): Path<String>,
    Extension(service): Extension<Arc<SearchService>>,
) -> Result<(StatusCode, Json<PlaybackInfoResponse>), ApiError> {
    let file = service.get_file(&file_id).await?;
    let segment_count = service.get_segments(&file_id).await?.len();

    Ok((
        StatusCode::OK,
        Json(PlaybackInfoResponse {
            file_id: file.file_id,
            filename: file.filename,
            duration: file.duration,
            status: file.status.to_string(),
            upload_time: file.upload_time,
            segment_count,
        }),
    ))
}
