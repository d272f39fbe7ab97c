use super::normalize::normalize;
use super::types::{IngestRequest, IngestResponse, ProviderTranscript};
use crate::error::{ApiError, SearchError};
use crate::search::service::SearchService;
use crate::storage::handlers::write_response;
use crate::storage::protocol::WriteResponse;
use crate::storage::types::{AudioFile, ProcessingStatus};
use axum::extract::Path;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::{Extension, Json};
use std::sync::Arc;

/// Normalizes a provider transcript for an already registered file and stores it.
pub async fn handle_submit_transcript(
    Path(file_id): Path<String>,
    Extension(service): Extension<Arc<SearchService>>,
    payload: Result<Json<ProviderTranscript>, JsonRejection>,
) -> Result<(StatusCode, Json<WriteResponse>), ApiError> {
    let Json(transcript) = payload.map_err(|e| SearchError::Validation(e.body_text()))?;

    let file = service.get_file(&file_id).await?;
    let segments = normalize(transcript, file.duration)?;
    tracing::debug!("Normalized {} segments for {}", segments.len(), file_id);

    let report = service.put_segments(&file_id, segments).await?;
    Ok((StatusCode::OK, Json(write_response(report))))
}

/// Registers a new file and stores its transcript in one request.
pub async fn handle_ingest(
    Extension(service): Extension<Arc<SearchService>>,
    payload: Result<Json<IngestRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<IngestResponse>), ApiError> {
    let Json(req) = payload.map_err(|e| SearchError::Validation(e.body_text()))?;

    // Normalize first so a bad transcript does not leave an orphan catalog entry.
    let segments = normalize(req.transcript, req.duration)?;
    let file_id = req
        .file_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    service
        .register_file(AudioFile::new(file_id.clone(), req.filename, req.duration))
        .await?;
    let report = match service.put_segments(&file_id, segments).await {
        Ok(report) => report,
        Err(e) => {
            tracing::warn!("Transcript for {} rejected: {}", file_id, e);
            if let Err(status_err) = service.set_status(&file_id, ProcessingStatus::Failed).await {
                tracing::warn!("Could not mark {} failed: {}", file_id, status_err);
            }
            return Err(e.into());
        }
    };
    let file = service.get_file(&file_id).await?;

    tracing::info!("Ingested {} ({} segments)", file_id, report.segments);
    Ok((
        StatusCode::CREATED,
        Json(IngestResponse {
            success: true,
            file,
            write: write_response(report),
        }),
    ))
}
