use super::types::{
    CleanupReport, DeleteFileResponse, FileListResponse, HealthResponse, ReindexReport,
    ServiceStats,
};
use crate::error::ApiError;
use crate::search::service::SearchService;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::{Extension, Json};
use std::sync::Arc;

pub async fn handle_list_files(
    Extension(service): Extension<Arc<SearchService>>,
) -> Result<(StatusCode, Json<FileListResponse>), ApiError> {
    let files = service.list_files().await?;
    Ok((
        StatusCode::OK,
        Json(FileListResponse {
            success: true,
            count: files.len(),
            files,
        }),
    ))
}

pub async fn handle_delete_file(
    Path(file_id): Path<String>,
    Extension(service): Extension<Arc<SearchService>>,
) -> Result<(StatusCode, Json<DeleteFileResponse>), ApiError> {
    let outcome = service.delete_file(&file_id).await?;
    let status = if outcome.existed {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };

    Ok((
        status,
        Json(DeleteFileResponse {
            success: outcome.existed,
            file_id,
            existed: outcome.existed,
        }),
    ))
}

pub async fn handle_reindex(
    Extension(service): Extension<Arc<SearchService>>,
) -> Result<(StatusCode, Json<ReindexReport>), ApiError> {
    let report = service.rebuild_index().await?;
    Ok((StatusCode::OK, Json(report)))
}

pub async fn handle_cleanup(
    Extension(service): Extension<Arc<SearchService>>,
) -> Result<(StatusCode, Json<CleanupReport>), ApiError> {
    let report = service.cleanup().await?;
    Ok((StatusCode::OK, Json(report)))
}

pub async fn handle_stats(
    Extension(service): Extension<Arc<SearchService>>,
) -> Result<(StatusCode, Json<ServiceStats>), ApiError> {
    let stats = service.stats().await?;
    Ok((StatusCode::OK, Json(stats)))
}

pub async fn handle_health(
    Extension(service): Extension<Arc<SearchService>>,
) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            indexed_files: service.index().stats().indexed_files,
        }),
    )
}
