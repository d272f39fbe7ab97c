//! Transcript Search Library
//!
//! Search inside transcribed audio: ranked, time-aligned segment hits for a
//! free-text query. This library crate holds every subsystem; the binary
//! (`main.rs`) only reads configuration and serves the router.
//!
//! ## Architecture Modules
//! - **`storage`**: The audio file catalog and the per-file transcript segments,
//!   sharded over hash partitions, with validation and write generations.
//! - **`index`**: The positional inverted index. One immutable snapshot per file,
//!   swapped atomically so readers never see a half-built transcript.
//! - **`search`**: Query planning, ranking and the `SearchService` that keeps the
//!   store and the index consistent.
//! - **`ingestion`**: Normalization of provider transcripts (segments, words or text).
//! - **`admin`**: Catalog listing, deletion, index rebuild and cleanup, statistics and health.
//! - **`config`**, **`error`**, **`retry`**: Settings, the error taxonomy and the
//!   bounded retry policy for backing calls.

pub mod admin;
pub mod config;
pub mod error;
pub mod index;
pub mod ingestion;
pub mod retry;
pub mod search;
pub mod storage;

use axum::Router;
use axum::routing::{delete, get, post};
use axum::Extension;
use std::sync::Arc;

use search::service::SearchService;
use storage::protocol::{ENDPOINT_FILE, ENDPOINT_FILES, ENDPOINT_FILE_SEGMENTS, ENDPOINT_FILE_STATUS};

/// The complete HTTP API over one shared service.
pub fn router(service: Arc<SearchService>) -> Router {
    Router::new()
        // Catalog and transcripts
        .route(ENDPOINT_FILES, post(storage::handlers::handle_register_file))
        .route(ENDPOINT_FILE, get(storage::handlers::handle_get_file))
        .route(ENDPOINT_FILE_STATUS, post(storage::handlers::handle_update_status))
        .route(
            ENDPOINT_FILE_SEGMENTS,
            get(storage::handlers::handle_get_segments).put(storage::handlers::handle_put_segments),
        )
        .route(
            "/files/:file_id/transcript",
            post(ingestion::handlers::handle_submit_transcript),
        )
        .route("/ingest", post(ingestion::handlers::handle_ingest))
        // Search and playback
        .route(
            "/search",
            get(search::handlers::handle_search).post(search::handlers::handle_search_post),
        )
        .route(
            "/playback/:file_id/transcript",
            get(search::handlers::handle_get_transcript),
        )
        .route("/playback/:file_id/info", get(search::handlers::handle_playback_info))
        // Administration
        .route("/admin/files", get(admin::handlers::handle_list_files))
        .route("/admin/files/:file_id", delete(admin::handlers::handle_delete_file))
        .route("/admin/reindex", post(admin::handlers::handle_reindex))
        .route("/admin/cleanup", post(admin::handlers::handle_cleanup))
        .route("/admin/stats", get(admin::handlers::handle_stats))
        .route("/health", get(admin::handlers::handle_health))
        .layer(Extension(service))
}
