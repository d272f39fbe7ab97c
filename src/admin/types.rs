use crate::index::types::IndexStats;
use crate::storage::types::AudioFile;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FileStatusCounts {
    pub pending: usize,
    pub transcribing: usize,
    pub ready: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceStats {
    pub total_files: usize,
    pub files_by_status: FileStatusCounts,
    pub index: IndexStats,
    pub uptime_secs: u64,
    pub version: String,
}

/// Outcome of `POST /admin/reindex`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReindexReport {
    pub files_indexed: usize,
    pub segments_indexed: usize,
    /// Index/store mismatches found before the rebuild.
    pub inconsistencies: Vec<String>,
    pub orphans_removed: usize,
    pub took_ms: f64,
}

/// Outcome of `POST /admin/cleanup`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CleanupReport {
    pub success: bool,
    pub stale_entries_removed: usize,
    /// Indexed files whose store generation moved on while the sweep ran.
    pub files_republished: usize,
    pub inconsistencies: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileListResponse {
    pub success: bool,
    pub count: usize,
    pub files: Vec<AudioFile>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteFileResponse {
    pub success: bool,
    pub file_id: String,
    pub existed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub indexed_files: usize,
}
