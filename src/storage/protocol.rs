//! Storage HTTP Protocol
//!
//! Endpoints and Data Transfer Objects (DTOs) of the file catalog and the raw
//! segment API. Request bodies reject unknown fields so a misspelled key is a
//! 400 rather than a silently ignored value.

use super::types::{AudioFile, ProcessingStatus, TranscriptSegment};
use serde::{Deserialize, Serialize};

// --- API Endpoints ---

/// Register a file (POST) in the catalog.
pub const ENDPOINT_FILES: &str = "/files";
/// Read one catalog entry.
pub const ENDPOINT_FILE: &str = "/files/:file_id";
/// Move a file through its processing lifecycle.
pub const ENDPOINT_FILE_STATUS: &str = "/files/:file_id/status";
/// Read (GET) or replace (PUT) a file's already-normalized segments.
pub const ENDPOINT_FILE_SEGMENTS: &str = "/files/:file_id/segments";

// --- Data Transfer Objects ---

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterFileRequest {
    /// Generated (UUID v4) when absent.
    #[serde(default)]
    pub file_id: Option<String>,
    pub filename: String,
    /// Seconds. Zero when unknown.
    #[serde(default)]
    pub duration: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileResponse {
    pub success: bool,
    pub file: AudioFile,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusUpdateRequest {
    pub status: ProcessingStatus,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PutSegmentsRequest {
    pub segments: Vec<TranscriptSegment>,
}

/// Acknowledgment of a transcript write. The segments are searchable once this is returned.
#[derive(Debug, Serialize, Deserialize)]
pub struct WriteResponse {
    pub success: bool,
    pub file_id: String,
    pub generation: u64,
    pub segment_count: usize,
    /// False if a concurrent, newer write replaced this one first.
    pub indexed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SegmentsResponse {
    pub file_id: String,
    pub count: usize,
    pub segments: Vec<TranscriptSegment>,
}
