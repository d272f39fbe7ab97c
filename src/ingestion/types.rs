//! Ingestion Data Types
//!
//! The shapes a transcription provider may deliver, and the responses of the
//! ingestion endpoints. Exactly one of `segments`, `words` or `text` must be
//! present in a `ProviderTranscript`.

use crate::storage::protocol::WriteResponse;
use crate::storage::types::AudioFile;
use serde::{Deserialize, Serialize};

/// Segment-level provider output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProviderSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    #[serde(default)]
    pub confidence: Option<f64>,
    /// Mean token log-probability. Used when `confidence` is absent.
    #[serde(default)]
    pub avg_logprob: Option<f64>,
}

/// Word-level provider output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProviderWord {
    pub word: String,
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProviderTranscript {
    #[serde(default)]
    pub segments: Option<Vec<ProviderSegment>>,
    #[serde(default)]
    pub words: Option<Vec<ProviderWord>>,
    /// Untimed text. Becomes one segment spanning the whole file.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// Body of `POST /ingest`: register a file and deliver its transcript in one call.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IngestRequest {
    #[serde(default)]
    pub file_id: Option<String>,
    pub filename: String,
    #[serde(default)]
    pub duration: f64,
    pub transcript: ProviderTranscript,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IngestResponse {
    pub success: bool,
    pub file: AudioFile,
    pub write: WriteResponse,
}
