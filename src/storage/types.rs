//! Storage Data Types
//!
//! The records owned by the segment store: the audio file catalog entry and its
//! ordered, time-aligned transcript segments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Processing lifecycle of an uploaded audio file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Pending,
    Transcribing,
    Ready,
    Failed,
}

impl ProcessingStatus {
    /// `Ready -> Transcribing` is a re-transcription and is allowed.
    pub fn can_transition_to(self, next: ProcessingStatus) -> bool {
        use ProcessingStatus::*;
        matches!(
            (self, next),
            (Pending, Transcribing)
                | (Pending, Failed)
                | (Transcribing, Ready)
                | (Transcribing, Failed)
                | (Failed, Transcribing)
                | (Ready, Transcribing)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProcessingStatus::Pending => "pending",
            ProcessingStatus::Transcribing => "transcribing",
            ProcessingStatus::Ready => "ready",
            ProcessingStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalog entry for one uploaded audio file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioFile {
    pub file_id: String,
    pub filename: String,
    pub upload_time: DateTime<Utc>,
    /// Total duration in seconds.
    pub duration: f64,
    pub status: ProcessingStatus,
}

impl AudioFile {
    pub fn new(file_id: impl Into<String>, filename: impl Into<String>, duration: f64) -> Self {
        Self {
            file_id: file_id.into(),
            filename: filename.into(),
            upload_time: Utc::now(),
            duration,
            status: ProcessingStatus::Pending,
        }
    }
}

/// A contiguous span of transcribed speech.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptSegment {
    /// 0-based position within the file. Defines order.
    pub index: u32,
    pub start_time: f64,
    pub end_time: f64,
    pub text: String,
    pub confidence: f64,
}

/// One complete generation of a file's transcript.
///
/// The segment list is shared with the index snapshot built from it, so a reader
/// holding a snapshot sees exactly the segments its postings were built from.
#[derive(Debug, Clone)]
pub struct StoredTranscript {
    pub generation: u64,
    pub segments: Arc<[TranscriptSegment]>,
}
