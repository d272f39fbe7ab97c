//! Segment Store
//!
//! `SegmentStore` is the seam between the search service and whatever holds
//! transcripts durably. `MemorySegmentStore` is the in-process implementation:
//! a sharded `DashMap` keyed by file id, with one global generation counter.
//!
//! ## Generations
//! Every successful `put_segments` and every `delete` consumes a fresh
//! generation number from a single monotonically increasing counter. The
//! number is taken while the file's map entry is locked, so the generation a
//! caller gets back is always the one that is now visible in the store.

use super::partitioner::PartitionManager;
use super::types::{AudioFile, ProcessingStatus, StoredTranscript, TranscriptSegment};
use super::validation::validate_segments;
use crate::error::{SearchError, ServiceResult};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicU64, Ordering};

/// Result of deleting a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub existed: bool,
    /// Generation consumed by the deletion. Index tombstones use it.
    pub generation: u64,
}

#[async_trait]
pub trait SegmentStore: Send + Sync {
    /// Adds a file to the catalog. Fails if the id is already taken.
    async fn register_file(&self, file: AudioFile) -> ServiceResult<AudioFile>;

    async fn get_file(&self, file_id: &str) -> ServiceResult<AudioFile>;

    async fn list_files(&self) -> ServiceResult<Vec<AudioFile>>;

    async fn set_status(&self, file_id: &str, status: ProcessingStatus) -> ServiceResult<AudioFile>;

    /// Replaces the whole segment set of a file and marks it ready.
    async fn put_segments(
        &self,
        file_id: &str,
        segments: Vec<TranscriptSegment>,
    ) -> ServiceResult<StoredTranscript>;

    async fn get_segments(&self, file_id: &str) -> ServiceResult<Vec<TranscriptSegment>>;

    /// Current generation plus segments. `NotFound` if the file is unknown or
    /// has never been transcribed.
    async fn get_transcript(&self, file_id: &str) -> ServiceResult<StoredTranscript>;

    /// Removes the file and its segments. Deleting an absent file is not an error.
    async fn delete(&self, file_id: &str) -> ServiceResult<DeleteOutcome>;
}

#[derive(Debug, Clone)]
struct FileRecord {
    file: AudioFile,
    transcript: Option<StoredTranscript>,
}

pub struct MemorySegmentStore {
    /// One shard per partition, indexed by partition number.
    local_data: Vec<DashMap<String, FileRecord>>,
    partitioner: PartitionManager,
    generation: AtomicU64,
}

impl MemorySegmentStore {
    pub fn new(partitioner: PartitionManager) -> Self {
        let local_data = partitioner.all_partitions().map(|_| DashMap::new()).collect();

        Self {
            local_data,
            partitioner,
            generation: AtomicU64::new(0),
        }
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn with_partition<R>(&self, file_id: &str, f: impl FnOnce(&DashMap<String, FileRecord>) -> R) -> R {
        let partition = self.partitioner.get_partition(file_id);
        f(&self.local_data[partition as usize])
    }

    pub fn local_file_count(&self) -> usize {
        self.local_data.iter().map(|shard| shard.len()).sum()
    }
}

#[async_trait]
impl SegmentStore for MemorySegmentStore {
    async fn register_file(&self, file: AudioFile) -> ServiceResult<AudioFile> {
        if file.file_id.trim().is_empty() {
            return Err(SearchError::Validation("file_id is empty".to_string()));
        }
        if !file.duration.is_finite() || file.duration < 0.0 {
            return Err(SearchError::Validation(format!(
                "duration {} must be a finite, non-negative number",
                file.duration
            )));
        }

        let file_id = file.file_id.clone();
        self.with_partition(&file_id, |map| {
            match map.entry(file_id.clone()) {
                Entry::Occupied(_) => Err(SearchError::Validation(format!(
                    "file {} already registered",
                    file.file_id
                ))),
                Entry::Vacant(slot) => {
                    slot.insert(FileRecord {
                        file: file.clone(),
                        transcript: None,
                    });
                    tracing::debug!("Registered file {} ({})", file.file_id, file.filename);
                    Ok(file)
                }
            }
        })
    }

    async fn get_file(&self, file_id: &str) -> ServiceResult<AudioFile> {
        self.with_partition(file_id, |map| {
            map.get(file_id)
                .map(|record| record.file.clone())
                .ok_or_else(|| SearchError::NotFound(file_id.to_string()))
        })
    }

    async fn list_files(&self) -> ServiceResult<Vec<AudioFile>> {
        let mut files: Vec<AudioFile> = Vec::new();
        for shard in &self.local_data {
            for record in shard.iter() {
                files.push(record.file.clone());
            }
        }
        files.sort_by(|a, b| {
            a.upload_time
                .cmp(&b.upload_time)
                .then_with(|| a.file_id.cmp(&b.file_id))
        });
        Ok(files)
    }

    async fn set_status(&self, file_id: &str, status: ProcessingStatus) -> ServiceResult<AudioFile> {
        self.with_partition(file_id, |map| {
            let mut record = map
                .get_mut(file_id)
                .ok_or_else(|| SearchError::NotFound(file_id.to_string()))?;

            let current = record.file.status;
            if !current.can_transition_to(status) {
                return Err(SearchError::InvalidStatusTransition {
                    file_id: file_id.to_string(),
                    from: current.to_string(),
                    to: status.to_string(),
                });
            }
            record.file.status = status;
            tracing::info!("File {} status {} -> {}", file_id, current, status);
            Ok(record.file.clone())
        })
    }

    async fn put_segments(
        &self,
        file_id: &str,
        segments: Vec<TranscriptSegment>,
    ) -> ServiceResult<StoredTranscript> {
        self.with_partition(file_id, |map| {
            let mut record = map
                .get_mut(file_id)
                .ok_or_else(|| SearchError::NotFound(file_id.to_string()))?;

            validate_segments(&record.file, &segments)?;

            let stored = StoredTranscript {
                generation: self.next_generation(),
                segments: segments.into(),
            };
            record.transcript = Some(stored.clone());
            record.file.status = ProcessingStatus::Ready;

            tracing::info!(
                "Stored {} segments for file {} (generation {})",
                stored.segments.len(),
                file_id,
                stored.generation
            );
            Ok(stored)
        })
    }

    async fn get_segments(&self, file_id: &str) -> ServiceResult<Vec<TranscriptSegment>> {
        self.with_partition(file_id, |map| {
            let record = map
                .get(file_id)
                .ok_or_else(|| SearchError::NotFound(file_id.to_string()))?;
            Ok(record
                .transcript
                .as_ref()
                .map(|t| t.segments.to_vec())
                .unwrap_or_default())
        })
    }

    async fn get_transcript(&self, file_id: &str) -> ServiceResult<StoredTranscript> {
        self.with_partition(file_id, |map| {
            map.get(file_id)
                .and_then(|record| record.transcript.clone())
                .ok_or_else(|| SearchError::NotFound(file_id.to_string()))
        })
    }

    async fn delete(&self, file_id: &str) -> ServiceResult<DeleteOutcome> {
        self.with_partition(file_id, |map| {
            // Generation is taken under the entry lock so it orders after any put.
            let outcome = match map.entry(file_id.to_string()) {
                Entry::Occupied(entry) => {
                    let generation = self.next_generation();
                    entry.remove();
                    DeleteOutcome {
                        existed: true,
                        generation,
                    }
                }
                Entry::Vacant(_) => DeleteOutcome {
                    existed: false,
                    generation: self.next_generation(),
                },
            };
            if outcome.existed {
                tracing::info!("Deleted file {} (generation {})", file_id, outcome.generation);
            } else {
                tracing::debug!("Delete of absent file {} ignored", file_id);
            }
            Ok(outcome)
        })
    }
}
