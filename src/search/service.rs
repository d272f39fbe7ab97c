//! Search Service
//!
//! The single accessor for transcripts and postings. Every write goes through
//! here so the store and the index move together, and every search reads the
//! index snapshot plus store metadata through the retry policy.
//!
//! ## Write path
//! `put_segments` stores the new segment set (bumping the file's generation)
//! and then builds and publishes its postings before returning. `delete_file`
//! removes the file from the store and tombstones it in the index. Concurrent
//! writes to one file resolve latest-wins: an older build that finishes last is
//! discarded by the index.
//!
//! ## Read path
//! `search` plans the query, collects candidates from the index, loads file
//! metadata for the files touched, applies filters, ranks and paginates.

use super::planner::plan;
use super::ranker::{Ranker, ScoredSegment};
use super::types::{SearchRequest, SearchResponse, SearchResultItem};
use crate::admin::types::{CleanupReport, FileStatusCounts, ReindexReport, ServiceStats};
use crate::config::ServiceConfig;
use crate::error::{SearchError, ServiceResult};
use crate::index::inverted::{PublishOutcome, TextIndex};
use crate::retry::with_retry;
use crate::storage::memory::{DeleteOutcome, MemorySegmentStore, SegmentStore};
use crate::storage::partitioner::PartitionManager;
use crate::storage::types::{AudioFile, ProcessingStatus, StoredTranscript, TranscriptSegment};

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

/// What a successful transcript write did.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteReport {
    pub file_id: String,
    pub generation: u64,
    pub segments: usize,
    /// False when a newer write won the race and this generation was never visible.
    pub indexed: bool,
}

pub struct SearchService {
    store: Arc<dyn SegmentStore>,
    index: Arc<TextIndex>,
    ranker: Ranker,
    config: ServiceConfig,
    started_at: Instant,
}

impl SearchService {
    pub fn new(store: Arc<dyn SegmentStore>, index: Arc<TextIndex>, config: ServiceConfig) -> Self {
        Self {
            store,
            index,
            ranker: Ranker::new(config.ranking.clone()),
            config,
            started_at: Instant::now(),
        }
    }

    /// A service backed by the in-process store.
    pub fn in_memory(config: ServiceConfig) -> Self {
        let store = MemorySegmentStore::new(PartitionManager::new(config.partitions));
        Self::new(Arc::new(store), Arc::new(TextIndex::new()), config)
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn index(&self) -> &TextIndex {
        &self.index
    }

    // --- Catalog ---

    pub async fn register_file(&self, file: AudioFile) -> ServiceResult<AudioFile> {
        with_retry(&self.config.retry, "register_file", || {
            self.store.register_file(file.clone())
        })
        .await
    }

    pub async fn get_file(&self, file_id: &str) -> ServiceResult<AudioFile> {
        with_retry(&self.config.retry, "get_file", || self.store.get_file(file_id)).await
    }

    pub async fn list_files(&self) -> ServiceResult<Vec<AudioFile>> {
        with_retry(&self.config.retry, "list_files", || self.store.list_files()).await
    }

    pub async fn set_status(&self, file_id: &str, status: ProcessingStatus) -> ServiceResult<AudioFile> {
        with_retry(&self.config.retry, "set_status", || {
            self.store.set_status(file_id, status)
        })
        .await
    }

    // --- Transcripts ---

    /// Replaces a file's segments and makes them searchable before returning.
    pub async fn put_segments(
        &self,
        file_id: &str,
        segments: Vec<TranscriptSegment>,
    ) -> ServiceResult<WriteReport> {
        let stored = with_retry(&self.config.retry, "put_segments", || {
            self.store.put_segments(file_id, segments.clone())
        })
        .await?;

        Ok(self.publish(file_id, &stored))
    }

    pub async fn get_segments(&self, file_id: &str) -> ServiceResult<Vec<TranscriptSegment>> {
        with_retry(&self.config.retry, "get_segments", || self.store.get_segments(file_id)).await
    }

    /// Full transcript text: segment texts in order, joined by single spaces.
    pub async fn transcript_text(&self, file_id: &str) -> ServiceResult<String> {
        let segments = self.get_segments(file_id).await?;
        Ok(segments
            .iter()
            .map(|segment| segment.text.trim())
            .collect::<Vec<&str>>()
            .join(" "))
    }

    pub async fn delete_file(&self, file_id: &str) -> ServiceResult<DeleteOutcome> {
        let outcome = with_retry(&self.config.retry, "delete", || self.store.delete(file_id)).await?;
        // Unknown ids get no tombstone unless the index has seen them.
        if outcome.existed || self.index.current_generation(file_id).is_some() {
            self.index.remove_file(file_id, outcome.generation);
        }
        Ok(outcome)
    }

    fn publish(&self, file_id: &str, stored: &StoredTranscript) -> WriteReport {
        let indexed = match self.index.index_file(file_id, stored) {
            PublishOutcome::Published { .. } => true,
            PublishOutcome::Superseded { current } => {
                tracing::info!(
                    "Generation {} of {} superseded by {} before it became visible",
                    stored.generation,
                    file_id,
                    current
                );
                false
            }
        };

        WriteReport {
            file_id: file_id.to_string(),
            generation: stored.generation,
            segments: stored.segments.len(),
            indexed,
        }
    }

    // --- Search ---

    pub async fn search(&self, request: SearchRequest) -> ServiceResult<SearchResponse> {
        let started = Instant::now();
        let plan = plan(&request.query)?;

        let limit = request
            .limit
            .unwrap_or(self.config.default_limit)
            .clamp(1, self.config.max_limit);
        let offset = request.offset.unwrap_or(0);

        if let (Some(from), Some(to)) = (request.date_from, request.date_to) {
            if from > to {
                return Err(SearchError::InvalidQuery(format!(
                    "date_from {} is after date_to {}",
                    from, to
                )));
            }
        }

        let candidates = self.index.lookup(&plan.terms);
        tracing::debug!(
            "Query {:?}: {} terms, {} candidate segments",
            plan.query,
            plan.terms.len(),
            candidates.len()
        );

        let wanted: Option<HashSet<&str>> = request
            .file_ids
            .as_ref()
            .map(|ids| ids.iter().map(String::as_str).collect());

        let mut files: BTreeMap<String, Option<AudioFile>> = BTreeMap::new();
        for key in candidates.keys() {
            if files.contains_key(&key.file_id) {
                continue;
            }
            if wanted.as_ref().is_some_and(|ids| !ids.contains(key.file_id.as_str())) {
                files.insert(key.file_id.clone(), None);
                continue;
            }
            let file = match self.get_file(&key.file_id).await {
                Ok(file) => Some(file),
                // Deleted between lookup and now.
                Err(SearchError::NotFound(_)) => None,
                Err(e) => return Err(e),
            };
            let file = file.filter(|f| {
                request.date_from.is_none_or(|from| f.upload_time >= from)
                    && request.date_to.is_none_or(|to| f.upload_time <= to)
            });
            files.insert(key.file_id.clone(), file);
        }

        let eligible = candidates
            .into_values()
            .filter(|candidate| matches!(files.get(&candidate.file.file_id), Some(Some(_))));

        let ranked: Vec<ScoredSegment> = self
            .ranker
            .rank(eligible, &plan)
            .into_iter()
            .filter(|scored| scored.relevance > self.config.min_score)
            .collect();

        let total_count = ranked.len();
        let results: Vec<SearchResultItem> = ranked
            .into_iter()
            .skip(offset)
            .take(limit)
            .filter_map(|scored| {
                let file = files.get(&scored.candidate.file.file_id)?.as_ref()?;
                to_result_item(scored, file)
            })
            .collect();

        let took_ms = started.elapsed().as_secs_f64() * 1000.0;
        tracing::info!(
            "Search {:?}: {} matches, returning {} (offset {}) in {:.2}ms",
            plan.query,
            total_count,
            results.len(),
            offset,
            took_ms
        );

        Ok(SearchResponse {
            success: true,
            query: plan.query,
            total_count,
            count: results.len(),
            limit,
            offset,
            took_ms,
            results,
        })
    }

    // --- Maintenance ---

    /// Compares every file's indexed generation with the store and rebuilds
    /// the whole index from the store.
    pub async fn rebuild_index(&self) -> ServiceResult<ReindexReport> {
        let started = Instant::now();
        let files = self.list_files().await?;
        let mut report = ReindexReport::default();
        let mut known: HashSet<String> = HashSet::new();

        for file in files {
            known.insert(file.file_id.clone());
            let stored = match with_retry(&self.config.retry, "get_transcript", || {
                self.store.get_transcript(&file.file_id)
            })
            .await
            {
                Ok(stored) => Some(stored),
                Err(SearchError::NotFound(_)) => None,
                Err(e) => return Err(e),
            };

            if let Err(finding) = self.check_consistency(&file.file_id, stored.as_ref()) {
                tracing::warn!("{}", finding);
                report.inconsistencies.push(finding.to_string());
            }

            match stored {
                Some(stored) => {
                    let written = self.publish(&file.file_id, &stored);
                    if written.indexed {
                        report.files_indexed += 1;
                        report.segments_indexed += written.segments;
                    }
                }
                None => self.sweep_orphan(&file.file_id, &mut report).await?,
            }
        }

        for file_id in self.index.live_files() {
            if known.contains(&file_id) {
                continue;
            }
            self.sweep_orphan(&file_id, &mut report).await?;
        }

        report.took_ms = started.elapsed().as_secs_f64() * 1000.0;
        tracing::info!(
            "Reindex complete: {} files, {} segments, {} inconsistencies, {} orphans removed",
            report.files_indexed,
            report.segments_indexed,
            report.inconsistencies.len(),
            report.orphans_removed
        );
        Ok(report)
    }

    /// Removes index entries for files the store no longer holds, without
    /// rebuilding the rest of the index.
    pub async fn cleanup(&self) -> ServiceResult<CleanupReport> {
        let mut report = ReindexReport::default();
        for file_id in self.index.live_files() {
            self.sweep_orphan(&file_id, &mut report).await?;
        }

        tracing::info!(
            "Cleanup complete: {} stale entries removed, {} files republished",
            report.orphans_removed,
            report.files_indexed
        );
        Ok(CleanupReport {
            success: true,
            stale_entries_removed: report.orphans_removed,
            files_republished: report.files_indexed,
            inconsistencies: report.inconsistencies,
        })
    }

    /// Drops the postings of a file the store no longer has a transcript for.
    ///
    /// The store is read again first: a file written after the rebuild listed
    /// the catalog is republished instead of removed.
    async fn sweep_orphan(&self, file_id: &str, report: &mut ReindexReport) -> ServiceResult<()> {
        let Some(snapshot) = self.index.snapshot(file_id) else {
            return Ok(());
        };

        match with_retry(&self.config.retry, "get_transcript", || {
            self.store.get_transcript(file_id)
        })
        .await
        {
            Ok(stored) if stored.generation == snapshot.generation => Ok(()),
            Ok(stored) => {
                tracing::debug!(
                    "{} gained generation {} during sweep, keeping it",
                    file_id,
                    stored.generation
                );
                let written = self.publish(file_id, &stored);
                if written.indexed {
                    report.files_indexed += 1;
                    report.segments_indexed += written.segments;
                }
                Ok(())
            }
            Err(SearchError::NotFound(_)) => {
                let finding = SearchError::IndexInconsistency {
                    file_id: file_id.to_string(),
                    detail: format!(
                        "generation {} indexed but absent from store",
                        snapshot.generation
                    ),
                };
                tracing::warn!("{}", finding);
                report.inconsistencies.push(finding.to_string());
                if self.index.remove_file(file_id, snapshot.generation) {
                    report.orphans_removed += 1;
                }
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// `IndexInconsistency` when the index does not reflect `stored` exactly.
    pub fn check_consistency(
        &self,
        file_id: &str,
        stored: Option<&StoredTranscript>,
    ) -> ServiceResult<()> {
        let snapshot = self.index.snapshot(file_id);
        let detail = match (stored, snapshot) {
            (None, None) => return Ok(()),
            (None, Some(snapshot)) => format!(
                "generation {} indexed but store has no transcript",
                snapshot.generation
            ),
            (Some(stored), None) => format!(
                "store has generation {} but nothing is indexed",
                stored.generation
            ),
            (Some(stored), Some(snapshot)) => {
                if snapshot.generation == stored.generation
                    && snapshot.segments.len() == stored.segments.len()
                {
                    return Ok(());
                }
                format!(
                    "store generation {} ({} segments), index generation {} ({} segments)",
                    stored.generation,
                    stored.segments.len(),
                    snapshot.generation,
                    snapshot.segments.len()
                )
            }
        };

        Err(SearchError::IndexInconsistency {
            file_id: file_id.to_string(),
            detail,
        })
    }

    pub async fn stats(&self) -> ServiceResult<ServiceStats> {
        let files = self.list_files().await?;
        let mut by_status = FileStatusCounts::default();
        for file in &files {
            match file.status {
                ProcessingStatus::Pending => by_status.pending += 1,
                ProcessingStatus::Transcribing => by_status.transcribing += 1,
                ProcessingStatus::Ready => by_status.ready += 1,
                ProcessingStatus::Failed => by_status.failed += 1,
            }
        }

        Ok(ServiceStats {
            total_files: files.len(),
            files_by_status: by_status,
            index: self.index.stats(),
            uptime_secs: self.started_at.elapsed().as_secs(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }
}

fn to_result_item(scored: ScoredSegment, file: &AudioFile) -> Option<SearchResultItem> {
    let segment = scored.candidate.segment()?;
    Some(SearchResultItem {
        file_id: file.file_id.clone(),
        filename: file.filename.clone(),
        segment_index: segment.index,
        transcript_segment: segment.text.clone(),
        start_time: segment.start_time,
        end_time: segment.end_time,
        confidence_score: segment.confidence,
        upload_time: file.upload_time,
        relevance_score: scored.relevance,
        matched_terms: scored.matched_terms.clone(),
    })
}
