//! Generation-swapped inverted index.
//!
//! Two maps make up the index:
//! - `files`: file id -> the live `FileIndex` snapshot (or a deletion tombstone).
//! - `directory`: term -> ids of files whose live snapshot contains the term.
//!
//! `files` is the source of truth for reads; `directory` only narrows which
//! files a lookup has to open. Writers update both while holding the file's
//! entry in `files`, always locking `files` before `directory`. Readers never
//! hold a `directory` guard while touching `files`.

use super::types::{CandidateMatch, FileIndex, IndexStats, SegmentKey};
use crate::storage::types::StoredTranscript;

use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

#[derive(Debug, Clone)]
enum FileSlot {
    Live(Arc<FileIndex>),
    Removed { generation: u64 },
}

impl FileSlot {
    fn generation(&self) -> u64 {
        match self {
            FileSlot::Live(index) => index.generation,
            FileSlot::Removed { generation } => *generation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Published { replaced: Option<u64> },
    /// A newer generation (or deletion) is already visible; this build was discarded.
    Superseded { current: u64 },
}

#[derive(Default)]
pub struct TextIndex {
    files: DashMap<String, FileSlot>,
    directory: DashMap<String, DashSet<String>>,
}

impl TextIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generation currently visible for a file, including deletions.
    pub fn current_generation(&self, file_id: &str) -> Option<u64> {
        self.files.get(file_id).map(|slot| slot.generation())
    }

    /// True once something newer than `generation` is visible for the file.
    pub fn is_superseded(&self, file_id: &str, generation: u64) -> bool {
        self.current_generation(file_id)
            .is_some_and(|current| current > generation)
    }

    pub fn snapshot(&self, file_id: &str) -> Option<Arc<FileIndex>> {
        match self.files.get(file_id)?.value() {
            FileSlot::Live(index) => Some(index.clone()),
            FileSlot::Removed { .. } => None,
        }
    }

    /// Builds the postings for one stored generation and publishes them.
    ///
    /// The build checks between segments whether a newer generation has become
    /// visible and stops early if so.
    pub fn index_file(&self, file_id: &str, transcript: &StoredTranscript) -> PublishOutcome {
        let mut staged = FileIndex::staged(file_id, transcript);

        for segment in transcript.segments.iter() {
            if let Some(current) = self
                .current_generation(file_id)
                .filter(|current| *current > transcript.generation)
            {
                tracing::debug!(
                    "Abandoning build of {} generation {}: generation {} is visible",
                    file_id,
                    transcript.generation,
                    current
                );
                return PublishOutcome::Superseded { current };
            }
            staged.index_segment(segment);
        }

        self.publish(staged)
    }

    /// Swaps a fully built generation in, unless something newer is visible.
    pub fn publish(&self, staged: FileIndex) -> PublishOutcome {
        let file_id = staged.file_id.clone();
        let generation = staged.generation;
        let new_terms: HashSet<String> = staged.terms.keys().cloned().collect();
        let staged = Arc::new(staged);

        match self.files.entry(file_id.clone()) {
            Entry::Occupied(mut slot) => {
                let current = slot.get().generation();
                if current > generation {
                    tracing::debug!(
                        "Discarding generation {} of {}: generation {} is visible",
                        generation,
                        file_id,
                        current
                    );
                    return PublishOutcome::Superseded { current };
                }

                self.add_to_directory(&file_id, &new_terms);
                let previous = slot.insert(FileSlot::Live(staged));
                if let FileSlot::Live(old) = &previous {
                    let stale: Vec<&String> = old
                        .terms
                        .keys()
                        .filter(|term| !new_terms.contains(*term))
                        .collect();
                    self.remove_from_directory(&file_id, stale);
                }

                tracing::info!(
                    "Published generation {} of {} (replaced {})",
                    generation,
                    file_id,
                    current
                );
                PublishOutcome::Published {
                    replaced: Some(current),
                }
            }
            Entry::Vacant(slot) => {
                self.add_to_directory(&file_id, &new_terms);
                slot.insert(FileSlot::Live(staged));
                tracing::info!("Published generation {} of {}", generation, file_id);
                PublishOutcome::Published { replaced: None }
            }
        }
    }

    /// Drops every posting of a file, leaving a tombstone at `generation`.
    ///
    /// Ignored when a newer generation is already visible. Returns whether a
    /// live snapshot was removed.
    pub fn remove_file(&self, file_id: &str, generation: u64) -> bool {
        match self.files.entry(file_id.to_string()) {
            Entry::Occupied(mut slot) => {
                let current = slot.get().generation();
                if current > generation {
                    tracing::debug!(
                        "Ignoring removal of {} at generation {}: generation {} is visible",
                        file_id,
                        generation,
                        current
                    );
                    return false;
                }
                let previous = slot.insert(FileSlot::Removed { generation });
                match previous {
                    FileSlot::Live(old) => {
                        self.remove_from_directory(file_id, old.terms.keys());
                        tracing::info!("Removed postings of {} (generation {})", file_id, current);
                        true
                    }
                    FileSlot::Removed { .. } => false,
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(FileSlot::Removed { generation });
                false
            }
        }
    }

    /// Candidate segments containing any of `terms`, each read from one snapshot.
    pub fn lookup(&self, terms: &[String]) -> BTreeMap<SegmentKey, CandidateMatch> {
        let mut file_ids: BTreeSet<String> = BTreeSet::new();
        for term in terms {
            if let Some(holders) = self.directory.get(term) {
                file_ids.extend(holders.iter().map(|id| id.key().clone()));
            }
        }

        let mut candidates: BTreeMap<SegmentKey, CandidateMatch> = BTreeMap::new();
        for file_id in file_ids {
            let Some(snapshot) = self.snapshot(&file_id) else {
                continue;
            };

            for term in terms {
                let Some(postings) = snapshot.terms.get(term) else {
                    continue;
                };
                for posting in postings {
                    let key = SegmentKey {
                        file_id: file_id.clone(),
                        segment_index: posting.segment_index,
                    };
                    candidates
                        .entry(key)
                        .or_insert_with(|| CandidateMatch {
                            file: snapshot.clone(),
                            segment_index: posting.segment_index,
                            term_positions: BTreeMap::new(),
                        })
                        .term_positions
                        .insert(term.clone(), posting.positions.clone());
                }
            }
        }

        candidates
    }

    /// Ids of files with a live snapshot, sorted.
    pub fn live_files(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .files
            .iter()
            .filter(|slot| matches!(slot.value(), FileSlot::Live(_)))
            .map(|slot| slot.key().clone())
            .collect();
        ids.sort();
        ids
    }

    pub fn stats(&self) -> IndexStats {
        let mut stats = IndexStats {
            distinct_terms: self.directory.len(),
            ..IndexStats::default()
        };
        for slot in self.files.iter() {
            match slot.value() {
                FileSlot::Live(index) => {
                    stats.indexed_files += 1;
                    stats.indexed_segments += index.segments.len();
                    stats.total_postings += index.posting_count();
                }
                FileSlot::Removed { .. } => stats.tombstones += 1,
            }
        }
        stats
    }

    fn add_to_directory(&self, file_id: &str, terms: &HashSet<String>) {
        for term in terms {
            self.directory
                .entry(term.clone())
                .or_default()
                .insert(file_id.to_string());
        }
    }

    fn remove_from_directory<'a>(&self, file_id: &str, terms: impl IntoIterator<Item = &'a String>) {
        for term in terms {
            if let Some(holders) = self.directory.get(term) {
                holders.remove(file_id);
            }
            self.directory.remove_if(term, |_, holders| holders.is_empty());
        }
    }
}
