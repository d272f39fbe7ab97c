use super::tokenizer::tokenize;
use crate::storage::types::{StoredTranscript, TranscriptSegment};

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Where a term occurs inside one segment. Term frequency is `positions.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    pub segment_index: u32,
    pub positions: Vec<u32>,
}

impl Posting {
    pub fn term_frequency(&self) -> usize {
        self.positions.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentKey {
    pub file_id: String,
    pub segment_index: u32,
}

/// Immutable postings for one generation of one file.
///
/// Built off to the side and swapped in whole, so readers holding an `Arc`
/// never see postings from two generations of the same file.
#[derive(Debug)]
pub struct FileIndex {
    pub file_id: String,
    pub generation: u64,
    pub segments: Arc<[TranscriptSegment]>,
    /// Token count per segment, indexed by segment index.
    pub segment_lengths: Vec<u32>,
    pub terms: HashMap<String, Vec<Posting>>,
}

impl FileIndex {
    /// An empty staging generation sharing the stored segment list.
    pub fn staged(file_id: &str, transcript: &StoredTranscript) -> Self {
        Self {
            file_id: file_id.to_string(),
            generation: transcript.generation,
            segments: transcript.segments.clone(),
            segment_lengths: vec![0; transcript.segments.len()],
            terms: HashMap::new(),
        }
    }

    /// Adds the postings of one segment to this staged generation.
    pub fn index_segment(&mut self, segment: &TranscriptSegment) {
        let tokens = tokenize(&segment.text);

        let slot = segment.index as usize;
        if slot >= self.segment_lengths.len() {
            self.segment_lengths.resize(slot + 1, 0);
        }
        self.segment_lengths[slot] = tokens.len() as u32;

        let mut by_term: BTreeMap<String, Vec<u32>> = BTreeMap::new();
        for token in tokens {
            by_term.entry(token.term).or_default().push(token.position);
        }

        for (term, positions) in by_term {
            self.terms.entry(term).or_default().push(Posting {
                segment_index: segment.index,
                positions,
            });
        }
    }

    pub fn segment(&self, segment_index: u32) -> Option<&TranscriptSegment> {
        self.segments.get(segment_index as usize)
    }

    pub fn segment_len(&self, segment_index: u32) -> u32 {
        self.segment_lengths
            .get(segment_index as usize)
            .copied()
            .unwrap_or(0)
    }

    pub fn posting_count(&self) -> usize {
        self.terms.values().map(|postings| postings.len()).sum()
    }
}

/// A segment that matched at least one query term, read from a single snapshot.
#[derive(Debug, Clone)]
pub struct CandidateMatch {
    pub file: Arc<FileIndex>,
    pub segment_index: u32,
    /// Matched term -> positions of that term in the segment.
    pub term_positions: BTreeMap<String, Vec<u32>>,
}

impl CandidateMatch {
    pub fn key(&self) -> SegmentKey {
        SegmentKey {
            file_id: self.file.file_id.clone(),
            segment_index: self.segment_index,
        }
    }

    pub fn segment(&self) -> Option<&TranscriptSegment> {
        self.file.segment(self.segment_index)
    }

    pub fn segment_len(&self) -> u32 {
        self.file.segment_len(self.segment_index)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct IndexStats {
    pub indexed_files: usize,
    pub tombstones: usize,
    pub indexed_segments: usize,
    pub distinct_terms: usize,
    pub total_postings: usize,
}
