//! Relevance scoring.
//!
//! A candidate's relevance has two parts:
//! - a **coverage tier**: how many distinct query terms the segment contains;
//! - an **in-tier quality** in `[0, 1)`: a blend of saturated term frequency and
//!   phrase/proximity, scaled by transcription confidence.
//!
//! The tier always dominates, so a segment covering more query terms outranks
//! one covering fewer however often the latter repeats its term. Within a tier,
//! exact phrases beat near matches beat scattered ones, and low-confidence
//! segments sink below equally matching high-confidence ones.

use super::planner::QueryPlan;
use crate::config::RankingWeights;
use crate::index::types::CandidateMatch;

use std::cmp::Ordering;

/// Length normalization strength for term frequency (0 = none, 1 = full).
const LENGTH_NORMALIZATION: f64 = 0.75;

/// Quality stays strictly below one coverage tier.
const QUALITY_SPAN: f64 = 0.99;

/// Proximity for a near (not exact) match is scaled into `[0, NEAR_MATCH_CEILING]`.
const NEAR_MATCH_CEILING: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct ScoredSegment {
    pub candidate: CandidateMatch,
    pub relevance: f64,
    /// Distinct query terms present in the segment, in query order.
    pub matched_terms: Vec<String>,
    pub coverage: f64,
    pub term_frequency: f64,
    pub proximity: f64,
}

impl ScoredSegment {
    fn start_time(&self) -> f64 {
        self.candidate.segment().map(|s| s.start_time).unwrap_or(f64::MAX)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Ranker {
    weights: RankingWeights,
}

impl Ranker {
    pub fn new(weights: RankingWeights) -> Self {
        Self { weights }
    }

    /// Scores every candidate and orders them: relevance descending, then
    /// earliest start time, then file id, then segment index.
    pub fn rank(
        &self,
        candidates: impl IntoIterator<Item = CandidateMatch>,
        plan: &QueryPlan,
    ) -> Vec<ScoredSegment> {
        let mut scored: Vec<ScoredSegment> = candidates
            .into_iter()
            .filter(|candidate| candidate.segment().is_some())
            .map(|candidate| self.score(candidate, plan))
            .filter(|scored| !scored.matched_terms.is_empty())
            .collect();

        scored.sort_by(compare_ranked);
        scored
    }

    pub fn score(&self, candidate: CandidateMatch, plan: &QueryPlan) -> ScoredSegment {
        let query_terms = plan.terms.len().max(1) as f64;
        let matched_terms: Vec<String> = plan
            .terms
            .iter()
            .filter(|term| candidate.term_positions.contains_key(*term))
            .cloned()
            .collect();
        let matched = matched_terms.len() as f64;

        let coverage = matched / query_terms;
        let term_frequency = self.term_frequency(&candidate, &matched_terms) / query_terms;
        let proximity = self.proximity(&candidate, plan, &matched_terms);

        let weight_total = self.weights.term_frequency + self.weights.proximity;
        let quality = if weight_total > 0.0 {
            (self.weights.term_frequency * term_frequency + self.weights.proximity * proximity)
                / weight_total
        } else {
            0.0
        };

        let confidence = candidate
            .segment()
            .map(|s| s.confidence.clamp(0.0, 1.0))
            .unwrap_or(0.0);
        let floor = self.weights.confidence_floor.clamp(0.0, 1.0);
        let confidence_factor = floor + (1.0 - floor) * confidence;

        let relevance = (matched + QUALITY_SPAN * quality.clamp(0.0, 1.0) * confidence_factor) / query_terms;

        ScoredSegment {
            candidate,
            relevance,
            matched_terms,
            coverage,
            term_frequency,
            proximity,
        }
    }

    /// Sum over matched terms of a saturating, length-normalized frequency.
    fn term_frequency(&self, candidate: &CandidateMatch, matched_terms: &[String]) -> f64 {
        let reference = self.weights.reference_segment_len.max(1.0);
        let length = candidate.segment_len().max(1) as f64;
        let norm = 1.0 - LENGTH_NORMALIZATION + LENGTH_NORMALIZATION * (length / reference);
        let k = self.weights.tf_saturation.max(f64::EPSILON);

        matched_terms
            .iter()
            .filter_map(|term| candidate.term_positions.get(term))
            .map(|positions| {
                let tf = positions.len() as f64;
                tf / (tf + k * norm)
            })
            .sum()
    }

    /// 1.0 for an exact in-order phrase (or a single-term query); a smaller
    /// value when matched terms sit within the proximity window; else 0.
    fn proximity(&self, candidate: &CandidateMatch, plan: &QueryPlan, matched_terms: &[String]) -> f64 {
        if plan.terms.len() == 1 {
            return if matched_terms.is_empty() { 0.0 } else { 1.0 };
        }
        if matched_terms.len() < 2 {
            return 0.0;
        }
        if plan.is_phrase() && contains_phrase(candidate, &plan.sequence) {
            return 1.0;
        }

        let Some(span) = minimal_span(candidate, matched_terms) else {
            return 0.0;
        };
        let ideal = (matched_terms.len() - 1) as f64;
        if span > self.weights.proximity_window.max(1) {
            return 0.0;
        }
        NEAR_MATCH_CEILING * (ideal / span.max(1) as f64).min(1.0)
    }
}

/// Ordering used for results. Total over `f64` via `total_cmp`.
pub fn compare_ranked(a: &ScoredSegment, b: &ScoredSegment) -> Ordering {
    b.relevance
        .total_cmp(&a.relevance)
        .then_with(|| a.start_time().total_cmp(&b.start_time()))
        .then_with(|| a.candidate.file.file_id.cmp(&b.candidate.file.file_id))
        .then_with(|| a.candidate.segment_index.cmp(&b.candidate.segment_index))
}

/// Whether `sequence` appears at consecutive positions in the segment.
fn contains_phrase(candidate: &CandidateMatch, sequence: &[String]) -> bool {
    let Some(first) = sequence.first().and_then(|t| candidate.term_positions.get(t)) else {
        return false;
    };

    first.iter().any(|&start| {
        sequence.iter().enumerate().skip(1).all(|(offset, term)| {
            candidate
                .term_positions
                .get(term)
                .is_some_and(|positions| positions.binary_search(&(start + offset as u32)).is_ok())
        })
    })
}

/// Smallest `last - first` position distance of a window holding at least one
/// occurrence of every matched term.
fn minimal_span(candidate: &CandidateMatch, matched_terms: &[String]) -> Option<u32> {
    let mut occurrences: Vec<(u32, usize)> = Vec::new();
    for (slot, term) in matched_terms.iter().enumerate() {
        for &position in candidate.term_positions.get(term)? {
            occurrences.push((position, slot));
        }
    }
    occurrences.sort_unstable();

    let needed = matched_terms.len();
    let mut counts = vec![0usize; needed];
    let mut covered = 0usize;
    let mut best: Option<u32> = None;
    let mut left = 0usize;

    for right in 0..occurrences.len() {
        let (_, slot) = occurrences[right];
        if counts[slot] == 0 {
            covered += 1;
        }
        counts[slot] += 1;

        while covered == needed {
            let span = occurrences[right].0 - occurrences[left].0;
            best = Some(best.map_or(span, |b| b.min(span)));

            let (_, left_slot) = occurrences[left];
            counts[left_slot] -= 1;
            if counts[left_slot] == 0 {
                covered -= 1;
            }
            left += 1;
        }
    }

    best
}
