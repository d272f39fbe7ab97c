//! Provider transcript normalization.
//!
//! Turns whatever shape a provider delivered into ordered, re-indexed
//! `TranscriptSegment`s. The result still goes through store validation.

use super::types::{ProviderSegment, ProviderTranscript, ProviderWord};
use crate::error::{SearchError, ServiceResult};
use crate::storage::types::TranscriptSegment;
use crate::storage::validation::DURATION_TOLERANCE_SECS;

/// Silence between two words (seconds) that starts a new segment.
pub const MAX_WORD_GAP_SECS: f64 = 1.0;
pub const MAX_WORDS_PER_SEGMENT: usize = 30;
pub const DEFAULT_CONFIDENCE: f64 = 1.0;
/// Span given to a segment whose provider timestamps have zero length.
pub const MIN_SEGMENT_SECS: f64 = 0.01;

pub fn normalize(transcript: ProviderTranscript, duration: f64) -> ServiceResult<Vec<TranscriptSegment>> {
    let ProviderTranscript {
        segments,
        words,
        text,
        ..
    } = transcript;

    let timed = match (segments, words, text) {
        (Some(segments), None, None) => from_segments(segments),
        (None, Some(words), None) => from_words(words),
        (None, None, Some(text)) => return from_text(&text, duration),
        (None, None, None) => {
            return Err(SearchError::Validation(
                "transcript needs one of segments, words or text".to_string(),
            ));
        }
        _ => {
            return Err(SearchError::Validation(
                "transcript must carry exactly one of segments, words or text".to_string(),
            ));
        }
    };

    Ok(timed
        .into_iter()
        .map(|segment| fit_to_duration(segment, duration))
        .collect())
}

/// Gives zero-length segments a minimal span and pulls end times that overrun
/// the file by less than the tolerance back to the file's end. Anything further
/// off is left for store validation to reject.
fn fit_to_duration(mut segment: TranscriptSegment, duration: f64) -> TranscriptSegment {
    let known = duration > 0.0;

    if segment.end_time == segment.start_time {
        segment.end_time = segment.start_time + MIN_SEGMENT_SECS;
        if known && segment.end_time > duration {
            segment.end_time = duration;
            segment.start_time = (duration - MIN_SEGMENT_SECS).max(0.0);
        }
    }
    if known && segment.end_time > duration && segment.end_time <= duration + DURATION_TOLERANCE_SECS {
        segment.end_time = duration;
    }

    segment
}

fn from_segments(segments: Vec<ProviderSegment>) -> Vec<TranscriptSegment> {
    let mut kept: Vec<ProviderSegment> = segments
        .into_iter()
        .filter(|s| !s.text.trim().is_empty())
        .collect();
    kept.sort_by(|a, b| a.start.total_cmp(&b.start));

    kept.into_iter()
        .enumerate()
        .map(|(index, s)| TranscriptSegment {
            index: index as u32,
            start_time: s.start,
            end_time: s.end,
            text: s.text.trim().to_string(),
            confidence: segment_confidence(&s),
        })
        .collect()
}

fn segment_confidence(segment: &ProviderSegment) -> f64 {
    match (segment.confidence, segment.avg_logprob) {
        (Some(confidence), _) => confidence,
        (None, Some(logprob)) if logprob.is_finite() => logprob.exp().clamp(0.0, 1.0),
        _ => DEFAULT_CONFIDENCE,
    }
}

fn from_words(words: Vec<ProviderWord>) -> Vec<TranscriptSegment> {
    let mut words: Vec<ProviderWord> = words
        .into_iter()
        .filter(|w| !w.word.trim().is_empty())
        .collect();
    words.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut groups: Vec<Vec<ProviderWord>> = Vec::new();
    let mut current: Vec<ProviderWord> = Vec::new();

    for word in words {
        if let Some(last) = current.last() {
            let gap = word.start - last.end;
            if gap > MAX_WORD_GAP_SECS
                || current.len() >= MAX_WORDS_PER_SEGMENT
                || ends_sentence(&last.word)
            {
                groups.push(std::mem::take(&mut current));
            }
        }
        current.push(word);
    }
    if !current.is_empty() {
        groups.push(current);
    }

    groups
        .into_iter()
        .enumerate()
        .filter_map(|(index, group)| {
            let first = group.first()?;
            let last = group.last()?;
            let text = group
                .iter()
                .map(|w| w.word.trim())
                .collect::<Vec<&str>>()
                .join(" ");
            let confidence = group
                .iter()
                .map(|w| w.confidence.unwrap_or(DEFAULT_CONFIDENCE))
                .sum::<f64>()
                / group.len() as f64;

            Some(TranscriptSegment {
                index: index as u32,
                start_time: first.start,
                end_time: last.end,
                text,
                confidence,
            })
        })
        .collect()
}

fn ends_sentence(word: &str) -> bool {
    word.trim_end().ends_with(['.', '?', '!'])
}

fn from_text(text: &str, duration: f64) -> ServiceResult<Vec<TranscriptSegment>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }
    if duration <= 0.0 {
        return Err(SearchError::Validation(
            "untimed text needs a file with a known duration".to_string(),
        ));
    }

    Ok(vec![TranscriptSegment {
        index: 0,
        start_time: 0.0,
        end_time: duration,
        text: text.to_string(),
        confidence: DEFAULT_CONFIDENCE,
    }])
}
