use super::types::{AudioFile, TranscriptSegment};
use crate::error::{SearchError, ServiceResult};

/// Provider timestamps may run slightly past the reported duration.
pub const DURATION_TOLERANCE_SECS: f64 = 0.5;

/// Checks a full segment set before it replaces a file's transcript.
///
/// A duration of zero means the duration is unknown and is not used as an upper bound.
pub fn validate_segments(file: &AudioFile, segments: &[TranscriptSegment]) -> ServiceResult<()> {
    let mut previous_start = f64::NEG_INFINITY;

    for (position, segment) in segments.iter().enumerate() {
        let fail = |reason: String| {
            Err(SearchError::Validation(format!(
                "file {} segment {}: {}",
                file.file_id, position, reason
            )))
        };

        if segment.index as usize != position {
            return fail(format!("index {} does not match position", segment.index));
        }
        if segment.text.trim().is_empty() {
            return fail("text is empty".to_string());
        }
        if !segment.start_time.is_finite() || !segment.end_time.is_finite() {
            return fail("timestamps must be finite".to_string());
        }
        if segment.start_time < 0.0 {
            return fail(format!("start_time {} is negative", segment.start_time));
        }
        if segment.start_time >= segment.end_time {
            return fail(format!(
                "start_time {} is not before end_time {}",
                segment.start_time, segment.end_time
            ));
        }
        if file.duration > 0.0 && segment.end_time > file.duration + DURATION_TOLERANCE_SECS {
            return fail(format!(
                "end_time {} exceeds duration {}",
                segment.end_time, file.duration
            ));
        }
        if !(0.0..=1.0).contains(&segment.confidence) {
            return fail(format!("confidence {} outside [0, 1]", segment.confidence));
        }
        if segment.start_time < previous_start {
            return fail(format!(
                "start_time {} is earlier than previous segment's {}",
                segment.start_time, previous_start
            ));
        }
        previous_start = segment.start_time;
    }

    Ok(())
}
