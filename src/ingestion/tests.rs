//! Ingestion Module Tests
//!
//! ## Test Scopes
//! - **Normalization**: Segment, word and plain-text provider shapes.
//! - **Handlers**: Transcript submission and one-shot ingest through the search service.

#[cfg(test)]
mod tests {
    use crate::config::ServiceConfig;
    use crate::error::SearchError;
    use crate::ingestion::handlers::{handle_ingest, handle_submit_transcript};
    use crate::ingestion::normalize::{MAX_WORDS_PER_SEGMENT, MIN_SEGMENT_SECS, normalize};
    use crate::ingestion::types::{IngestRequest, ProviderSegment, ProviderTranscript, ProviderWord};
    use crate::search::service::SearchService;
    use crate::search::types::SearchRequest;
    use crate::storage::types::{AudioFile, ProcessingStatus};
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::{Extension, Json};
    use std::sync::Arc;

    fn provider_segment(start: f64, end: f64, text: &str) -> ProviderSegment {
        ProviderSegment {
            start,
            end,
            text: text.to_string(),
            confidence: None,
            avg_logprob: None,
        }
    }

    fn word(text: &str, start: f64, end: f64, confidence: f64) -> ProviderWord {
        ProviderWord {
            word: text.to_string(),
            start,
            end,
            confidence: Some(confidence),
        }
    }

    // ============================================================
    // NORMALIZATION TESTS - segments
    // ============================================================

    #[test]
    fn test_segments_are_trimmed_sorted_and_reindexed() {
        let transcript = ProviderTranscript {
            segments: Some(vec![
                provider_segment(5.0, 9.0, "  second part "),
                provider_segment(2.0, 3.0, "   "),
                provider_segment(0.0, 5.0, "first part"),
            ]),
            ..ProviderTranscript::default()
        };

        let segments = normalize(transcript, 0.0).unwrap();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].index, 0);
        assert_eq!(segments[0].text, "first part");
        assert_eq!(segments[1].index, 1);
        assert_eq!(segments[1].text, "second part");
        assert_eq!(segments[1].start_time, 5.0);
        assert_eq!(segments[1].confidence, 1.0);
    }

    #[test]
    fn test_segment_confidence_from_logprob() {
        let transcript = ProviderTranscript {
            segments: Some(vec![
                ProviderSegment {
                    avg_logprob: Some(-0.5),
                    ..provider_segment(0.0, 1.0, "a")
                },
                ProviderSegment {
                    confidence: Some(0.42),
                    avg_logprob: Some(-3.0),
                    ..provider_segment(1.0, 2.0, "b")
                },
            ]),
            ..ProviderTranscript::default()
        };

        let segments = normalize(transcript, 0.0).unwrap();

        assert!((segments[0].confidence - (-0.5f64).exp()).abs() < 1e-12);
        assert_eq!(segments[1].confidence, 0.42);
    }

    // ============================================================
    // NORMALIZATION TESTS - words
    // ============================================================

    #[test]
    fn test_words_split_on_silence_and_punctuation() {
        let transcript = ProviderTranscript {
            words: Some(vec![
                word("hello", 0.0, 0.4, 1.0),
                word("team.", 0.5, 0.9, 0.8),
                word("today", 1.0, 1.3, 0.9),
                word("we", 1.4, 1.5, 0.7),
                word("ship", 4.0, 4.5, 0.6),
            ]),
            ..ProviderTranscript::default()
        };

        let segments = normalize(transcript, 0.0).unwrap();

        let texts: Vec<&str> = segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["hello team.", "today we", "ship"]);
        assert_eq!(segments[0].start_time, 0.0);
        assert_eq!(segments[0].end_time, 0.9);
        assert!((segments[0].confidence - 0.9).abs() < 1e-12);
        assert!((segments[1].confidence - 0.8).abs() < 1e-12);
        assert_eq!(segments[2].index, 2);
    }

    #[test]
    fn test_words_split_at_max_length() {
        let words: Vec<ProviderWord> = (0..MAX_WORDS_PER_SEGMENT + 5)
            .map(|i| word("talk", i as f64 * 0.5, i as f64 * 0.5 + 0.4, 1.0))
            .collect();
        let transcript = ProviderTranscript {
            words: Some(words),
            ..ProviderTranscript::default()
        };

        let segments = normalize(transcript, 0.0).unwrap();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text.split(' ').count(), MAX_WORDS_PER_SEGMENT);
        assert_eq!(segments[1].text.split(' ').count(), 5);
    }

    #[test]
    fn test_zero_length_word_gets_minimal_span() {
        let transcript = ProviderTranscript {
            words: Some(vec![word("Hello.", 0.0, 0.5, 0.9), word("ok", 3.0, 3.0, 0.9)]),
            ..ProviderTranscript::default()
        };

        let segments = normalize(transcript, 10.0).unwrap();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].start_time, 3.0);
        assert!(segments[1].end_time > segments[1].start_time);
        assert!(segments[1].end_time - segments[1].start_time <= MIN_SEGMENT_SECS + 1e-12);
    }

    #[test]
    fn test_zero_length_word_at_file_end_stays_inside_duration() {
        let transcript = ProviderTranscript {
            words: Some(vec![word("bye", 10.0, 10.0, 0.9)]),
            ..ProviderTranscript::default()
        };

        let segments = normalize(transcript, 10.0).unwrap();

        assert_eq!(segments[0].end_time, 10.0);
        assert!(segments[0].start_time < segments[0].end_time);
    }

    #[test]
    fn test_small_overrun_is_clamped_to_duration() {
        let transcript = ProviderTranscript {
            segments: Some(vec![
                provider_segment(0.0, 20.0, "intro"),
                provider_segment(20.0, 30.3, "closing remarks"),
            ]),
            ..ProviderTranscript::default()
        };

        let segments = normalize(transcript, 30.0).unwrap();

        assert_eq!(segments[1].end_time, 30.0);
        assert_eq!(segments[0].end_time, 20.0);
    }

    // ============================================================
    // NORMALIZATION TESTS - text and shape errors
    // ============================================================

    #[test]
    fn test_plain_text_spans_whole_file() {
        let transcript = ProviderTranscript {
            text: Some(" an untimed note ".to_string()),
            ..ProviderTranscript::default()
        };

        let segments = normalize(transcript.clone(), 42.0).unwrap();

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start_time, 0.0);
        assert_eq!(segments[0].end_time, 42.0);
        assert_eq!(segments[0].text, "an untimed note");
        assert!(matches!(normalize(transcript, 0.0), Err(SearchError::Validation(_))));
    }

    #[test]
    fn test_transcript_shape_must_be_unambiguous() {
        let empty = ProviderTranscript::default();
        let both = ProviderTranscript {
            segments: Some(vec![]),
            text: Some("x".to_string()),
            ..ProviderTranscript::default()
        };

        assert!(matches!(normalize(empty, 10.0), Err(SearchError::Validation(_))));
        assert!(matches!(normalize(both, 10.0), Err(SearchError::Validation(_))));
    }

    #[test]
    fn test_provider_transcript_rejects_unknown_fields() {
        let parsed: Result<ProviderTranscript, _> =
            serde_json::from_str(r#"{"segments": [], "speaker_labels": true}"#);

        assert!(parsed.is_err());
    }

    // ============================================================
    // HANDLER TESTS
    // ============================================================

    #[tokio::test]
    async fn test_submit_transcript_makes_it_searchable() {
        let service = Arc::new(SearchService::in_memory(ServiceConfig::default()));
        service
            .register_file(AudioFile::new("f1", "planning.mp3", 30.0))
            .await
            .unwrap();
        let transcript = ProviderTranscript {
            segments: Some(vec![provider_segment(0.0, 6.0, "budget review for next quarter")]),
            ..ProviderTranscript::default()
        };

        let (status, Json(write)) = handle_submit_transcript(
            Path("f1".to_string()),
            Extension(service.clone()),
            Ok(Json(transcript)),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::OK);
        assert!(write.indexed);
        assert_eq!(write.segment_count, 1);
        let response = service.search(SearchRequest::new("budget")).await.unwrap();
        assert_eq!(response.total_count, 1);
    }

    #[tokio::test]
    async fn test_submit_transcript_for_unknown_file() {
        let service = Arc::new(SearchService::in_memory(ServiceConfig::default()));

        let result = handle_submit_transcript(
            Path("ghost".to_string()),
            Extension(service),
            Ok(Json(ProviderTranscript {
                text: Some("boo".to_string()),
                ..ProviderTranscript::default()
            })),
        )
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.0, SearchError::NotFound("ghost".to_string()));
    }

    #[tokio::test]
    async fn test_ingest_registers_and_indexes() {
        let service = Arc::new(SearchService::in_memory(ServiceConfig::default()));
        let request = IngestRequest {
            file_id: None,
            filename: "interview.m4a".to_string(),
            duration: 20.0,
            transcript: ProviderTranscript {
                words: Some(vec![
                    word("hiring", 0.0, 0.5, 0.9),
                    word("plan", 0.6, 1.0, 0.9),
                ]),
                ..ProviderTranscript::default()
            },
        };

        let (status, Json(body)) = handle_ingest(Extension(service.clone()), Ok(Json(request)))
            .await
            .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.file.status, ProcessingStatus::Ready);
        assert!(!body.file.file_id.is_empty());
        let response = service.search(SearchRequest::new("hiring plan")).await.unwrap();
        assert_eq!(response.results[0].file_id, body.file.file_id);
    }

    #[tokio::test]
    async fn test_ingest_accepts_zero_length_words() {
        let service = Arc::new(SearchService::in_memory(ServiceConfig::default()));
        let request = IngestRequest {
            file_id: Some("f1".to_string()),
            filename: "clip.wav".to_string(),
            duration: 5.0,
            transcript: ProviderTranscript {
                words: Some(vec![word("Hello.", 0.0, 0.5, 0.9), word("ok", 3.0, 3.0, 0.8)]),
                ..ProviderTranscript::default()
            },
        };

        let (status, Json(body)) = handle_ingest(Extension(service.clone()), Ok(Json(request)))
            .await
            .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.file.status, ProcessingStatus::Ready);
        assert_eq!(body.write.segment_count, 2);
        assert_eq!(service.search(SearchRequest::new("ok")).await.unwrap().total_count, 1);
    }

    #[tokio::test]
    async fn test_ingest_with_invalid_timestamps_marks_file_failed() {
        let service = Arc::new(SearchService::in_memory(ServiceConfig::default()));
        let request = IngestRequest {
            file_id: Some("bad".to_string()),
            filename: "bad.wav".to_string(),
            duration: 10.0,
            transcript: ProviderTranscript {
                segments: Some(vec![provider_segment(8.0, 25.0, "runs past the end")]),
                ..ProviderTranscript::default()
            },
        };

        let result = handle_ingest(Extension(service.clone()), Ok(Json(request))).await;

        assert!(matches!(result, Err(ref e) if matches!(e.0, SearchError::Validation(_))));
        assert_eq!(
            service.get_file("bad").await.unwrap().status,
            ProcessingStatus::Failed
        );
    }
}
