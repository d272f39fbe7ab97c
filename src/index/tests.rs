//! Index Module Tests
//!
//! ## Test Scopes
//! - **Tokenizer**: Normalization is identical for text and queries.
//! - **Postings**: Positions and term frequencies recorded per segment.
//! - **Generations**: Latest-wins publication, tombstones, atomic visibility.

#[cfg(test)]
mod tests {
    use crate::index::inverted::{PublishOutcome, TextIndex};
    use crate::index::tokenizer::{terms, tokenize};
    use crate::index::types::FileIndex;
    use crate::storage::types::{StoredTranscript, TranscriptSegment};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn segment(index: u32, start: f64, text: &str) -> TranscriptSegment {
        TranscriptSegment {
            index,
            start_time: start,
            end_time: start + 5.0,
            text: text.to_string(),
            confidence: 0.9,
        }
    }

    fn transcript(generation: u64, texts: &[&str]) -> StoredTranscript {
        let segments: Vec<TranscriptSegment> = texts
            .iter()
            .enumerate()
            .map(|(i, text)| segment(i as u32, i as f64 * 10.0, text))
            .collect();
        StoredTranscript {
            generation,
            segments: segments.into(),
        }
    }

    // ============================================================
    // TOKENIZER TESTS
    // ============================================================

    #[test]
    fn test_tokenize_lowercases_and_splits_on_punctuation() {
        let tokens = terms("Let's focus on Product-Development, OK?");

        assert_eq!(
            tokens,
            vec!["let", "s", "focus", "on", "product", "development", "ok"]
        );
    }

    #[test]
    fn test_tokenize_keeps_short_words_and_numbers() {
        let tokens = terms("Q3 revenue up 12 percent in 2024");

        assert!(tokens.contains(&"q3".to_string()));
        assert!(tokens.contains(&"12".to_string()));
        assert!(tokens.contains(&"in".to_string()));
        assert!(tokens.contains(&"2024".to_string()));
    }

    #[test]
    fn test_tokenize_positions_are_sequential() {
        let tokens = tokenize("one, two... three");

        let positions: Vec<u32> = tokens.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn test_tokenize_unicode_words() {
        let tokens = terms("Książka о программировании");

        assert_eq!(tokens, vec!["książka", "о", "программировании"]);
    }

    #[test]
    fn test_tokenize_empty_and_punctuation_only() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  ?! -- ...").is_empty());
    }

    #[test]
    fn test_query_and_text_normalize_identically() {
        let text = "MARKETING Strategy";
        let query = "marketing STRATEGY";

        assert_eq!(terms(text), terms(query));
    }

    // ============================================================
    // POSTING TESTS
    // ============================================================

    #[test]
    fn test_index_segment_records_positions_and_frequency() {
        let stored = transcript(1, &["the plan is the plan"]);
        let mut staged = FileIndex::staged("f1", &stored);
        staged.index_segment(&stored.segments[0]);

        let plan = &staged.terms["plan"][0];
        assert_eq!(plan.segment_index, 0);
        assert_eq!(plan.positions, vec![1, 4]);
        assert_eq!(plan.term_frequency(), 2);
        assert_eq!(staged.segment_len(0), 5);
    }

    #[test]
    fn test_lookup_is_union_of_terms() {
        let index = TextIndex::new();
        index.index_file("f1", &transcript(1, &["product launch", "marketing budget", "weather"]));

        let candidates = index.lookup(&["product".to_string(), "marketing".to_string()]);

        let segments: Vec<u32> = candidates.keys().map(|k| k.segment_index).collect();
        assert_eq!(segments, vec![0, 1]);
    }

    #[test]
    fn test_lookup_groups_terms_per_segment() {
        let index = TextIndex::new();
        index.index_file("f1", &transcript(1, &["product development and product marketing"]));

        let candidates = index.lookup(&["product".to_string(), "marketing".to_string()]);
        let candidate = candidates.values().next().unwrap();

        assert_eq!(candidate.term_positions["product"], vec![0, 3]);
        assert_eq!(candidate.term_positions["marketing"], vec![4]);
        assert_eq!(candidate.segment().unwrap().text, "product development and product marketing");
    }

    #[test]
    fn test_lookup_unknown_term_returns_nothing() {
        let index = TextIndex::new();
        index.index_file("f1", &transcript(1, &["hello world"]));

        assert!(index.lookup(&["missing".to_string()]).is_empty());
    }

    // ============================================================
    // GENERATION TESTS
    // ============================================================

    #[test]
    fn test_newer_generation_replaces_older() {
        let index = TextIndex::new();
        index.index_file("f1", &transcript(1, &["old words"]));

        let outcome = index.index_file("f1", &transcript(2, &["new words"]));

        assert_eq!(outcome, PublishOutcome::Published { replaced: Some(1) });
        assert!(index.lookup(&["old".to_string()]).is_empty());
        assert_eq!(index.lookup(&["new".to_string()]).len(), 1);
        assert_eq!(index.current_generation("f1"), Some(2));
    }

    #[test]
    fn test_older_generation_is_discarded() {
        let index = TextIndex::new();
        index.index_file("f1", &transcript(5, &["latest"]));

        let outcome = index.index_file("f1", &transcript(3, &["stale"]));

        assert_eq!(outcome, PublishOutcome::Superseded { current: 5 });
        assert!(index.lookup(&["stale".to_string()]).is_empty());
        assert_eq!(index.lookup(&["latest".to_string()]).len(), 1);
    }

    #[test]
    fn test_remove_file_drops_postings_and_directory_entries() {
        let index = TextIndex::new();
        index.index_file("f1", &transcript(1, &["unique phrase here"]));
        index.index_file("f2", &transcript(2, &["shared here"]));

        assert!(index.remove_file("f1", 3));

        assert!(index.lookup(&["unique".to_string()]).is_empty());
        assert_eq!(index.lookup(&["here".to_string()]).len(), 1);
        let stats = index.stats();
        assert_eq!(stats.indexed_files, 1);
        assert_eq!(stats.tombstones, 1);
        assert_eq!(stats.distinct_terms, 2);
    }

    #[test]
    fn test_tombstone_blocks_stale_publish() {
        let index = TextIndex::new();
        index.index_file("f1", &transcript(1, &["alpha"]));
        index.remove_file("f1", 4);

        let outcome = index.index_file("f1", &transcript(2, &["alpha"]));

        assert_eq!(outcome, PublishOutcome::Superseded { current: 4 });
        assert!(index.snapshot("f1").is_none());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let index = TextIndex::new();

        assert!(!index.remove_file("ghost", 1));
        assert!(!index.remove_file("ghost", 2));
        assert_eq!(index.current_generation("ghost"), Some(2));
    }

    #[test]
    fn test_republish_same_generation_is_allowed() {
        let index = TextIndex::new();
        index.index_file("f1", &transcript(7, &["same data"]));

        let outcome = index.index_file("f1", &transcript(7, &["same data"]));

        assert_eq!(outcome, PublishOutcome::Published { replaced: Some(7) });
        assert_eq!(index.lookup(&["same".to_string()]).len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_reader_never_sees_mixed_generations() {
        let index = Arc::new(TextIndex::new());
        index.index_file("f1", &transcript(1, &["alpha beta", "alpha beta", "alpha beta"]));
        let done = Arc::new(AtomicBool::new(false));

        let writer = {
            let index = index.clone();
            let done = done.clone();
            tokio::spawn(async move {
                for generation in 2..400u64 {
                    let texts: &[&str] = if generation % 2 == 0 {
                        &["gamma delta", "gamma delta", "gamma delta"]
                    } else {
                        &["alpha beta", "alpha beta", "alpha beta"]
                    };
                    index.index_file("f1", &transcript(generation, texts));
                    tokio::task::yield_now().await;
                }
                done.store(true, Ordering::SeqCst);
            })
        };

        let query: Vec<String> = ["alpha", "beta", "gamma", "delta"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        while !done.load(Ordering::SeqCst) {
            let candidates = index.lookup(&query);
            let generations: std::collections::HashSet<u64> =
                candidates.values().map(|c| c.file.generation).collect();
            assert!(generations.len() <= 1, "mixed generations: {:?}", generations);

            for candidate in candidates.values() {
                let has_old = candidate.term_positions.contains_key("alpha");
                let has_new = candidate.term_positions.contains_key("gamma");
                assert!(!(has_old && has_new), "segment mixes two generations");
            }
            tokio::task::yield_now().await;
        }

        writer.await.unwrap();
    }
}
