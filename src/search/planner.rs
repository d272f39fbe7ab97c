use crate::error::{SearchError, ServiceResult};
use crate::index::tokenizer::terms;

/// A parsed query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    /// The query as received, trimmed.
    pub query: String,
    /// Distinct terms in order of first appearance. Used for retrieval and coverage.
    pub terms: Vec<String>,
    /// Every term in order, duplicates kept. Used for phrase matching.
    pub sequence: Vec<String>,
}

impl QueryPlan {
    pub fn is_phrase(&self) -> bool {
        self.sequence.len() > 1
    }
}

/// Normalizes a query with the same tokenizer used for indexing.
///
/// Fails for empty input and for input with nothing searchable in it.
pub fn plan(query: &str) -> ServiceResult<QueryPlan> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(SearchError::InvalidQuery("query is empty".to_string()));
    }

    let sequence = terms(trimmed);
    if sequence.is_empty() {
        return Err(SearchError::InvalidQuery(format!(
            "query {:?} contains no searchable terms",
            trimmed
        )));
    }

    let mut distinct: Vec<String> = Vec::with_capacity(sequence.len());
    for term in &sequence {
        if !distinct.contains(term) {
            distinct.push(term.clone());
        }
    }

    Ok(QueryPlan {
        query: trimmed.to_string(),
        terms: distinct,
        sequence,
    })
}
