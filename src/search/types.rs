use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Query string parameters of `GET /search`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchParams {
    #[serde(default, alias = "q")]
    pub query: String,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    /// Comma-separated file ids.
    pub file_ids: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

/// Body of `POST /search`, and the normalized form of `SearchParams`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: Option<usize>,
    #[serde(default)]
    pub file_ids: Option<Vec<String>>,
    #[serde(default)]
    pub date_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub date_to: Option<DateTime<Utc>>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn page(mut self, limit: usize, offset: usize) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }
}

impl From<SearchParams> for SearchRequest {
    fn from(params: SearchParams) -> Self {
        let file_ids = params.file_ids.map(|raw| {
            raw.split(',')
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .collect()
        });

        Self {
            query: params.query,
            limit: params.limit,
            offset: params.offset,
            file_ids,
            date_from: params.date_from,
            date_to: params.date_to,
        }
    }
}

/// One ranked, time-aligned hit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResultItem {
    pub file_id: String,
    pub filename: String,
    pub segment_index: u32,
    pub transcript_segment: String,
    pub start_time: f64,
    pub end_time: f64,
    pub confidence_score: f64,
    pub upload_time: DateTime<Utc>,
    pub relevance_score: f64,
    pub matched_terms: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResponse {
    pub success: bool,
    pub query: String,
    /// Matches after ranking filters, before pagination.
    pub total_count: usize,
    /// Results in this page.
    pub count: usize,
    pub limit: usize,
    pub offset: usize,
    pub took_ms: f64,
    pub results: Vec<SearchResultItem>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptResponse {
    pub file_id: String,
    pub transcript: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlaybackInfoResponse {
    pub file_id: String,
    pub filename: String,
    pub duration: f64,
    pub status: String,
    pub upload_time: DateTime<Utc>,
    pub segment_count: usize,
}
