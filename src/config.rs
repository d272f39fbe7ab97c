//! Service Configuration
//!
//! Runtime settings read from `TRANSCRIPT_SEARCH_*` environment variables.
//! Every setting has a default so the service starts with an empty environment;
//! unparsable values are logged and replaced by the default.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

const ENV_PREFIX: &str = "TRANSCRIPT_SEARCH_";

pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 100;

/// Weights used by the ranker. Coverage is not weighted: it always dominates.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingWeights {
    /// Share of the in-tier quality score given to term frequency.
    pub term_frequency: f64,
    /// Share of the in-tier quality score given to phrase/proximity.
    pub proximity: f64,
    /// Largest position distance still counted as "near" for proximity.
    pub proximity_window: u32,
    /// Saturation constant for term frequency (higher = slower saturation).
    pub tf_saturation: f64,
    /// Segment length (in tokens) at which no length penalty applies.
    pub reference_segment_len: f64,
    /// Fraction of the quality score kept for a segment with confidence 0.
    pub confidence_floor: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            term_frequency: 0.4,
            proximity: 0.6,
            proximity_window: 6,
            tf_saturation: 1.2,
            reference_segment_len: 16.0,
            confidence_floor: 0.3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub attempts: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Deadline for a single backing call.
    pub call_timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_millis(50),
            max_delay: Duration::from_millis(800),
            call_timeout: Duration::from_millis(2000),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    pub log_level: tracing::Level,
    pub default_limit: usize,
    pub max_limit: usize,
    /// Ranked results scoring below this are dropped before counting.
    pub min_score: f64,
    pub partitions: u32,
    pub retry: RetryConfig,
    pub ranking: RankingWeights,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            log_level: tracing::Level::INFO,
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
            min_score: 0.0,
            partitions: 64,
            retry: RetryConfig::default(),
            ranking: RankingWeights::default(),
        }
    }
}

/// Log level alone, so logging can start before the rest of the config is parsed.
pub fn log_level_from_env() -> tracing::Level {
    std::env::var(format!("{}LOG_LEVEL", ENV_PREFIX))
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(tracing::Level::INFO)
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Keys are full variable names.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        let mut config = Self {
            bind_addr: parse_or(get("BIND"), "BIND", defaults.bind_addr),
            log_level: parse_or(get("LOG_LEVEL"), "LOG_LEVEL", defaults.log_level),
            default_limit: parse_or(get("DEFAULT_LIMIT"), "DEFAULT_LIMIT", defaults.default_limit),
            max_limit: parse_or(get("MAX_LIMIT"), "MAX_LIMIT", defaults.max_limit),
            min_score: parse_or(get("MIN_SCORE"), "MIN_SCORE", defaults.min_score),
            partitions: parse_or(get("PARTITIONS"), "PARTITIONS", defaults.partitions),
            retry: RetryConfig {
                attempts: parse_or(get("RETRY_ATTEMPTS"), "RETRY_ATTEMPTS", defaults.retry.attempts),
                base_delay: Duration::from_millis(parse_or(
                    get("RETRY_BASE_MS"),
                    "RETRY_BASE_MS",
                    defaults.retry.base_delay.as_millis() as u64,
                )),
                max_delay: Duration::from_millis(parse_or(
                    get("RETRY_MAX_MS"),
                    "RETRY_MAX_MS",
                    defaults.retry.max_delay.as_millis() as u64,
                )),
                call_timeout: Duration::from_millis(parse_or(
                    get("CALL_TIMEOUT_MS"),
                    "CALL_TIMEOUT_MS",
                    defaults.retry.call_timeout.as_millis() as u64,
                )),
            },
            ranking: RankingWeights {
                term_frequency: parse_or(get("WEIGHT_TF"), "WEIGHT_TF", defaults.ranking.term_frequency),
                proximity: parse_or(get("WEIGHT_PROXIMITY"), "WEIGHT_PROXIMITY", defaults.ranking.proximity),
                proximity_window: parse_or(
                    get("PROXIMITY_WINDOW"),
                    "PROXIMITY_WINDOW",
                    defaults.ranking.proximity_window,
                ),
                ..defaults.ranking.clone()
            },
        };
        config.sanitize();
        config
    }

    fn sanitize(&mut self) {
        if self.max_limit == 0 {
            tracing::warn!("max_limit must be positive, using {}", MAX_LIMIT);
            self.max_limit = MAX_LIMIT;
        }
        if self.default_limit == 0 || self.default_limit > self.max_limit {
            let fixed = DEFAULT_LIMIT.min(self.max_limit);
            tracing::warn!(
                "default_limit {} outside 1..={}, using {}",
                self.default_limit,
                self.max_limit,
                fixed
            );
            self.default_limit = fixed;
        }
        if self.retry.attempts == 0 {
            self.retry.attempts = 1;
        }
        if self.partitions == 0 {
            self.partitions = 1;
        }
        if !self.min_score.is_finite() || self.min_score < 0.0 {
            self.min_score = 0.0;
        }
        if self.ranking.term_frequency < 0.0 || self.ranking.proximity < 0.0 {
            tracing::warn!("negative ranking weights, using defaults");
            self.ranking = RankingWeights::default();
        }
    }
}

fn parse_or<T>(raw: Option<String>, name: &str, default: T) -> T
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    match raw {
        Some(value) => match value.trim().parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Ignoring {}{}={:?}: {}", ENV_PREFIX, name, value, e);
                default
            }
        },
        None => default,
    }
}
