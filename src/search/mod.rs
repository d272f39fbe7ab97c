//! Search Service Module
//!
//! Turns a free-text query into a ranked, paginated list of time-aligned
//! transcript segments.
//!
//! ## Overview
//! The module owns the read path of the system and the orchestration of the
//! write path. `SearchService` is the only component allowed to touch both the
//! segment store and the text index, which keeps them in step.
//!
//! ## Responsibilities
//! - **Planning**: Normalizing the query into distinct terms and a phrase sequence.
//! - **Ranking**: Scoring candidates by term coverage, frequency, proximity and confidence.
//! - **Retrieval**: Joining ranked segments with file metadata, filtering and paginating.
//! - **API**: Exposing search and playback endpoints via Axum handlers.
//!
//! ## Submodules
//! - **`planner`**: Query normalization.
//! - **`ranker`**: Relevance scoring and deterministic ordering.
//! - **`service`**: The `SearchService` orchestrator.
//! - **`handlers`**: HTTP request handlers.
//! - **`types`**: Data Transfer Objects (DTOs) for API communication.

pub mod handlers;
pub mod planner;
pub mod ranker;
pub mod service;
pub mod types;
