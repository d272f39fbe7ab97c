//! Administration Module
//!
//! Operational endpoints: catalog listing, file deletion, index rebuild and cleanup,
//! statistics and health.
//!
//! ## Submodules
//! - **`handlers`**: HTTP request handlers.
//! - **`types`**: Report and response DTOs.

pub mod handlers;
pub mod types;
