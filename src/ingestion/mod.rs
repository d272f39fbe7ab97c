//! Ingestion Service Module
//!
//! Accepts transcripts from a speech-to-text provider and hands them to the
//! search service in the canonical segment form.
//!
//! ## Workflow
//! 1. **Receive**: A provider transcript arrives segment-level, word-level or as plain text.
//! 2. **Normalize**: Words are grouped into segments, text is trimmed, segments are
//!    ordered and re-indexed, and confidences are filled in.
//! 3. **Store**: The segment set replaces the file's transcript and is indexed before the
//!    request returns.

pub mod handlers;
pub mod normalize;
pub mod types;

#[cfg(test)]
mod tests;
