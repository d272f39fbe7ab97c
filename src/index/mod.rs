//! Text Index Module
//!
//! Positional inverted index over transcript segment text.
//!
//! ## Overview
//! Each file's postings form one immutable generation (`FileIndex`). A new
//! transcript is tokenized into a staged generation and swapped in atomically;
//! concurrent searches see either the old or the new generation of a file,
//! never a mix.
//!
//! ## Submodules
//! - **`tokenizer`**: The one normalization function shared by indexing and querying.
//! - **`types`**: Postings, per-file snapshots and lookup candidates.
//! - **`inverted`**: `TextIndex`, the generation-swapped index itself.

pub mod inverted;
pub mod tokenizer;
pub mod types;

#[cfg(test)]
mod tests;
