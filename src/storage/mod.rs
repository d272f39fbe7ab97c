//! Segment Storage Module
//!
//! Holds the audio file catalog and each file's ordered, time-aligned
//! transcript segments.
//!
//! ## Core Concepts
//! - **Partitioning**: Files are spread over fixed hash partitions, one `DashMap` shard each.
//! - **Generations**: Every transcript replacement or deletion takes a number from one
//!   store-wide counter; the index uses it to decide which write wins.
//! - **Validation**: Segment sets are checked as a whole before they replace anything.
//! - **Access**: `SegmentStore` is the async seam the search service talks to.

pub mod handlers;
pub mod memory;
pub mod partitioner;
pub mod protocol;
pub mod types;
pub mod validation;
