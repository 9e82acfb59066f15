//! Segment storage collaborators.
//!
//! The trace stack reads through two lookups: global trace id to segment
//! ids, and segment id to segment body. Any backing store implementing
//! [`GlobalTraceDao`] and [`SegmentDao`] can serve it; the in-memory store
//! here backs the CLI and tests.

pub mod backend;
pub mod fixture;
pub mod memory;

// Re-export commonly used types
pub use backend::{GlobalTraceDao, SegmentDao};
pub use fixture::{Fixture, FixtureSegment};
pub use memory::InMemoryTraceStore;
