//! Core domain models, errors and configuration.
//!
//! This module contains the segment and span types shared by the
//! identifier generator, the storage collaborators and the trace stack
//! reconstruction.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{Config, ConfigBuilder, LogLevel};
pub use error::{Result, TraceStackError};
pub use types::{
    segment_span_key, SpanObject, TraceSegmentObject, TraceSegmentReference, TraceStackSpan,
    UniqueId,
};
