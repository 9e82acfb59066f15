//! tracestack - distributed trace identifiers and trace stack reconstruction.
//!
//! Agents embedded in monitored processes record trace segments: the spans
//! one process produced for one distributed call, plus references to the
//! spans in other processes that called it. tracestack covers both ends of
//! that pipeline:
//!
//! - `ids`: lock-free generation of identifiers unique across processes,
//!   threads and time, tolerant of the wall clock moving backward
//! - `stack`: reassembly of every segment of a global trace into one
//!   ordered, time-normalized call tree
//!
//! # Architecture
//!
//! - `core`: domain models, errors and configuration
//! - `storage`: segment lookup traits and the in-memory store
//! - `cache`: dictionary lookups resolving codes to names
//! - `api`: HTTP read endpoint
//! - `cli`: command-line interface
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tracestack_lib::cache::Dictionary;
//! use tracestack_lib::stack::TraceStackService;
//! use tracestack_lib::storage::InMemoryTraceStore;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(InMemoryTraceStore::new());
//!     let stack = TraceStackService::new(
//!         store.clone(),
//!         store,
//!         Arc::new(Dictionary::new()),
//!         Arc::new(Dictionary::new()),
//!     );
//!     let spans = stack.load("trace-1").await;
//!     assert!(spans.is_empty());
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod api;
pub mod application;
pub mod cache;
pub mod cli;
pub mod core;
pub mod ids;
pub mod stack;
pub mod storage;

// Re-export core types for convenience
pub use crate::application::Application;
pub use crate::core::{Config, Result};
