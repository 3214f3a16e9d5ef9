#![forbid(unsafe_code)]

//! Core domain model and compression engine for Squeeze.
//!
//! This crate provides:
//! - Domain types (session contexts, segments, summaries, telemetry)
//! - Translation of loosely-shaped plan JSON into session contexts
//! - Superset and circuit-block selection
//! - Segment building, sequencing and session/plan aggregation
//! - A coarse trim-and-drop reducer as an alternate strategy
//! - CSV and JSON export

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod vocabulary;
pub mod translate;
pub mod pairing;
pub mod segments;
pub mod compress;
pub mod trim;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::{CompressionConfig, CompressionOverrides};
pub use translate::translate;
pub use compress::{compress_plan, compress_session};
pub use trim::{reduce_session, SessionRecord, TrimResult};
pub use export::{save_outcome_json, write_segments_csv};
