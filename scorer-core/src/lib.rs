//! # Scorer Core Library
//!
//! Scoring-workflow engine for paired-point localization scoring:
//! - Image catalog backed by the alignment manifest
//! - Pixel/millimeter distance calculation with fixed calibration
//! - Durable, append-only, per-scorer measurement logs
//! - Deterministic assignment of unscored images
//! - Cross-scorer aggregation and export
//!
//! Transport (HTTP, rendering) lives in `scorer-web`; everything here takes
//! an explicit scorer identity and returns plain results.

pub mod assignment;
pub mod calibration;
pub mod catalog;
pub mod config;
pub mod distance;
pub mod error;
pub mod progress;
pub mod report;
pub mod service;
pub mod store;

pub use calibration::Calibration;
pub use error::{Error, Result};
pub use service::ScoringService;
