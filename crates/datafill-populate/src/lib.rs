//! Fill engine for datafill.
//!
//! This crate provides the [`Filler`], which walks a
//! [`CustomizedSchema`](datafill_core::CustomizedSchema) in dependency order
//! and fills each table through a
//! [`DatabaseConnector`](datafill_core::DatabaseConnector), plus the CLI
//! arguments shared by every database engine.

pub mod args;
pub mod error;
pub mod filler;
pub mod progress;

pub use args::CommonFillArgs;
pub use error::FillError;
pub use filler::{FillMetrics, Filler, TableMetrics};
pub use progress::{FillStep, ProgressEvent, ProgressSink, ProgressState, SkipHandle, TracingProgress};
