//! # ytstats
//!
//! Command line front end for YouTube channel view-count analysis.
//!
//! The analysis runs on a background task owned by the
//! [`AnalysisCoordinator`]; finished reports land in the [`ResultStore`] and
//! can be printed, charted and exported.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod analysis;
pub mod cli;
pub mod coordinator;
pub mod display;
pub mod error;
pub mod store;

pub use analysis::{AnalysisReport, AnalysisRequest, Analyzer, ProgressReporter};
pub use cli::{AnalyzeArgs, Cli, Command};
pub use coordinator::{AnalysisCoordinator, AnalysisEvent, ShutdownOutcome, TaskId};
pub use display::format_report;
pub use error::{AppError, AppResult};
pub use store::ResultStore;
