//! Application-wide error types using thiserror.

use crate::coordinator::TaskId;
use ytstats_common::YtStatsError;

/// Errors raised by the application layer around an analysis.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// The analysis itself failed.
    #[error(transparent)]
    Analysis(#[from] YtStatsError),

    /// `start` was called while another analysis is still running.
    #[error("An analysis is already running (task {0})")]
    AnalysisInProgress(TaskId),

    /// There is no analysis to wait for.
    #[error("No analysis is running")]
    NoAnalysis,

    /// The coordinator no longer accepts work.
    #[error("The analysis coordinator is shutting down")]
    ShuttingDown,
}

/// Result type for the application layer.
pub type AppResult<T> = Result<T, AppError>;
