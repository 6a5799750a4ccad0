//! Background analysis coordinator
//!
//! Runs at most one analysis at a time on a spawned task, forwards its
//! progress lines to the caller and publishes successful reports to the
//! [`ResultStore`]. Shutdown signals the running task and waits for it up to
//! a timeout before aborting it.

use crate::{
    analysis::{AnalysisReport, AnalysisRequest, Analyzer, ProgressReporter},
    error::{AppError, AppResult},
    store::ResultStore,
};
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
    time::timeout,
};
use tracing::{debug, info, warn};
use uuid::Uuid;
use ytstats_common::{RequestedCount, Result, YtStatsError};
use ytstats_config::AppSettings;

/// Type alias for task identifiers
pub type TaskId = Uuid;

/// Messages sent from a running analysis to the caller
#[derive(Debug)]
pub enum AnalysisEvent {
    /// A human-readable progress line
    Progress(String),
    /// The analysis is over; always the last event of a run
    Finished(Result<Arc<AnalysisReport>>),
}

/// How `shutdown` ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Nothing was running
    Idle,
    /// The running analysis stopped within the timeout
    Stopped,
    /// The running analysis was aborted after the timeout
    TimedOut,
}

struct ActiveAnalysis {
    id: TaskId,
    events: mpsc::Receiver<AnalysisEvent>,
    handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

/// Owns the single in-flight analysis
pub struct AnalysisCoordinator {
    analyzer: Arc<Analyzer>,
    store: ResultStore,
    event_buffer: usize,
    shutdown_timeout: Duration,
    active: Option<ActiveAnalysis>,
    shutting_down: bool,
}

impl AnalysisCoordinator {
    pub fn new(analyzer: Analyzer, store: ResultStore) -> Self {
        Self::with_settings(analyzer, store, &AppSettings::default())
    }

    pub fn with_settings(analyzer: Analyzer, store: ResultStore, settings: &AppSettings) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            store,
            event_buffer: settings.event_buffer.max(1),
            shutdown_timeout: Duration::from_secs(settings.shutdown_timeout_seconds),
            active: None,
            shutting_down: false,
        }
    }

    pub fn with_shutdown_timeout(mut self, shutdown_timeout: Duration) -> Self {
        self.shutdown_timeout = shutdown_timeout;
        self
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// ID of the running analysis, if any
    pub fn active_task(&self) -> Option<TaskId> {
        self.active.as_ref().map(|active| active.id)
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Start analysing `url` in the background.
    ///
    /// # Errors
    ///
    /// Refuses while another analysis is running or once shutdown has begun.
    pub fn start(&mut self, url: impl Into<String>, requested: RequestedCount) -> AppResult<TaskId> {
        if self.shutting_down {
            return Err(AppError::ShuttingDown);
        }
        if let Some(id) = self.active_task() {
            return Err(AppError::AnalysisInProgress(id));
        }

        let task_id = TaskId::new_v4();
        let request = AnalysisRequest::new(url, requested);
        info!("Starting analysis {} for {}", task_id, request.url);

        let (events_tx, events_rx) = mpsc::channel(self.event_buffer);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let analyzer = Arc::clone(&self.analyzer);

        let handle = tokio::spawn(async move {
            let progress = ProgressReporter::new(events_tx.clone());
            tokio::select! {
                result = analyzer.run(&request, &progress) => {
                    if let Err(e) = &result {
                        warn!("Analysis {} failed: {}", task_id, e);
                    }
                    let _ = events_tx
                        .send(AnalysisEvent::Finished(result.map(Arc::new)))
                        .await;
                }
                _ = shutdown_rx => {
                    debug!("Analysis {} received shutdown signal", task_id);
                }
            }
        });

        self.active = Some(ActiveAnalysis {
            id: task_id,
            events: events_rx,
            handle,
            shutdown_tx: Some(shutdown_tx),
        });
        Ok(task_id)
    }

    /// Wait for the next event of the running analysis.
    ///
    /// A successful `Finished` is published to the store before it is
    /// returned; a failed one leaves the store as it was. Returns `None` when
    /// nothing is running or the task went away without finishing.
    pub async fn next_event(&mut self) -> Option<AnalysisEvent> {
        let active = self.active.as_mut()?;
        let event = active.events.recv().await;

        match &event {
            Some(AnalysisEvent::Finished(result)) => {
                if let Ok(report) = result {
                    self.store.publish(Arc::clone(report));
                    info!(
                        "Analysis {} finished with {} videos",
                        active.id,
                        report.series.len()
                    );
                }
                self.active = None;
            }
            Some(AnalysisEvent::Progress(_)) => {}
            None => {
                warn!("Analysis {} ended without a result", active.id);
                self.active = None;
            }
        }
        event
    }

    /// Drive the running analysis to completion, passing each progress line to `on_progress`
    pub async fn finish<F>(&mut self, mut on_progress: F) -> AppResult<Arc<AnalysisReport>>
    where
        F: FnMut(&str),
    {
        if self.active.is_none() {
            return Err(AppError::NoAnalysis);
        }

        while let Some(event) = self.next_event().await {
            match event {
                AnalysisEvent::Progress(message) => on_progress(&message),
                AnalysisEvent::Finished(result) => return Ok(result?),
            }
        }
        Err(YtStatsError::new("Analysis ended without a result").into())
    }

    /// Stop accepting work and stop the running analysis, if any
    pub async fn shutdown(&mut self) -> ShutdownOutcome {
        self.shutting_down = true;

        let Some(mut active) = self.active.take() else {
            return ShutdownOutcome::Idle;
        };
        info!("Stopping analysis {}", active.id);

        if let Some(tx) = active.shutdown_tx.take() {
            let _ = tx.send(());
        }
        // A task blocked on a full event buffer must not hold up shutdown
        drop(active.events);

        match timeout(self.shutdown_timeout, &mut active.handle).await {
            Ok(_) => {
                debug!("Analysis {} stopped", active.id);
                ShutdownOutcome::Stopped
            }
            Err(_) => {
                warn!(
                    "Analysis {} did not stop within {:?}, aborting",
                    active.id, self.shutdown_timeout
                );
                active.handle.abort();
                ShutdownOutcome::TimedOut
            }
        }
    }
}

impl Drop for AnalysisCoordinator {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.handle.abort();
        }
    }
}
