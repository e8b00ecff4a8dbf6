//! Job status poller.
//!
//! [`JobPoller::start`] spawns one Tokio task per submission. Every
//! `interval` (the first cycle runs immediately) the task fetches the status
//! of every job concurrently, merges the batch into its [`JobBoard`] and
//! publishes a [`PollSnapshot`] on a [`watch`] channel. Polling ends when
//! every job is terminal, when any request of a cycle fails, or when the
//! [`PollHandle`] is stopped or dropped.
//!
//! Cycles never overlap: the next tick is only awaited after the previous
//! cycle has been merged, and late ticks are delayed rather than bunched.

use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use sheetport_core::job::{CycleOutcome, JobBoard, JobIdSet, JobRecord};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::backend::ImportBackend;

/// What a view renders while jobs are being tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSnapshot {
    /// Job records in submission order.
    pub jobs: Vec<JobRecord>,
    /// `false` once polling stopped for any reason.
    pub polling: bool,
    /// Failed request or failed job message, if any.
    pub error: Option<String>,
    /// Number of cycles merged so far.
    pub cycles: u64,
}

/// Shortest accepted poll interval; shorter ones are raised to this.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Starts pollers against one backend.
pub struct JobPoller<B: ?Sized> {
    backend: Arc<B>,
    interval: Duration,
}

impl<B> JobPoller<B>
where
    B: ImportBackend + ?Sized + 'static,
{
    pub fn new(backend: Arc<B>, interval: Duration) -> Self {
        Self {
            backend,
            interval: interval.max(MIN_POLL_INTERVAL),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start polling `ids` in a background task.
    pub fn start(&self, ids: JobIdSet) -> PollHandle {
        let board = JobBoard::new(&ids);
        let (tx, _rx) = watch::channel(PollSnapshot {
            jobs: board.jobs().to_vec(),
            polling: true,
            error: None,
            cycles: 0,
        });
        let state = Arc::new(tx);
        let cancel = CancellationToken::new();

        tracing::info!(
            jobs = ids.len(),
            interval_ms = self.interval.as_millis() as u64,
            "Job polling started",
        );

        let task = tokio::spawn(poll_loop(
            Arc::clone(&self.backend),
            ids,
            board,
            self.interval,
            cancel.clone(),
            Arc::clone(&state),
        ));

        PollHandle {
            cancel,
            state,
            task: Some(task),
        }
    }
}

/// Handle to a running (or finished) poller.
///
/// Dropping the handle stops polling.
pub struct PollHandle {
    cancel: CancellationToken,
    state: Arc<watch::Sender<PollSnapshot>>,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Stop polling. Idempotent.
    ///
    /// A cycle already in flight may still complete at the transport level,
    /// but its results are never merged.
    pub fn stop(&self) {
        self.cancel.cancel();
        let changed = self.state.send_if_modified(|snap| {
            if !snap.polling {
                return false;
            }
            snap.polling = false;
            true
        });
        if changed {
            tracing::info!("Job polling stopped");
        }
    }

    pub fn is_polling(&self) -> bool {
        self.state.borrow().polling
    }

    /// Current state of the tracked jobs.
    pub fn snapshot(&self) -> PollSnapshot {
        self.state.borrow().clone()
    }

    /// Receive every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<PollSnapshot> {
        self.state.subscribe()
    }

    /// Wait until the poll task has exited and return the final snapshot.
    pub async fn finished(&mut self) -> PollSnapshot {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Poll task ended abnormally");
            }
        }
        self.snapshot()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for PollHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollHandle")
            .field("snapshot", &*self.state.borrow())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

async fn poll_loop<B>(
    backend: Arc<B>,
    ids: JobIdSet,
    mut board: JobBoard,
    interval: Duration,
    cancel: CancellationToken,
    state: Arc<watch::Sender<PollSnapshot>>,
) where
    B: ImportBackend + ?Sized,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let cycle = try_join_all(ids.iter().map(|id| backend.job_status(id))).await;

        match cycle {
            Ok(results) => {
                let outcome = board.apply_cycle(&results);

                // Checked under the channel lock so a concurrent `stop()`
                // either sees this merge or suppresses it.
                let merged = state.send_if_modified(|snap| {
                    if cancel.is_cancelled() {
                        return false;
                    }
                    snap.jobs = board.jobs().to_vec();
                    snap.cycles += 1;
                    if let CycleOutcome::Finished { error } = &outcome {
                        snap.polling = false;
                        if error.is_some() {
                            snap.error = error.clone();
                        }
                    }
                    true
                });

                if !merged {
                    tracing::debug!("Poll cycle completed after stop, results discarded");
                    break;
                }

                if let CycleOutcome::Finished { error } = outcome {
                    tracing::info!(
                        jobs = ids.len(),
                        failed = error.is_some(),
                        "All import jobs finished",
                    );
                    cancel.cancel();
                    break;
                }
            }
            Err(e) => {
                let message = e.to_string();
                let applied = state.send_if_modified(|snap| {
                    if cancel.is_cancelled() {
                        return false;
                    }
                    snap.polling = false;
                    snap.error = Some(message.clone());
                    true
                });
                if applied {
                    tracing::warn!(error = %message, "Job polling stopped after a failed cycle");
                }
                cancel.cancel();
                break;
            }
        }
    }
}
