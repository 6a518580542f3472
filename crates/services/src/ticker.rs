//! Repeating background work, decoupled from the runtime's timer primitive.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::warn;

pub type TickFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
pub type TickTask = Box<dyn FnMut() -> TickFuture + Send>;

/// Runs a task on a fixed period until the returned handle is cancelled.
///
/// Cancelling never interrupts a run that has already started.
pub trait TickScheduler: Send + Sync {
    /// Schedule `task` every `period`. The first run happens one period from
    /// now, not immediately.
    fn every(&self, period: Duration, task: TickTask) -> TickHandle;
}

/// Owner of a scheduled task. Dropping the handle stops the task after its
/// current run.
#[derive(Debug)]
pub struct TickHandle {
    task: Option<JoinHandle<()>>,
    cancel_token: CancellationToken,
}

impl TickHandle {
    /// Wrap a spawned loop that exits once `cancel_token` is cancelled.
    #[must_use]
    pub fn new(task: JoinHandle<()>, cancel_token: CancellationToken) -> Self {
        Self {
            task: Some(task),
            cancel_token,
        }
    }

    /// Ask the task to stop. A run in progress still completes. Calling this
    /// more than once is a no-op.
    pub fn cancel(&mut self) {
        self.cancel_token.cancel();
    }

    /// Cancel and wait for the task to exit.
    pub async fn stop(&mut self) {
        self.cancel();
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                warn!(error = %err, "tick task ended abnormally");
            }
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.cancel_token.is_cancelled()
            && self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// `TickScheduler` backed by `tokio::time::interval` on the current runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl TickScheduler for TokioScheduler {
    fn every(&self, period: Duration, mut task: TickTask) -> TickHandle {
        let cancel_token = CancellationToken::new();
        let token = cancel_token.clone();
        let join = tokio::spawn(async move {
            let mut interval = time::interval(period);
            // A stalled runtime should not replay a burst of missed seconds.
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of an interval completes immediately.
            interval.tick().await;
            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    _ = interval.tick() => task().await,
                }
            }
        });
        TickHandle::new(join, cancel_token)
    }
}
