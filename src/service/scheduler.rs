//! Owned periodic background trigger.

use std::future::Future;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Runs a tick callback on a tokio task at a fixed cadence until stopped.
///
/// The first tick fires after `initial_delay`, later ticks every `period`
/// measured from that start, regardless of how long a tick took. Ticks that
/// would have fired while a previous one was still running are skipped.
///
/// Stopping never interrupts a tick that is already running.
pub struct PeriodicScheduler {
    name: String,
    shutdown: Arc<Notify>,
    stopped: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl PeriodicScheduler {
    /// Spawn the scheduler task. Must be called from within a tokio runtime.
    ///
    /// The callback returning `ControlFlow::Break` ends the loop.
    pub fn start<F, Fut>(
        name: impl Into<String>,
        initial_delay: Duration,
        period: Duration,
        mut tick: F,
    ) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        let name = name.into();
        let shutdown = Arc::new(Notify::new());
        let stopped = Arc::new(AtomicBool::new(false));

        let task_name = name.clone();
        let task_shutdown = Arc::clone(&shutdown);
        let task_stopped = Arc::clone(&stopped);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + initial_delay, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = task_shutdown.notified() => break,
                    _ = ticker.tick() => {}
                }
                if task_stopped.load(Ordering::Acquire) {
                    break;
                }
                if tick().await.is_break() {
                    tracing::debug!("[SCHED {}] tick requested exit", task_name);
                    break;
                }
            }
            tracing::debug!("[SCHED {}] loop exited", task_name);
        });

        tracing::info!(
            "[SCHED {}] started: first tick in {:?}, then every {:?}",
            name,
            initial_delay,
            period
        );

        PeriodicScheduler {
            name,
            shutdown,
            stopped,
            handle,
        }
    }

    /// Cancel future ticks. Returns `false` if already stopped.
    pub fn stop(&self) -> bool {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.shutdown.notify_one();
        tracing::info!("[SCHED {}] stopped", self.name);
        true
    }

    pub fn is_running(&self) -> bool {
        !self.stopped.load(Ordering::Acquire) && !self.handle.is_finished()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for PeriodicScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
