//! Periodic refresh of the monitoring view.
//!
//! [`AutoRefresh`] owns at most one repeating timer task. Starting it again replaces the
//! running timer, so a view that is activated twice never ends up polling twice.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

struct RefreshTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Repeating timer with a pause switch.
///
/// Running/stopped and paused are independent: a paused timer keeps ticking but skips the
/// refresh, so resuming does not need to re-arm anything.
#[derive(Default)]
pub struct AutoRefresh {
    task: Mutex<Option<RefreshTask>>,
    paused: Arc<AtomicBool>,
}

impl AutoRefresh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer, cancelling any existing one first.
    ///
    /// `tick` runs once per `period`, the first time one period after this call. It is
    /// skipped while paused. Returning `false` from `tick` ends the task (the owner is gone).
    pub fn start<F, Fut>(&self, period: Duration, tick: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let mut task = self.task.lock();
        if let Some(existing) = task.take() {
            existing.cancel();
        }

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let paused = self.paused.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => {
                        tracing::debug!("Auto-refresh timer cancelled");
                        return;
                    }
                    _ = interval.tick() => {}
                }

                if paused.load(Ordering::SeqCst) {
                    tracing::trace!("Auto-refresh paused, skipping tick");
                    continue;
                }

                if !tick().await {
                    tracing::debug!("Auto-refresh owner dropped, stopping timer");
                    return;
                }
            }
        });

        tracing::info!(period = ?period, "Auto-refresh started");
        *task = Some(RefreshTask { token, handle });
    }

    /// Cancel the timer. No-op when it is not running.
    pub fn stop(&self) {
        if let Some(task) = self.task.lock().take() {
            task.cancel();
            tracing::info!("Auto-refresh stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.lock().as_ref().is_some_and(|task| !task.handle.is_finished())
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    /// Flip the pause switch. Returns the new paused state.
    pub fn toggle_pause(&self) -> bool {
        !self.paused.fetch_xor(true, Ordering::SeqCst)
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }
}

impl RefreshTask {
    fn cancel(self) {
        self.token.cancel();
        self.handle.abort();
    }
}

impl Drop for AutoRefresh {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.cancel();
        }
    }
}
