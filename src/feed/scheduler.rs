//! # Module: Tick Scheduler
//!
//! ## Responsibility
//! A cancelable periodic timer on the Tokio runtime. While running it invokes
//! one callback per interval; the callback performs a single simulation step.
//!
//! ## Guarantees
//! - At most one timer per scheduler: `start` while running replaces the
//!   previous timer, which is fully stopped before the new one is armed
//! - `stop` is idempotent
//! - Once `stop` returns, no callback runs again: every firing checks a
//!   liveness flag under a lock that `stop` also takes
//! - Zero intervals and missing runtimes are reported as errors, never panics
//!
//! ## NOT Responsible For
//! - What a tick does (that belongs to the callback owner, see `LiveFeed`)

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use super::FeedError;

/// Observable scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No timer armed.
    Stopped,
    /// A timer is armed and firing.
    Running,
}

/// An armed timer: its task plus the liveness flag the task checks.
#[derive(Debug)]
struct ArmedTimer {
    alive: Arc<Mutex<bool>>,
    task: JoinHandle<()>,
    interval: Duration,
}

/// Cancelable periodic timer.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use driftguard_live::feed::scheduler::TickScheduler;
///
/// # async fn example() -> Result<(), driftguard_live::FeedError> {
/// let mut scheduler = TickScheduler::new();
/// scheduler.start(Duration::from_secs(2), || println!("tick"))?;
/// scheduler.stop();
/// # Ok(()) }
/// ```
#[derive(Debug, Default)]
pub struct TickScheduler {
    armed: Option<ArmedTimer>,
}

impl TickScheduler {
    /// Creates a stopped scheduler.
    pub fn new() -> Self {
        Self { armed: None }
    }

    /// Starts firing `on_tick` every `interval`, first firing one interval
    /// from now.
    ///
    /// If the scheduler is already running, the previous timer is stopped
    /// first and replaced by this one.
    ///
    /// # Errors
    /// - [`FeedError::ZeroInterval`] if `interval` is zero.
    /// - [`FeedError::NoRuntime`] if called outside a Tokio runtime.
    ///
    /// # Panics
    /// This function never panics.
    pub fn start<F>(&mut self, interval: Duration, mut on_tick: F) -> Result<(), FeedError>
    where
        F: FnMut() + Send + 'static,
    {
        if interval.is_zero() {
            return Err(FeedError::ZeroInterval);
        }
        let handle = tokio::runtime::Handle::try_current().map_err(|_| FeedError::NoRuntime)?;

        self.stop();

        let alive = Arc::new(Mutex::new(true));
        let task_alive = Arc::clone(&alive);
        let task = handle.spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let still_alive = {
                    let alive = task_alive.lock();
                    if *alive {
                        on_tick();
                    }
                    *alive
                };
                if !still_alive {
                    break;
                }
            }
        });

        debug!(interval_ms = interval.as_millis() as u64, "tick scheduler started");
        self.armed = Some(ArmedTimer {
            alive,
            task,
            interval,
        });
        Ok(())
    }

    /// Cancels future firings. Calling it on a stopped scheduler is a no-op.
    ///
    /// Blocks only for the duration of a callback that is already running.
    pub fn stop(&mut self) {
        if let Some(armed) = self.armed.take() {
            *armed.alive.lock() = false;
            armed.task.abort();
            debug!("tick scheduler stopped");
        }
    }

    /// Current state.
    pub fn state(&self) -> SchedulerState {
        if self.armed.is_some() {
            SchedulerState::Running
        } else {
            SchedulerState::Stopped
        }
    }

    /// Whether a timer is armed.
    pub fn is_running(&self) -> bool {
        self.armed.is_some()
    }

    /// Interval of the armed timer, if running.
    pub fn interval(&self) -> Option<Duration> {
        self.armed.as_ref().map(|a| a.interval)
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
