//! Single deferred refresh trigger.

use levelup_core::{Diagnostic, Time};
use tokio::task::JoinHandle;
use tracing::debug;

/// Observable scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No timer outstanding
    Idle,
    /// A timer will fire at the given instant
    Armed(Time),
}

struct ArmedTimer {
    at: Time,
    handle: JoinHandle<()>,
}

/// Arms at most one timer for the next moment the study sets could change.
///
/// Re-arming always cancels the outstanding timer first. Once the timer
/// fires and its callback returns, the scheduler reads as idle again.
pub struct RecomputeScheduler {
    armed: Option<ArmedTimer>,
}

impl RecomputeScheduler {
    /// Create an idle scheduler.
    pub fn new() -> Self {
        Self { armed: None }
    }

    /// Current state.
    pub fn state(&self) -> SchedulerState {
        match &self.armed {
            Some(timer) if !timer.handle.is_finished() => SchedulerState::Armed(timer.at),
            _ => SchedulerState::Idle,
        }
    }

    /// Whether a timer is outstanding.
    pub fn is_armed(&self) -> bool {
        matches!(self.state(), SchedulerState::Armed(_))
    }

    /// Arm the timer to run `on_fire` at `next`, measured from `now`.
    ///
    /// Any outstanding timer is canceled first; if it had not fired yet a
    /// `StaleTimer` diagnostic is returned. A `next` that is not strictly
    /// after `now` leaves the scheduler idle. Must be called from within a
    /// tokio runtime.
    pub fn arm<F>(&mut self, next: Time, now: Time, on_fire: F) -> Option<Diagnostic>
    where
        F: FnOnce() + Send + 'static,
    {
        let stale = match self.state() {
            SchedulerState::Armed(replaced) => Some(Diagnostic::StaleTimer { replaced }),
            SchedulerState::Idle => None,
        };
        self.cancel();

        let delay = match (next - now).to_std() {
            Ok(delay) if !delay.is_zero() => delay,
            _ => {
                debug!("Not arming refresh timer, {} is not after {}", next, now);
                return stale;
            }
        };

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_fire();
        });
        debug!("Refresh timer armed for {} (in {:?})", next, delay);
        self.armed = Some(ArmedTimer { at: next, handle });

        stale
    }

    /// Cancel the outstanding timer, if any.
    pub fn cancel(&mut self) {
        if let Some(timer) = self.armed.take() {
            if !timer.handle.is_finished() {
                debug!("Refresh timer for {} canceled", timer.at);
            }
            timer.handle.abort();
        }
    }
}

impl Default for RecomputeScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RecomputeScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
