//! Debounced job scheduling.
//!
//! [`DelayJobRunner`] coalesces bursts of requests for the same kind of work
//! into a single delayed execution: every request restarts the quiescence
//! window and drops the previously pending job unexecuted. The runner keeps
//! no timer of its own — time is injected, and the host loop decides when to
//! call [`run_due`](DelayJobRunner::run_due), using
//! [`deadline`](DelayJobRunner::deadline) to size its poll timeout.

use std::fmt;
use std::time::{Duration, Instant};

use anyhow::Result;

type JobFn = Box<dyn FnOnce() -> Result<()>>;

/// A deferred unit of work. Arguments are pre-bound by closure capture; the
/// label only exists for diagnostics.
pub struct Job {
    label: String,
    run: JobFn,
}

impl Job {
    pub fn new(label: impl Into<String>, run: impl FnOnce() -> Result<()> + 'static) -> Self {
        Self {
            label: label.into(),
            run: Box::new(run),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    fn run(self) -> Result<()> {
        (self.run)()
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job").field("label", &self.label).finish()
    }
}

struct PendingJob {
    job: Job,
    deadline: Instant,
}

/// Runs at most one job per quiescence window.
///
/// The delay is fixed at construction. The pending slot holds either nothing
/// or exactly one job; a firing always corresponds to the most recent
/// request, never a superseded one.
pub struct DelayJobRunner {
    delay: Duration,
    pending: Option<PendingJob>,
}

impl DelayJobRunner {
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Request a job execution after the quiescence window.
    ///
    /// Any previously pending job is discarded without running — not even
    /// partially — and the window restarts from `now`.
    pub fn request(&mut self, job: Job, now: Instant) {
        if let Some(previous) = self.pending.take() {
            tracing::debug!(
                superseded = previous.job.label(),
                job = job.label(),
                "pending job replaced"
            );
        }
        self.pending = Some(PendingJob {
            job,
            deadline: now + self.delay,
        });
    }

    /// Drop the pending job, if any. Safe to call when idle; a later
    /// [`run_due`](DelayJobRunner::run_due) finds nothing to execute.
    pub fn cancel(&mut self) {
        if let Some(cancelled) = self.pending.take() {
            tracing::debug!(job = cancelled.job.label(), "pending job cancelled");
        }
    }

    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending job becomes due, if one is pending.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.deadline)
    }

    /// Execute the pending job if its window has elapsed.
    ///
    /// The slot is cleared before the job body runs, so a job requesting
    /// further work through the same runner starts a fresh window. Returns
    /// whether a job ran.
    ///
    /// # Errors
    ///
    /// A failing job surfaces its error to the caller; the runner does not
    /// retry and does not re-arm.
    pub fn run_due(&mut self, now: Instant) -> Result<bool> {
        if self.pending.as_ref().is_none_or(|pending| now < pending.deadline) {
            return Ok(false);
        }
        let Some(pending) = self.pending.take() else {
            return Ok(false);
        };
        tracing::debug!(job = pending.job.label(), "running debounced job");
        pending.job.run()?;
        Ok(true)
    }
}

impl fmt::Debug for DelayJobRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelayJobRunner")
            .field("delay", &self.delay)
            .field("pending", &self.pending.as_ref().map(|p| p.job.label()))
            .finish()
    }
}
