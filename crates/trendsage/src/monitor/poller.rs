//! Job status polling.
//!
//! [`StatusPoller`] is the `idle → polling → stopped` state machine;
//! [`poll_until_terminal`] drives it against the backend on a fixed interval.

use std::time::Duration;

use log::{debug, info, warn};
use serde::Serialize;
use tokio::sync::Notify;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::Instrument;

use crate::api::{Job, JobStatus, MatchmakingApi};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PollerState {
    Idle,
    Polling,
    Stopped,
}

/// What to do after observing a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollDecision {
    Continue,
    Completed,
    Failed { can_retry: bool },
}

impl PollDecision {
    pub fn for_job(job: &Job) -> Self {
        match job.status {
            JobStatus::Pending | JobStatus::Processing => PollDecision::Continue,
            JobStatus::Completed => PollDecision::Completed,
            JobStatus::Failed => PollDecision::Failed {
                can_retry: job.can_retry(),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatusPoller {
    state: PollerState,
    observed: u64,
}

impl Default for StatusPoller {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusPoller {
    pub fn new() -> Self {
        Self {
            state: PollerState::Idle,
            observed: 0,
        }
    }

    pub fn state(&self) -> PollerState {
        self.state
    }

    pub fn is_polling(&self) -> bool {
        self.state == PollerState::Polling
    }

    /// Number of job observations since the last (re)start.
    pub fn observed(&self) -> u64 {
        self.observed
    }

    /// Makes `job` current. Enters `Polling` only for non-terminal jobs.
    pub fn start(&mut self, job: &Job) -> PollDecision {
        self.observed = 0;
        let decision = PollDecision::for_job(job);
        self.state = match decision {
            PollDecision::Continue => PollerState::Polling,
            _ => PollerState::Stopped,
        };
        decision
    }

    /// Records a poll response. Terminal jobs stop the poller.
    pub fn observe(&mut self, job: &Job) -> PollDecision {
        self.observed += 1;
        let decision = PollDecision::for_job(job);
        if decision != PollDecision::Continue {
            self.state = PollerState::Stopped;
        }
        decision
    }

    pub fn stop(&mut self) {
        if self.state != PollerState::Idle {
            self.state = PollerState::Stopped;
        }
    }

    pub fn reset(&mut self) {
        self.state = PollerState::Idle;
        self.observed = 0;
    }
}

/// How a poll loop ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PollExit {
    /// The job reached `completed` or `failed`.
    Terminal(Job),
    /// The stop signal fired first.
    Stopped,
}

/// Polls `project_key` every `period` until the job is terminal or `stop`
/// is notified. The first request goes out one period after the call.
///
/// Request failures and 404s are logged and the loop carries on; there is
/// no retry limit and no backoff.
pub async fn poll_until_terminal<A, F>(
    api: &A,
    project_key: &str,
    period: Duration,
    stop: &Notify,
    mut on_job: F,
) -> PollExit
where
    A: MatchmakingApi + ?Sized,
    F: FnMut(&Job) -> bool,
{
    let span = tracing::info_span!("monitor.poll", project = project_key);

    async {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            "Polling job status for '{}' every {:?}",
            project_key, period
        );

        loop {
            tokio::select! {
                _ = stop.notified() => {
                    debug!("Polling for '{}' stopped", project_key);
                    return PollExit::Stopped;
                }
                _ = ticker.tick() => {}
            }

            match api.job_for_project(project_key).await {
                Ok(Some(job)) => {
                    debug!("Job {} for '{}' is {}", job.id, project_key, job.status);
                    if !on_job(&job) {
                        debug!("Poll result for '{}' was rejected, stopping", project_key);
                        return PollExit::Stopped;
                    }
                    if job.is_terminal() {
                        info!("Job {} for '{}' finished: {}", job.id, project_key, job.status);
                        return PollExit::Terminal(job);
                    }
                }
                Ok(None) => {
                    warn!("Job for '{}' disappeared while polling", project_key);
                }
                Err(e) => {
                    warn!("Polling '{}' failed: {}", project_key, e);
                }
            }
        }
    }
    .instrument(span)
    .await
}
