//! Matchmaking session: one project key, one job monitor.
//!
//! The session ties the job initiator, the status poller, the result fetcher
//! and the presenter together. Consumers call the async operations and either
//! read [`MatchmakingSession::snapshot`] or subscribe to [`SessionEvent`]s.

use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use log::{debug, info, warn};
use serde::Serialize;
use tokio::sync::{broadcast, Notify};
use tokio::task::JoinHandle;

use super::fetcher::{FetchOutcome, ResultFetcher};
use super::poller::{poll_until_terminal, PollDecision, PollExit, PollerState, StatusPoller};
use super::presenter::{FilterState, ResultPresenter, ResultsView};
use crate::api::{Job, JobStatus, MatchmakingApi, Tier};
use crate::broadcast::{SessionEvent, SessionEventBroadcaster, SessionEventKind};
use crate::config::ClientConfig;
use crate::error::{ApiError, SessionError};

/// Timing and paging knobs for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub poll_interval: Duration,
    pub page_size: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            page_size: 20,
        }
    }
}

impl SessionSettings {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            page_size: config.page_size,
        }
    }
}

/// Which area the consumer should display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Loading,
    /// Neither results nor a job exist yet.
    StartPrompt,
    /// A pending or processing job is being polled.
    Running,
    JobFailed,
    Results,
    /// The initial lookup failed; `error` says why.
    Error,
}

/// Point-in-time view of a session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub project_key: String,
    pub phase: SessionPhase,
    pub poller: PollerState,
    /// Hidden once results are shown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<Job>,
    pub can_retry: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<ResultsView>,
}

impl SessionView {
    pub fn empty(project_key: &str, phase: SessionPhase) -> Self {
        Self {
            project_key: project_key.to_string(),
            phase,
            poller: PollerState::Idle,
            job: None,
            can_retry: false,
            error: None,
            results: None,
        }
    }

    /// True once nothing further will happen without user input.
    pub fn is_settled(&self) -> bool {
        match self.phase {
            SessionPhase::Loading | SessionPhase::Running => false,
            SessionPhase::Results => !self.results.as_ref().is_some_and(|r| r.loading),
            _ => true,
        }
    }
}

struct SessionState {
    phase: SessionPhase,
    job: Option<Job>,
    poller: StatusPoller,
    presenter: ResultPresenter,
    error: Option<String>,
    /// Bumped whenever polling (re)starts or stops; stale poll tasks compare against it.
    poll_generation: u64,
}

impl SessionState {
    fn view(&self, project_key: &str) -> SessionView {
        let showing_results = self.phase == SessionPhase::Results;
        SessionView {
            project_key: project_key.to_string(),
            phase: self.phase,
            poller: self.poller.state(),
            job: if showing_results { None } else { self.job.clone() },
            can_retry: !showing_results && self.job.as_ref().is_some_and(Job::can_retry),
            error: self.error.clone(),
            results: showing_results.then(|| self.presenter.view()),
        }
    }
}

struct PollHandle {
    stop: Arc<Notify>,
    task: JoinHandle<()>,
}

impl PollHandle {
    fn cancel(self) {
        self.stop.notify_one();
        self.task.abort();
    }
}

struct SessionInner {
    api: Arc<dyn MatchmakingApi>,
    project_key: String,
    settings: SessionSettings,
    state: RwLock<SessionState>,
    fetcher: ResultFetcher,
    events: SessionEventBroadcaster,
    poll: Mutex<Option<PollHandle>>,
}

impl SessionInner {
    fn read_state(&self) -> RwLockReadGuard<'_, SessionState> {
        match self.state.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Session state lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, SessionState> {
        match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Session state lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn snapshot(&self) -> SessionView {
        self.read_state().view(&self.project_key)
    }

    /// Must not be called while a state guard is held.
    fn emit(&self, kind: SessionEventKind, message: impl Into<String>) {
        self.events
            .send(SessionEvent::new(kind, message, self.snapshot()));
    }

    fn take_poll_handle(&self) -> Option<PollHandle> {
        match self.poll.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }

    fn stop_polling(&self) {
        let was_polling = {
            let mut state = self.write_state();
            state.poll_generation += 1;
            let was_polling = state.poller.is_polling();
            state.poller.stop();
            was_polling
        };

        if let Some(handle) = self.take_poll_handle() {
            handle.cancel();
        }

        if was_polling {
            self.emit(SessionEventKind::PollingStopped, "Polling stopped");
        }
    }

    fn start_polling(self: &Arc<Self>) {
        let generation = {
            let mut state = self.write_state();
            state.poll_generation += 1;
            state.poll_generation
        };

        let stop = Arc::new(Notify::new());
        let stop_signal = Arc::clone(&stop);
        let inner = Arc::clone(self);

        let task = tokio::spawn(async move {
            let exit = poll_until_terminal(
                inner.api.as_ref(),
                &inner.project_key,
                inner.settings.poll_interval,
                &stop_signal,
                |job| inner.apply_polled_job(generation, job),
            )
            .await;

            if let PollExit::Terminal(job) = exit {
                inner.on_terminal(generation, job).await;
            }
        });

        let previous = match self.poll.lock() {
            Ok(mut guard) => guard.replace(PollHandle { stop, task }),
            Err(poisoned) => poisoned.into_inner().replace(PollHandle { stop, task }),
        };
        if let Some(previous) = previous {
            previous.cancel();
        }

        self.emit(
            SessionEventKind::PollingStarted,
            format!("Checking status every {:?}", self.settings.poll_interval),
        );
    }

    /// Applies a poll response. Returns false when the poll loop is stale.
    fn apply_polled_job(&self, generation: u64, job: &Job) -> bool {
        {
            let mut state = self.write_state();
            if state.poll_generation != generation {
                return false;
            }
            let decision = state.poller.observe(job);
            state.job = Some(job.clone());
            state.phase = phase_for(decision);
            if let PollDecision::Failed { .. } = decision {
                state.error = Some(failure_message(job));
            }
        }

        self.emit(SessionEventKind::JobUpdated, format!("Job is {}", job.status));
        true
    }

    async fn on_terminal(&self, generation: u64, job: Job) {
        if self.read_state().poll_generation != generation {
            return;
        }
        self.emit(SessionEventKind::PollingStopped, "Job finished");

        match job.status {
            JobStatus::Completed => {
                if let Err(e) = self.load_results().await {
                    warn!("Loading results for '{}' failed: {}", self.project_key, e);
                }
            }
            JobStatus::Failed => {
                self.emit(SessionEventKind::JobFailed, failure_message(&job));
            }
            _ => {}
        }
    }

    /// Makes `job` current and acts on its status.
    async fn adopt_job(self: &Arc<Self>, job: Job) {
        let decision = {
            let mut state = self.write_state();
            let decision = state.poller.start(&job);
            state.phase = phase_for(decision);
            state.error = match decision {
                PollDecision::Failed { .. } => Some(failure_message(&job)),
                _ => None,
            };
            state.job = Some(job.clone());
            decision
        };

        self.emit(SessionEventKind::JobUpdated, format!("Job is {}", job.status));

        match decision {
            PollDecision::Continue => self.start_polling(),
            PollDecision::Completed => {
                if let Err(e) = self.load_results().await {
                    warn!("Loading results for '{}' failed: {}", self.project_key, e);
                }
            }
            PollDecision::Failed { .. } => {
                self.emit(SessionEventKind::JobFailed, failure_message(&job));
            }
        }
    }

    /// Fetches the presenter's current page and shows the results area.
    async fn load_results(&self) -> Result<(), ApiError> {
        let query = {
            let mut state = self.write_state();
            state.presenter.begin_loading();
            state.presenter.query()
        };
        self.emit(
            SessionEventKind::ResultsLoading,
            format!("Loading page {}", query.page),
        );

        match self.fetcher.fetch(&query).await {
            Ok(FetchOutcome::Superseded) => Ok(()),
            Ok(FetchOutcome::Fresh { ticket, page }) => {
                let count = page.matches.len();
                {
                    let mut state = self.write_state();
                    if !self.fetcher.is_current(ticket) {
                        return Ok(());
                    }
                    state.presenter.apply_page(page);
                    state.phase = SessionPhase::Results;
                    state.error = None;
                }
                self.emit(
                    SessionEventKind::ResultsLoaded,
                    format!("{} matches", count),
                );
                Ok(())
            }
            Err(e) => {
                {
                    let mut state = self.write_state();
                    state.presenter.apply_error(e.to_string());
                    state.phase = SessionPhase::Results;
                }
                self.emit(SessionEventKind::ResultsFailed, e.to_string());
                Err(e)
            }
        }
    }

    async fn update_presenter<F>(&self, change: F) -> Result<SessionView, SessionError>
    where
        F: FnOnce(&mut ResultPresenter) -> bool,
    {
        let refetch = {
            let mut state = self.write_state();
            let changed = change(&mut state.presenter);
            changed && state.phase == SessionPhase::Results
        };

        if refetch {
            self.load_results().await?;
        }
        Ok(self.snapshot())
    }
}

fn phase_for(decision: PollDecision) -> SessionPhase {
    match decision {
        PollDecision::Continue => SessionPhase::Running,
        PollDecision::Completed => SessionPhase::Loading,
        PollDecision::Failed { .. } => SessionPhase::JobFailed,
    }
}

fn failure_message(job: &Job) -> String {
    job.error_message
        .clone()
        .or_else(|| job.status_info.as_ref().and_then(|info| info.message.clone()))
        .unwrap_or_else(|| "Analysis failed".to_string())
}

/// Job monitor for a single project key.
///
/// Dropping the session stops its poll loop.
pub struct MatchmakingSession {
    inner: Arc<SessionInner>,
}

impl MatchmakingSession {
    pub fn new(
        api: Arc<dyn MatchmakingApi>,
        project_key: impl Into<String>,
        settings: SessionSettings,
    ) -> Self {
        let project_key = project_key.into();
        Self {
            inner: Arc::new(SessionInner {
                fetcher: ResultFetcher::new(Arc::clone(&api), project_key.clone()),
                api,
                project_key,
                settings,
                state: RwLock::new(SessionState {
                    phase: SessionPhase::Loading,
                    job: None,
                    poller: StatusPoller::new(),
                    presenter: ResultPresenter::new(settings.page_size),
                    error: None,
                    poll_generation: 0,
                }),
                events: SessionEventBroadcaster::default(),
                poll: Mutex::new(None),
            }),
        }
    }

    pub fn project_key(&self) -> &str {
        &self.inner.project_key
    }

    pub fn settings(&self) -> SessionSettings {
        self.inner.settings
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    pub fn snapshot(&self) -> SessionView {
        self.inner.snapshot()
    }

    /// Loads the session.
    ///
    /// Existing results short-circuit everything else: when the first page
    /// has at least one match the job endpoint is not called. Otherwise the
    /// job is looked up; a 404 shows the start prompt.
    pub async fn open(&self) -> Result<SessionView, SessionError> {
        let inner = &self.inner;
        inner.stop_polling();

        let query = {
            let mut state = inner.write_state();
            state.phase = SessionPhase::Loading;
            state.job = None;
            state.error = None;
            state.poller.reset();
            state.presenter.reset_results();
            state.presenter.query()
        };

        match inner.fetcher.fetch(&query).await {
            Ok(FetchOutcome::Fresh { ticket, page }) if !page.is_empty() => {
                let count = page.matches.len();
                {
                    let mut state = inner.write_state();
                    if inner.fetcher.is_current(ticket) {
                        state.presenter.apply_page(page);
                        state.phase = SessionPhase::Results;
                    }
                }
                info!(
                    "Found {} existing matches for '{}', skipping job lookup",
                    count, inner.project_key
                );
                inner.emit(
                    SessionEventKind::ResultsLoaded,
                    format!("{} matches", count),
                );
                return Ok(self.snapshot());
            }
            Ok(FetchOutcome::Fresh { .. }) => {
                debug!("No existing matches for '{}'", inner.project_key);
            }
            Ok(FetchOutcome::Superseded) => return Ok(self.snapshot()),
            Err(e) => {
                warn!(
                    "Existing results check for '{}' failed: {}",
                    inner.project_key, e
                );
            }
        }

        match inner.api.job_for_project(&inner.project_key).await {
            Ok(None) => {
                inner.write_state().phase = SessionPhase::StartPrompt;
                inner.emit(SessionEventKind::PromptShown, "No analysis has been run yet");
            }
            Ok(Some(job)) => inner.adopt_job(job).await,
            Err(e) => {
                {
                    let mut state = inner.write_state();
                    state.phase = SessionPhase::Error;
                    state.error = Some(e.to_string());
                }
                inner.emit(SessionEventKind::Error, e.to_string());
                return Err(e.into());
            }
        }

        Ok(self.snapshot())
    }

    /// Creates a job for the project key and starts monitoring it.
    ///
    /// On failure the previous view is left as it was, apart from `error`.
    pub async fn start_analysis(&self) -> Result<Job, SessionError> {
        let inner = &self.inner;

        if let Some(active) = inner.read_state().job.as_ref().filter(|j| j.is_active()) {
            warn!(
                "Project '{}' already has active job {}; creating another",
                inner.project_key, active.id
            );
        }

        let job = match inner.api.create_job(&inner.project_key).await {
            Ok(job) => job,
            Err(e) => {
                inner.write_state().error = Some(e.to_string());
                inner.emit(SessionEventKind::Error, e.to_string());
                return Err(e.into());
            }
        };
        info!("Created job {} for '{}'", job.id, inner.project_key);

        inner.stop_polling();
        inner.fetcher.invalidate();
        inner.write_state().presenter.reset_results();

        let current = match inner.api.job_for_project(&inner.project_key).await {
            Ok(Some(latest)) => latest,
            Ok(None) => job.clone(),
            Err(e) => {
                debug!("Status check after create failed: {}", e);
                job.clone()
            }
        };
        inner.adopt_job(current).await;

        Ok(job)
    }

    /// Retries the displayed job when the backend allows it.
    pub async fn retry(&self) -> Result<Job, SessionError> {
        let inner = &self.inner;
        let job = inner
            .read_state()
            .job
            .clone()
            .ok_or_else(|| SessionError::NoJob(inner.project_key.clone()))?;

        if !job.can_retry() {
            return Err(SessionError::NotRetryable {
                job_id: job.id.to_string(),
            });
        }

        let retried = match inner.api.retry_job(&job.id).await {
            Ok(retried) => retried,
            Err(e) => {
                inner.write_state().error = Some(e.to_string());
                inner.emit(SessionEventKind::Error, e.to_string());
                return Err(e.into());
            }
        };
        info!("Retried job {} for '{}'", job.id, inner.project_key);

        inner.stop_polling();
        inner.adopt_job(retried.clone()).await;
        Ok(retried)
    }

    /// Re-fetches the current page. This is the manual retry for result errors.
    pub async fn refresh_results(&self) -> Result<SessionView, SessionError> {
        self.inner.load_results().await?;
        Ok(self.snapshot())
    }

    pub async fn set_page(&self, page: u32) -> Result<SessionView, SessionError> {
        self.inner.update_presenter(|p| p.set_page(page)).await
    }

    pub async fn next_page(&self) -> Result<SessionView, SessionError> {
        self.inner.update_presenter(ResultPresenter::next_page).await
    }

    pub async fn previous_page(&self) -> Result<SessionView, SessionError> {
        self.inner
            .update_presenter(ResultPresenter::previous_page)
            .await
    }

    pub async fn set_page_size(&self, page_size: u32) -> Result<SessionView, SessionError> {
        self.inner
            .update_presenter(|p| p.set_page_size(page_size))
            .await
    }

    pub async fn set_filters(&self, filters: FilterState) -> Result<SessionView, SessionError> {
        self.inner.update_presenter(|p| p.set_filters(filters)).await
    }

    pub async fn set_min_cred_score(&self, score: Option<f64>) -> Result<SessionView, SessionError> {
        self.inner
            .update_presenter(|p| p.set_min_cred_score(score))
            .await
    }

    pub async fn set_min_synergy_rating(
        &self,
        rating: Option<u8>,
    ) -> Result<SessionView, SessionError> {
        self.inner
            .update_presenter(|p| p.set_min_synergy_rating(rating))
            .await
    }

    pub async fn set_tier_filter(&self, tier: Option<Tier>) -> Result<SessionView, SessionError> {
        self.inner
            .update_presenter(|p| p.set_tier_filter(tier))
            .await
    }

    /// Client-side search; never reaches the server.
    pub fn set_search(&self, term: &str) -> SessionView {
        self.inner.write_state().presenter.set_search(term);
        self.snapshot()
    }

    /// Resets filters, search and page, then re-fetches.
    pub async fn clear_filters(&self) -> Result<SessionView, SessionError> {
        self.inner
            .update_presenter(ResultPresenter::clear_filters)
            .await
    }

    /// Stops polling and discards in-flight result fetches.
    pub fn close(&self) {
        self.inner.stop_polling();
        self.inner.fetcher.invalidate();
        self.inner.write_state().presenter.cancel_loading();
    }
}

impl Drop for MatchmakingSession {
    fn drop(&mut self) {
        if let Some(handle) = self.inner.take_poll_handle() {
            handle.cancel();
        }
    }
}
