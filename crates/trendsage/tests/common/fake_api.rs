//! Scripted in-memory backend.
//!
//! Replies are queued per endpoint. When a queue runs down to its last reply
//! that reply repeats, so a single `completed` status answers every later poll.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use trendsage::api::{Job, JobId, MatchPage, MatchQuery, MatchmakingApi};
use trendsage::error::ApiError;

#[derive(Debug, Clone)]
pub enum JobReply {
    Found(Job),
    NotFound,
    Fail(u16, String),
}

impl JobReply {
    fn into_result(self) -> Result<Option<Job>, ApiError> {
        match self {
            JobReply::Found(job) => Ok(Some(job)),
            JobReply::NotFound => Ok(None),
            JobReply::Fail(status, message) => Err(ApiError::Http { status, message }),
        }
    }
}

#[derive(Debug, Clone)]
pub enum PageReply {
    Page(MatchPage),
    /// Answers after the given delay of (paused) tokio time.
    Delayed(Duration, MatchPage),
    Fail(u16, String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    CreateJob(String),
    JobForProject(String),
    RetryJob(String),
    TopMatches(String, MatchQuery),
}

struct Script<T> {
    replies: VecDeque<T>,
}

impl<T: Clone> Script<T> {
    fn new() -> Self {
        Self {
            replies: VecDeque::new(),
        }
    }

    fn next(&mut self) -> Option<T> {
        if self.replies.len() > 1 {
            self.replies.pop_front()
        } else {
            self.replies.front().cloned()
        }
    }
}

pub struct ScriptedApi {
    statuses: Mutex<Script<JobReply>>,
    pages: Mutex<Script<PageReply>>,
    created: Mutex<Script<JobReply>>,
    retried: Mutex<Script<JobReply>>,
    calls: Mutex<Vec<ApiCall>>,
}

impl Default for ScriptedApi {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self {
            statuses: Mutex::new(Script::new()),
            pages: Mutex::new(Script::new()),
            created: Mutex::new(Script::new()),
            retried: Mutex::new(Script::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_statuses(self, replies: Vec<JobReply>) -> Self {
        self.statuses.lock().unwrap().replies.extend(replies);
        self
    }

    pub fn with_pages(self, replies: Vec<PageReply>) -> Self {
        self.pages.lock().unwrap().replies.extend(replies);
        self
    }

    pub fn with_created(self, reply: JobReply) -> Self {
        self.created.lock().unwrap().replies.push_back(reply);
        self
    }

    pub fn with_retried(self, reply: JobReply) -> Self {
        self.retried.lock().unwrap().replies.push_back(reply);
        self
    }

    /// Replaces the status script, e.g. after the session has opened.
    pub fn set_statuses(&self, replies: Vec<JobReply>) {
        self.statuses.lock().unwrap().replies = replies.into();
    }

    pub fn set_pages(&self, replies: Vec<PageReply>) {
        self.pages.lock().unwrap().replies = replies.into();
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn status_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ApiCall::JobForProject(_)))
            .count()
    }

    pub fn create_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ApiCall::CreateJob(_)))
            .count()
    }

    pub fn match_queries(&self) -> Vec<MatchQuery> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ApiCall::TopMatches(_, query) => Some(query),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl MatchmakingApi for ScriptedApi {
    async fn create_job(&self, project_key: &str) -> Result<Job, ApiError> {
        self.record(ApiCall::CreateJob(project_key.to_string()));
        let reply = self.created.lock().unwrap().next();
        match reply.map(JobReply::into_result) {
            Some(Ok(Some(job))) => Ok(job),
            Some(Err(e)) => Err(e),
            _ => Err(ApiError::Http {
                status: 500,
                message: "no scripted create reply".to_string(),
            }),
        }
    }

    async fn job_for_project(&self, project_key: &str) -> Result<Option<Job>, ApiError> {
        self.record(ApiCall::JobForProject(project_key.to_string()));
        let reply = self.statuses.lock().unwrap().next();
        reply.unwrap_or(JobReply::NotFound).into_result()
    }

    async fn retry_job(&self, job_id: &JobId) -> Result<Job, ApiError> {
        self.record(ApiCall::RetryJob(job_id.to_string()));
        let reply = self.retried.lock().unwrap().next();
        match reply.map(JobReply::into_result) {
            Some(Ok(Some(job))) => Ok(job),
            Some(Err(e)) => Err(e),
            _ => Err(ApiError::Http {
                status: 404,
                message: "Job not found".to_string(),
            }),
        }
    }

    async fn top_matches(&self, project_key: &str, query: &MatchQuery) -> Result<MatchPage, ApiError> {
        self.record(ApiCall::TopMatches(project_key.to_string(), query.clone()));
        let reply = self.pages.lock().unwrap().next();
        match reply {
            Some(PageReply::Page(page)) => Ok(page),
            Some(PageReply::Delayed(delay, page)) => {
                tokio::time::sleep(delay).await;
                Ok(page)
            }
            Some(PageReply::Fail(status, message)) => Err(ApiError::Http { status, message }),
            None => Ok(MatchPage::default()),
        }
    }
}
