//! Wire types for the matchmaking backend.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ─── Identifiers ────────────────────────────────────────────────────────────

/// Backend identifier. Arrives as a JSON number on some endpoints and a
/// string on others; held as a string either way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ExternalId(String);

impl ExternalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for ExternalId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for ExternalId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for ExternalId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(i64),
            Str(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(n) => ExternalId(n.to_string()),
            RawId::Str(s) => ExternalId(s),
        })
    }
}

pub type JobId = ExternalId;

// ─── Job ────────────────────────────────────────────────────────────────────

/// Lifecycle state of a backend job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Terminal states end polling.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl From<String> for JobStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" | "queued" => JobStatus::Pending,
            "processing" | "running" => JobStatus::Processing,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            other => {
                log::warn!("Unknown job status '{}', treating as processing", other);
                JobStatus::Processing
            }
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Processing => write!(f, "processing"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Backend-provided hints about a job's state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusInfo {
    #[serde(default)]
    pub can_retry: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A unit of asynchronous analysis work, as last observed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub project_id: String,
    pub status: JobStatus,
    #[serde(with = "super::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        with = "super::timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_info: Option<StatusInfo>,
}

impl Job {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// True only for failed jobs the backend marks as retryable.
    pub fn can_retry(&self) -> bool {
        self.status == JobStatus::Failed
            && self.status_info.as_ref().is_some_and(|info| info.can_retry)
    }
}

// ─── Match results ──────────────────────────────────────────────────────────

/// Coarse influencer standing bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Tier {
    Tier1,
    Tier2,
    Tier3,
    Other(String),
}

impl Tier {
    pub fn as_str(&self) -> &str {
        match self {
            Tier::Tier1 => "tier-1",
            Tier::Tier2 => "tier-2",
            Tier::Tier3 => "tier-3",
            Tier::Other(s) => s,
        }
    }
}

impl From<String> for Tier {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "tier-1" | "tier1" => Tier::Tier1,
            "tier-2" | "tier2" => Tier::Tier2,
            "tier-3" | "tier3" => Tier::Tier3,
            _ => Tier::Other(s),
        }
    }
}

impl From<Tier> for String {
    fn from(tier: Tier) -> Self {
        tier.as_str().to_string()
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scored influencer recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub id: ExternalId,
    pub project_id: String,
    pub influencer_handle: String,
    /// 0-5.
    pub cred_score: f64,
    pub tier: Tier,
    /// 1-5.
    pub synergy_rating_to_project: u8,
    #[serde(default)]
    pub keywords_from_tweets: Vec<String>,
    #[serde(default)]
    pub synergy_rationale: String,
    #[serde(default)]
    pub recommended_marketing_angle: String,
    #[serde(default)]
    pub notes: String,
    #[serde(
        default,
        with = "super::timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "super::timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Pagination metadata returned with every page of matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    pub page: u32,
    pub page_size: u32,
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub has_previous: bool,
    #[serde(default)]
    pub showing_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
}

impl PaginationState {
    /// Paging controls are only shown when there is somewhere to go.
    pub fn shows_controls(&self) -> bool {
        self.has_next || self.has_previous
    }
}

/// One page of match results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchPage {
    #[serde(default)]
    pub matches: Vec<MatchResult>,
    #[serde(default)]
    pub pagination: PaginationState,
}

impl MatchPage {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

// ─── Requests ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CreateJobRequest<'a> {
    pub project_id: &'a str,
}
