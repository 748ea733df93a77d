//! Builders for backend records.

#![allow(dead_code)]

use chrono::{TimeZone, Utc};

use trendsage::api::{ExternalId, Job, JobStatus, MatchPage, MatchResult, PaginationState, StatusInfo, Tier};

pub struct JobBuilder {
    job: Job,
}

impl JobBuilder {
    pub fn new(id: i64, project_id: &str) -> Self {
        Self {
            job: Job {
                id: ExternalId::from(id),
                project_id: project_id.to_string(),
                status: JobStatus::Pending,
                created_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
                updated_at: None,
                error_message: None,
                status_info: None,
            },
        }
    }

    pub fn status(mut self, status: JobStatus) -> Self {
        self.job.status = status;
        self
    }

    /// Marks the job failed with an error and a retry flag.
    pub fn failed(mut self, message: &str, can_retry: bool) -> Self {
        self.job.status = JobStatus::Failed;
        self.job.error_message = Some(message.to_string());
        self.job.status_info = Some(StatusInfo {
            can_retry,
            message: None,
        });
        self
    }

    pub fn build(self) -> Job {
        self.job
    }
}

pub fn job(id: i64, project_id: &str, status: JobStatus) -> Job {
    JobBuilder::new(id, project_id).status(status).build()
}

pub struct MatchBuilder {
    result: MatchResult,
}

impl MatchBuilder {
    pub fn new(handle: &str) -> Self {
        Self {
            result: MatchResult {
                id: ExternalId::new(handle.trim_start_matches('@')),
                project_id: "acme".to_string(),
                influencer_handle: handle.to_string(),
                cred_score: 3.5,
                tier: Tier::Tier2,
                synergy_rating_to_project: 3,
                keywords_from_tweets: vec!["defi".to_string()],
                synergy_rationale: String::new(),
                recommended_marketing_angle: String::new(),
                notes: String::new(),
                created_at: None,
                updated_at: None,
            },
        }
    }

    pub fn project(mut self, project_id: &str) -> Self {
        self.result.project_id = project_id.to_string();
        self
    }

    pub fn tier(mut self, tier: Tier) -> Self {
        self.result.tier = tier;
        self
    }

    pub fn cred_score(mut self, score: f64) -> Self {
        self.result.cred_score = score;
        self
    }

    pub fn synergy(mut self, rating: u8) -> Self {
        self.result.synergy_rating_to_project = rating;
        self
    }

    pub fn rationale(mut self, text: &str) -> Self {
        self.result.synergy_rationale = text.to_string();
        self
    }

    pub fn angle(mut self, text: &str) -> Self {
        self.result.recommended_marketing_angle = text.to_string();
        self
    }

    pub fn build(self) -> MatchResult {
        self.result
    }
}

/// A page with no neighbours.
pub fn single_page(matches: Vec<MatchResult>) -> MatchPage {
    page_of(matches, 1, 20, false, false)
}

pub fn empty_page() -> MatchPage {
    single_page(vec![])
}

pub fn page_of(
    matches: Vec<MatchResult>,
    page: u32,
    page_size: u32,
    has_next: bool,
    has_previous: bool,
) -> MatchPage {
    MatchPage {
        pagination: PaginationState {
            page,
            page_size,
            has_next,
            has_previous,
            showing_count: matches.len() as u32,
            total_count: None,
        },
        matches,
    }
}

pub fn three_matches() -> Vec<MatchResult> {
    vec![
        MatchBuilder::new("@defi_dan")
            .tier(Tier::Tier1)
            .cred_score(4.6)
            .synergy(5)
            .rationale("Deep DeFi audience")
            .angle("Yield launch thread")
            .build(),
        MatchBuilder::new("@nft_nina")
            .tier(Tier::Tier2)
            .rationale("NFT collectors")
            .angle("Mint campaign")
            .build(),
        MatchBuilder::new("@gm_greg")
            .tier(Tier::Tier3)
            .cred_score(2.1)
            .synergy(2)
            .rationale("General crypto news")
            .angle("Explainer video")
            .build(),
    ]
}
