//! Result presentation state: paging, filters and client-side search.
//!
//! The presenter never talks to the network. Mutators return `true` when
//! the change requires a new fetch from the server.

use serde::{Deserialize, Serialize};

use crate::api::{MatchPage, MatchQuery, MatchResult, PaginationState, Tier};

const MAX_CRED_SCORE: f64 = 5.0;
const MIN_SYNERGY: u8 = 1;
const MAX_SYNERGY: u8 = 5;

/// User-selected result filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_cred_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_synergy_rating: Option<u8>,
    /// Applied client-side; the matches endpoint has no tier parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier_filter: Option<Tier>,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        self.min_cred_score.is_none()
            && self.min_synergy_rating.is_none()
            && self.tier_filter.is_none()
    }

    /// Clamps values into the ranges the backend scores use.
    fn normalized(self) -> Self {
        Self {
            min_cred_score: self
                .min_cred_score
                .filter(|s| s.is_finite())
                .map(|s| s.clamp(0.0, MAX_CRED_SCORE)),
            min_synergy_rating: self
                .min_synergy_rating
                .map(|r| r.clamp(MIN_SYNERGY, MAX_SYNERGY)),
            tier_filter: self.tier_filter,
        }
    }
}

/// What a consumer renders for the results area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsView {
    pub matches: Vec<MatchResult>,
    pub pagination: PaginationState,
    pub show_pagination: bool,
    pub filters: FilterState,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub search: String,
    pub loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ResultPresenter {
    page: u32,
    page_size: u32,
    filters: FilterState,
    search: String,
    current: Option<MatchPage>,
    loading: bool,
    error: Option<String>,
}

impl ResultPresenter {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            filters: FilterState::default(),
            search: String::new(),
            current: None,
            loading: false,
            error: None,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn current(&self) -> Option<&MatchPage> {
        self.current.as_ref()
    }

    /// Server query for the current page and filters. The search term is
    /// never part of it.
    pub fn query(&self) -> MatchQuery {
        MatchQuery::new(self.page, self.page_size)
            .with_min_cred_score(self.filters.min_cred_score)
            .with_min_synergy_rating(self.filters.min_synergy_rating)
    }

    pub fn set_page(&mut self, page: u32) -> bool {
        let page = page.max(1);
        let changed = page != self.page;
        self.page = page;
        changed
    }

    pub fn next_page(&mut self) -> bool {
        match &self.current {
            Some(current) if current.pagination.has_next => self.set_page(self.page + 1),
            _ => false,
        }
    }

    pub fn previous_page(&mut self) -> bool {
        match &self.current {
            Some(current) if current.pagination.has_previous && self.page > 1 => {
                self.set_page(self.page - 1)
            }
            _ => false,
        }
    }

    /// Changing the page size returns to the first page.
    pub fn set_page_size(&mut self, page_size: u32) -> bool {
        let page_size = page_size.max(1);
        if page_size == self.page_size {
            return false;
        }
        self.page_size = page_size;
        self.page = 1;
        true
    }

    /// Replaces all filter fields. Any change returns to the first page.
    pub fn set_filters(&mut self, filters: FilterState) -> bool {
        let filters = filters.normalized();
        if filters == self.filters {
            return false;
        }
        self.filters = filters;
        self.page = 1;
        true
    }

    pub fn set_min_cred_score(&mut self, score: Option<f64>) -> bool {
        self.set_filters(FilterState {
            min_cred_score: score,
            ..self.filters.clone()
        })
    }

    pub fn set_min_synergy_rating(&mut self, rating: Option<u8>) -> bool {
        self.set_filters(FilterState {
            min_synergy_rating: rating,
            ..self.filters.clone()
        })
    }

    pub fn set_tier_filter(&mut self, tier: Option<Tier>) -> bool {
        self.set_filters(FilterState {
            tier_filter: tier,
            ..self.filters.clone()
        })
    }

    /// Client-side only; never triggers a fetch.
    pub fn set_search(&mut self, term: &str) {
        self.search = term.trim().to_string();
    }

    /// Resets every filter, the search term and the page. Always re-fetches.
    pub fn clear_filters(&mut self) -> bool {
        self.filters = FilterState::default();
        self.search.clear();
        self.page = 1;
        true
    }

    pub fn begin_loading(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn apply_page(&mut self, page: MatchPage) {
        if page.pagination.page > 0 {
            self.page = page.pagination.page;
        }
        self.current = Some(page);
        self.loading = false;
        self.error = None;
    }

    /// Records a fetch failure; the previous page stays visible.
    pub fn apply_error(&mut self, message: String) {
        self.loading = false;
        self.error = Some(message);
    }

    /// Abandons an in-flight fetch; whatever was shown stays.
    pub fn cancel_loading(&mut self) {
        self.loading = false;
    }

    /// Drops loaded results, e.g. when a new job replaces the result view.
    pub fn reset_results(&mut self) {
        self.current = None;
        self.loading = false;
        self.error = None;
        self.page = 1;
    }

    fn matches_client_filters(&self, m: &MatchResult) -> bool {
        if let Some(tier) = &self.filters.tier_filter {
            if &m.tier != tier {
                return false;
            }
        }

        if self.search.is_empty() {
            return true;
        }

        let needle = self.search.to_lowercase();
        [
            &m.influencer_handle,
            &m.synergy_rationale,
            &m.recommended_marketing_angle,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Current page records after tier and search filtering.
    pub fn visible_matches(&self) -> Vec<&MatchResult> {
        self.current
            .iter()
            .flat_map(|page| page.matches.iter())
            .filter(|m| self.matches_client_filters(m))
            .collect()
    }

    pub fn view(&self) -> ResultsView {
        let pagination = self
            .current
            .as_ref()
            .map(|page| page.pagination.clone())
            .unwrap_or_default();

        ResultsView {
            matches: self.visible_matches().into_iter().cloned().collect(),
            show_pagination: pagination.shows_controls(),
            pagination,
            filters: self.filters.clone(),
            search: self.search.clone(),
            loading: self.loading,
            error: self.error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ExternalId;

    fn result(handle: &str, tier: Tier, rationale: &str, angle: &str) -> MatchResult {
        MatchResult {
            id: ExternalId::new(handle),
            project_id: "acme".to_string(),
            influencer_handle: handle.to_string(),
            cred_score: 4.0,
            tier,
            synergy_rating_to_project: 4,
            keywords_from_tweets: vec![],
            synergy_rationale: rationale.to_string(),
            recommended_marketing_angle: angle.to_string(),
            notes: String::new(),
            created_at: None,
            updated_at: None,
        }
    }

    fn page(matches: Vec<MatchResult>, has_next: bool, has_previous: bool) -> MatchPage {
        MatchPage {
            pagination: PaginationState {
                page: 1,
                page_size: 20,
                has_next,
                has_previous,
                showing_count: matches.len() as u32,
                total_count: None,
            },
            matches,
        }
    }

    fn loaded() -> ResultPresenter {
        let mut p = ResultPresenter::new(20);
        p.apply_page(page(
            vec![
                result("@defi_dan", Tier::Tier1, "Deep DeFi audience", "Yield launch"),
                result("@nft_nina", Tier::Tier2, "NFT collectors", "Mint campaign"),
                result("@gm_greg", Tier::Tier3, "General crypto", "DeFi explainer"),
            ],
            false,
            false,
        ));
        p
    }

    #[test]
    fn test_search_is_case_insensitive_over_three_fields() {
        let mut p = loaded();
        p.set_search("defi");
        let handles: Vec<&str> = p
            .visible_matches()
            .iter()
            .map(|m| m.influencer_handle.as_str())
            .collect();
        assert_eq!(handles, vec!["@defi_dan", "@gm_greg"]);

        p.set_search("MINT");
        assert_eq!(p.visible_matches().len(), 1);
    }

    #[test]
    fn test_search_is_not_sent_to_server() {
        let mut p = loaded();
        p.set_search("defi");
        let query = p.query();
        assert!(query.to_params().iter().all(|(_, v)| v != "defi"));
    }

    #[test]
    fn test_tier_filter_is_client_side() {
        let mut p = loaded();
        assert!(p.set_tier_filter(Some(Tier::Tier2)));
        assert_eq!(p.visible_matches().len(), 1);
        assert!(p.query().param("tier").is_none());
    }

    #[test]
    fn test_filter_change_resets_page() {
        let mut p = ResultPresenter::new(20);
        p.set_page(3);
        assert!(p.set_min_cred_score(Some(3.0)));
        assert_eq!(p.page(), 1);
        assert_eq!(p.query().param("min_cred_score").as_deref(), Some("3"));
    }

    #[test]
    fn test_unchanged_filter_needs_no_fetch() {
        let mut p = ResultPresenter::new(20);
        assert!(p.set_min_synergy_rating(Some(4)));
        assert!(!p.set_min_synergy_rating(Some(4)));
    }

    #[test]
    fn test_filters_are_clamped() {
        let mut p = ResultPresenter::new(20);
        p.set_filters(FilterState {
            min_cred_score: Some(9.0),
            min_synergy_rating: Some(0),
            tier_filter: None,
        });
        assert_eq!(p.filters().min_cred_score, Some(5.0));
        assert_eq!(p.filters().min_synergy_rating, Some(1));
    }

    #[test]
    fn test_clear_filters_resets_everything() {
        let mut p = loaded();
        p.set_min_cred_score(Some(3.0));
        p.set_search("nina");
        p.set_page(4);
        assert!(p.clear_filters());
        assert!(p.filters().is_empty());
        assert_eq!(p.search(), "");
        assert_eq!(p.page(), 1);
        assert!(p.query().param("min_cred_score").is_none());
    }

    #[test]
    fn test_page_size_change_resets_page() {
        let mut p = ResultPresenter::new(20);
        p.set_page(2);
        assert!(p.set_page_size(50));
        assert_eq!(p.page(), 1);
        assert!(!p.set_page_size(50));
    }

    #[test]
    fn test_next_page_requires_has_next() {
        let mut p = loaded();
        assert!(!p.next_page());

        p.apply_page(page(vec![], true, false));
        assert!(p.next_page());
        assert_eq!(p.page(), 2);
    }

    #[test]
    fn test_no_pagination_controls_without_neighbours() {
        let p = loaded();
        let view = p.view();
        assert_eq!(view.matches.len(), 3);
        assert!(!view.show_pagination);
    }

    #[test]
    fn test_cancel_loading_keeps_page() {
        let mut p = loaded();
        p.begin_loading();
        p.cancel_loading();
        let view = p.view();
        assert!(!view.loading);
        assert!(view.error.is_none());
        assert_eq!(view.matches.len(), 3);
    }

    #[test]
    fn test_error_keeps_previous_page() {
        let mut p = loaded();
        p.begin_loading();
        p.apply_error("HTTP 500".to_string());
        let view = p.view();
        assert_eq!(view.error.as_deref(), Some("HTTP 500"));
        assert_eq!(view.matches.len(), 3);
        assert!(!view.loading);
    }
}
