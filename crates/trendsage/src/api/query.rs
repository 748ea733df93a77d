/// Query parameters for the top-matches endpoint.
///
/// Unset filters are omitted from the query string entirely.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchQuery {
    pub page: u32,
    pub page_size: u32,
    pub min_cred_score: Option<f64>,
    pub min_synergy_rating: Option<u8>,
    pub include_total: bool,
}

impl MatchQuery {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size,
            min_cred_score: None,
            min_synergy_rating: None,
            include_total: true,
        }
    }

    pub fn with_min_cred_score(mut self, score: Option<f64>) -> Self {
        self.min_cred_score = score;
        self
    }

    pub fn with_min_synergy_rating(mut self, rating: Option<u8>) -> Self {
        self.min_synergy_rating = rating;
        self
    }

    /// Query string pairs in a stable order.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("page_size", self.page_size.to_string()),
        ];

        if let Some(score) = self.min_cred_score {
            params.push(("min_cred_score", score.to_string()));
        }
        if let Some(rating) = self.min_synergy_rating {
            params.push(("min_synergy_rating", rating.to_string()));
        }
        if self.include_total {
            params.push(("include_total", "true".to_string()));
        }

        params
    }

    /// Looks up a single parameter value, as it would be sent.
    pub fn param(&self, name: &str) -> Option<String> {
        self.to_params()
            .into_iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }
}
