use async_trait::async_trait;
use match_api::client::{ApiResult, MatchApi};
use match_api::{MatchDetail, MatchSummary};

/// Source of match data polled by the sync components.
#[async_trait]
pub trait MatchFeed: Send + Sync {
    /// Every listed match, in the order the source returns them.
    async fn matches(&self) -> ApiResult<Vec<MatchSummary>>;

    async fn match_detail(&self, match_id: &str) -> ApiResult<MatchDetail>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

#[async_trait]
impl MatchFeed for MatchApi {
    async fn matches(&self) -> ApiResult<Vec<MatchSummary>> {
        self.fetch_matches().await
    }

    async fn match_detail(&self, match_id: &str) -> ApiResult<MatchDetail> {
        self.fetch_match(match_id).await
    }

    fn name(&self) -> &str {
        self.base_url()
    }
}
