use crate::wire::{WireMatch, WireMatchDetail};
use crate::{MatchDetail, MatchSummary};
use reqwest::{Client, Url};
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const DEFAULT_BASE_URL: &str = "http://localhost:9091";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the match-data service's read-only JSON endpoints.
#[derive(Debug, Clone)]
pub struct MatchApi {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl Default for MatchApi {
    fn default() -> Self {
        Self {
            client: Client::builder()
                .user_agent("matchtui/0.1 (terminal match dashboard)")
                .build()
                .unwrap_or_default(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Network(e, _) | ApiError::Api(e, _) | ApiError::Parsing(e, _) => Some(e),
            ApiError::Other(_) => None,
        }
    }
}

impl MatchApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch every match the service currently lists, in server order.
    pub async fn fetch_matches(&self) -> ApiResult<Vec<MatchSummary>> {
        let url = self.endpoint(&["matches"])?;
        let raw: Vec<WireMatch> = self.get(url).await?;
        Ok(raw.into_iter().map(MatchSummary::from).collect())
    }

    /// Fetch one match by its identifier.
    pub async fn fetch_match(&self, match_id: &str) -> ApiResult<MatchDetail> {
        if match_id.trim().is_empty() {
            return Err(ApiError::Other("match id is empty".into()));
        }
        let url = self.endpoint(&["match", match_id])?;
        let raw: WireMatchDetail = self.get(url).await?;
        Ok(MatchDetail::from(raw))
    }

    /// Join path segments onto the base URL. Each segment is percent-encoded
    /// on its own, so an identifier can never escape its path slot.
    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::Other(format!("invalid base url {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Other(format!("base url cannot hold a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // Every non-2xx status is an error here, 4xx included: a missing match
    // must surface as a failed tick rather than an empty snapshot.
    async fn get<T: serde::de::DeserializeOwned>(&self, url: Url) -> ApiResult<T> {
        let label = url.to_string();
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, label.clone()))?;

        match response.error_for_status() {
            Ok(res) => res
                .json::<T>()
                .await
                .map_err(|e| ApiError::Parsing(e, label)),
            Err(e) => Err(ApiError::Api(e, label)),
        }
    }
}
