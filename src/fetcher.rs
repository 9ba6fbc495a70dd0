use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

/// Number of body characters kept as the summary.
pub const SUMMARY_CHARS: usize = 100;

const DEFAULT_TITLE: &str = "Untitled";

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("upstream returned HTTP {status}")]
    Upstream { status: u16 },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid article payload: {0}")]
    Parse(String),
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Transport(err) if err.is_timeout())
    }
}

/// The fields we read from a third-party article payload. Both are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FetchedArticle {
    pub title: Option<String>,
    pub body: Option<String>,
}

impl FetchedArticle {
    /// Parses a JSON object payload. Anything else is a `Parse` error.
    pub fn from_json(bytes: &[u8]) -> Result<Self, FetchError> {
        let value: serde_json::Value =
            serde_json::from_slice(bytes).map_err(|e| FetchError::Parse(e.to_string()))?;
        if !value.is_object() {
            return Err(FetchError::Parse("expected a JSON object".to_string()));
        }
        serde_json::from_value(value).map_err(|e| FetchError::Parse(e.to_string()))
    }

    pub fn title_or_default(&self) -> String {
        match self.title.as_deref() {
            Some(title) if !title.trim().is_empty() => title.to_string(),
            _ => DEFAULT_TITLE.to_string(),
        }
    }

    pub fn body_or_default(&self) -> String {
        self.body.clone().unwrap_or_default()
    }

    /// First `SUMMARY_CHARS` characters of the body, counted by `char`.
    pub fn summary(&self) -> String {
        self.body
            .as_deref()
            .unwrap_or_default()
            .chars()
            .take(SUMMARY_CHARS)
            .collect()
    }
}

/// Where article content comes from.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedArticle, FetchError>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("ArticleService/1.0")
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ArticleSource for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedArticle, FetchError> {
        info!("Fetching article: {}", url);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("Fetch of {} returned HTTP {}", url, status);
            return Err(FetchError::Upstream {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        FetchedArticle::from_json(&bytes)
    }
}
