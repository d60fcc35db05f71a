use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, instrument, warn};

use crate::api::model::ProgressListResp;
use crate::model::{Account, Course, WatchProgressEntry};

pub mod model;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no credential available for request")]
    AuthUnavailable,
    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },
}

impl ApiError {
    pub fn is_auth_unavailable(err: &anyhow::Error) -> bool {
        matches!(err.downcast_ref::<ApiError>(), Some(ApiError::AuthUnavailable))
    }
}

/// Supplies the bearer credential for each request. Acquisition and refresh
/// happen elsewhere; `None` means the request must not be sent.
pub trait TokenSource: Send + Sync {
    fn token(&self) -> Option<String>;
}

/// Fixed credential, mostly for the CLI and tests.
#[derive(Clone, Default)]
pub struct StaticToken(pub Option<String>);

impl TokenSource for StaticToken {
    fn token(&self) -> Option<String> {
        self.0.clone().filter(|t| !t.is_empty())
    }
}

#[async_trait]
pub trait LmsService: Send + Sync {
    async fn fetch_account(&self) -> Result<Account>;

    async fn fetch_course(&self, course_id: &str) -> Result<Course>;

    async fn fetch_progress(&self, course_id: &str) -> Result<Vec<WatchProgressEntry>>;

    async fn submit_progress(&self, entry: &WatchProgressEntry) -> Result<()>;
}

#[derive(Clone)]
pub struct LmsClient {
    http: Client,
    base_url: Url,
    tokens: Arc<dyn TokenSource>,
}

impl fmt::Debug for LmsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LmsClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl LmsClient {
    pub fn new(base_url: Url, tokens: Arc<dyn TokenSource>, timeout: Duration) -> Result<Self> {
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("LMS base URL cannot carry a path: {}", base_url));
        }
        let http = Client::builder()
            .user_agent(concat!("course-player/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self::with_http(http, base_url, tokens))
    }

    pub(crate) fn with_http(http: Client, base_url: Url, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            http,
            base_url,
            tokens,
        }
    }

    /// Base URL with `segments` appended; each segment is percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> Result<reqwest::RequestBuilder> {
        let token = self.tokens.token().ok_or(ApiError::AuthUnavailable)?;
        Ok(self
            .http
            .request(method, url)
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", "application/json"))
    }

    pub fn build_account_request(&self) -> Result<reqwest::Request> {
        self.request(Method::GET, self.endpoint(&["v1", "account"]))?
            .build()
            .context("failed to build account request")
    }

    pub fn build_course_request(&self, course_id: &str) -> Result<reqwest::Request> {
        self.request(Method::GET, self.endpoint(&["v1", "courses", course_id]))?
            .build()
            .context("failed to build course request")
    }

    pub fn build_progress_request(&self, course_id: &str) -> Result<reqwest::Request> {
        let url = self.endpoint(&["v1", "courses", course_id, "progress"]);
        self.request(Method::GET, url)?
            .build()
            .context("failed to build progress request")
    }

    pub fn build_submit_request(&self, entry: &WatchProgressEntry) -> Result<reqwest::Request> {
        let url = self.endpoint(&["v1", "courses", &entry.course_id, "progress"]);
        self.request(Method::POST, url)?
            .header("Content-Type", "application/json")
            .json(entry)
            .build()
            .context("failed to build progress submission")
    }

    async fn execute(&self, request: reqwest::Request) -> Result<String> {
        debug!(method = %request.method(), url = %request.url(), "LMS request");
        let res = self
            .http
            .execute(request)
            .await
            .context("failed to reach LMS backend")?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            warn!(%status, "LMS backend error");
            return Err(ApiError::Status { status, body }.into());
        }
        res.text().await.context("failed to read LMS response")
    }

    async fn execute_json<T: DeserializeOwned>(&self, request: reqwest::Request) -> Result<T> {
        let body = self.execute(request).await?;
        match serde_json::from_str::<T>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(e) => {
                let snippet_len = body.len().min(500);
                let snippet = body.get(..snippet_len).unwrap_or_default();
                error!(error = %e, body_snippet = %snippet, "failed to parse LMS response");
                Err(anyhow::Error::new(e).context("invalid LMS response JSON"))
            }
        }
    }
}

#[async_trait]
impl LmsService for LmsClient {
    #[instrument(level = "debug", skip(self))]
    async fn fetch_account(&self) -> Result<Account> {
        let request = self.build_account_request()?;
        self.execute_json(request).await
    }

    #[instrument(level = "debug", skip(self))]
    async fn fetch_course(&self, course_id: &str) -> Result<Course> {
        let request = self.build_course_request(course_id)?;
        self.execute_json(request).await
    }

    #[instrument(level = "debug", skip(self))]
    async fn fetch_progress(&self, course_id: &str) -> Result<Vec<WatchProgressEntry>> {
        let request = self.build_progress_request(course_id)?;
        let resp: ProgressListResp = self.execute_json(request).await?;
        Ok(resp.into_entries())
    }

    #[instrument(level = "debug", skip_all, fields(video_id = %entry.video_id))]
    async fn submit_progress(&self, entry: &WatchProgressEntry) -> Result<()> {
        let request = self.build_submit_request(entry)?;
        self.execute(request).await?;
        Ok(())
    }
}
