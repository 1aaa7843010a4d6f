use async_trait::async_trait;
use reqwest::{header, Client, Response, StatusCode};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::github::contents::RepoContents;
use crate::github::paginator::Paginator;
use crate::github::rate_limiter::{unix_now, RateLimiter};
use crate::github::remote::StarredSource;
use crate::models::{ContentFile, StarredItem};

const STAR_MEDIA_TYPE: &str = "application/vnd.github.star+json";

#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    rate_limiter: Arc<RateLimiter>,
    base_url: String,
}

impl GitHubClient {
    pub fn new(token: &str, base_url: &str) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", token))?,
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            header::HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("starsorter/0.1"),
        );

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            rate_limiter: Arc::new(RateLimiter::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Handle for reading and writing files in `owner/name`.
    pub fn repository(&self, full_name: &str) -> RepoContents {
        RepoContents::new(self.clone(), full_name)
    }

    pub async fn get_starred(&self) -> Result<Vec<StarredItem>> {
        let url = format!("{}/user/starred", self.base_url);
        let paginator =
            Paginator::new(&self.client, &self.rate_limiter).with_accept(STAR_MEDIA_TYPE);
        tracing::info!("Fetching starred repositories");
        paginator.fetch_all(&url, 100).await
    }

    pub async fn get_readme(&self, full_name: &str) -> Result<String> {
        let url = format!("{}/repos/{}/readme", self.base_url, full_name);
        match self.get_json::<ContentFile>(&url).await? {
            Some(file) => file.decoded_content(),
            None => Err(Error::NotFound(format!("README for {}", full_name))),
        }
    }

    /// GET that maps 404 to `None`.
    pub(crate) async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<Option<T>> {
        self.rate_limiter.check()?;
        tracing::debug!("Fetching: {}", url);

        let response = self.client.get(url).send().await?;
        self.rate_limiter.update_from_response(&response);

        match check_response(response, url).await {
            Ok(response) => Ok(Some(response.json().await?)),
            Err(Error::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub(crate) async fn send_json<B: serde::Serialize>(
        &self,
        method: reqwest::Method,
        url: &str,
        body: &B,
    ) -> Result<()> {
        self.rate_limiter.check()?;
        tracing::debug!("{} {}", method, url);

        let response = self.client.request(method, url).json(body).send().await?;
        self.rate_limiter.update_from_response(&response);
        check_response(response, url).await?;
        Ok(())
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl StarredSource for GitHubClient {
    async fn starred(&self) -> Result<Vec<StarredItem>> {
        self.get_starred().await
    }

    async fn readme(&self, full_name: &str) -> Result<String> {
        self.get_readme(full_name).await
    }
}

/// Turns non-success responses into typed errors.
pub(crate) async fn check_response(response: Response, context: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::NOT_FOUND {
        return Err(Error::NotFound(context.to_string()));
    }

    if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
        if let Some(wait) = rate_limit_wait(response.headers()) {
            return Err(Error::RateLimited(wait));
        }
    }

    let body = response.text().await.unwrap_or_default();
    Err(Error::GitHubApi(format!("{}: {} - {}", context, status, body)))
}

fn rate_limit_wait(headers: &header::HeaderMap) -> Option<u64> {
    let value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
    };

    if let Some(retry_after) = value("retry-after") {
        return Some(retry_after);
    }

    if value("x-ratelimit-remaining") == Some(0) {
        let reset = value("x-ratelimit-reset").unwrap_or(0);
        return Some(reset.saturating_sub(unix_now()));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_wait_from_retry_after() {
        let mut headers = header::HeaderMap::new();
        headers.insert("retry-after", header::HeaderValue::from_static("30"));
        assert_eq!(rate_limit_wait(&headers), Some(30));
    }

    #[test]
    fn test_rate_limit_wait_from_exhausted_budget() {
        let mut headers = header::HeaderMap::new();
        headers.insert("x-ratelimit-remaining", header::HeaderValue::from_static("0"));
        headers.insert("x-ratelimit-reset", header::HeaderValue::from_static("0"));
        assert_eq!(rate_limit_wait(&headers), Some(0));
    }

    #[test]
    fn test_plain_forbidden_is_not_rate_limit() {
        let mut headers = header::HeaderMap::new();
        headers.insert("x-ratelimit-remaining", header::HeaderValue::from_static("4999"));
        assert_eq!(rate_limit_wait(&headers), None);
    }

    #[test]
    fn test_repository_handle() {
        let github = GitHubClient::new("ghp_test", "https://api.github.com/").unwrap();
        assert_eq!(github.base_url(), "https://api.github.com");
        assert_eq!(github.repository("me/stars").full_name(), "me/stars");
    }
}
