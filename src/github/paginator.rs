use reqwest::{header, Client};
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::github::client::check_response;
use crate::github::rate_limiter::RateLimiter;

pub struct Paginator<'a> {
    client: &'a Client,
    rate_limiter: &'a RateLimiter,
    accept: Option<&'static str>,
}

impl<'a> Paginator<'a> {
    pub fn new(client: &'a Client, rate_limiter: &'a RateLimiter) -> Self {
        Self {
            client,
            rate_limiter,
            accept: None,
        }
    }

    /// Overrides the default media type, e.g. to get `starred_at` on star listings.
    pub fn with_accept(mut self, accept: &'static str) -> Self {
        self.accept = Some(accept);
        self
    }

    pub async fn fetch_all<T: DeserializeOwned>(
        &self,
        base_url: &str,
        per_page: u32,
    ) -> Result<Vec<T>> {
        let mut all_items = Vec::new();
        let mut page = 1;

        loop {
            self.rate_limiter.check()?;

            let separator = if base_url.contains('?') { "&" } else { "?" };
            let url = format!("{}{}per_page={}&page={}", base_url, separator, per_page, page);

            tracing::debug!("Fetching: {}", url);
            let mut request = self.client.get(&url);
            if let Some(accept) = self.accept {
                request = request.header(header::ACCEPT, accept);
            }
            let response = request.send().await?;
            self.rate_limiter.update_from_response(&response);
            let response = check_response(response, &url).await?;

            // Check for next page in Link header
            let has_next = has_next_page(
                response
                    .headers()
                    .get(header::LINK)
                    .and_then(|v| v.to_str().ok()),
            );

            let items: Vec<T> = response.json().await?;
            let items_count = items.len();
            all_items.extend(items);

            if !has_next || items_count < per_page as usize {
                break;
            }

            page += 1;
        }

        Ok(all_items)
    }
}

fn has_next_page(link: Option<&str>) -> bool {
    link.map(|v| v.contains("rel=\"next\"")).unwrap_or(false)
}
