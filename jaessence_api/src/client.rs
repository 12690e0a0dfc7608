//! HTTP session client for the JA Essence storefront.

use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};
use tokio::time::sleep;
use url::Url;

use crate::{retry::RetryPolicy, types::Page, user_agent::get_user_agent, Error};

/// Production storefront root.
pub const DEFAULT_BASE_URL: &str = "https://www.jaessencedelavie.com.br";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the storefront's rendered pages.
///
/// Holds one `reqwest::Client` with a cookie store for its whole lifetime, so
/// cookies handed out by [`Client::warm_up`] are replayed on every later
/// request. Requests carry browser-like headers and a user agent picked once
/// at construction.
pub struct Client {
    /// Base URL of the storefront. Defaults to [`DEFAULT_BASE_URL`].
    base_url: Url,
    http: reqwest::Client,
    retry: RetryPolicy,
}

impl Client {
    /// Creates a client pointing at the production storefront.
    pub fn new() -> Result<Self, Error> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        let base_url = Url::parse(base_url).map_err(|e| {
            tracing::error!("Invalid base URL {}: {}", base_url, e);
            Error::InvalidUrl(format!("{}: {}", base_url, e))
        })?;
        let http = reqwest::Client::builder()
            .user_agent(get_user_agent())
            .default_headers(default_headers())
            .cookie_store(true)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::ClientBuild(e.to_string())
            })?;
        Ok(Self {
            base_url,
            http,
            retry: RetryPolicy::default(),
        })
    }

    /// Replaces the retry budget.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Resolves a path or absolute URL against the base URL.
    pub fn resolve(&self, path_or_url: &str) -> Result<Url, Error> {
        self.base_url
            .join(path_or_url)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", path_or_url, e)))
    }

    /// Visits the storefront root once to pick up session cookies.
    ///
    /// Failure is logged and otherwise ignored: the crawl still works without
    /// the cookies, only less reliably.
    pub async fn warm_up(&self) {
        tracing::info!("Initializing session against {}", self.base_url);
        match self.fetch_once(&self.base_url).await {
            Ok(page) => tracing::debug!("Warm-up answered with status {}", page.status),
            Err(e) => tracing::warn!("Session warm-up failed: {}", e),
        }
    }

    /// Fetches a page, retrying transient failures within the retry budget.
    ///
    /// Transport errors and non-2xx statuses each consume one attempt. When
    /// the budget is spent the last failure is wrapped in
    /// [`Error::RetriesExhausted`].
    pub async fn fetch(&self, url: &str) -> Result<Page, Error> {
        let target = self.resolve(url)?;
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.fetch_once(&target).await {
                Ok(page) => return Ok(page),
                Err(e) if e.is_transient() && attempt < self.retry.max_attempts => {
                    tracing::debug!(
                        "Attempt {}/{} for {} failed: {}",
                        attempt,
                        self.retry.max_attempts,
                        target,
                        e
                    );
                    if !self.retry.backoff.is_zero() {
                        sleep(self.retry.backoff).await;
                    }
                }
                Err(e) if e.is_transient() => {
                    tracing::warn!("Failed to fetch {}: {}", target, e);
                    return Err(Error::RetriesExhausted {
                        url: target.to_string(),
                        attempts: attempt,
                        last: Box::new(e),
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self, url: &Url) -> Result<Page, Error> {
        let resp = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        let final_url = resp.url().to_string();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = resp.text().await.map_err(|e| Error::Transport {
            url: url.to_string(),
            message: format!("failed to read body: {}", e),
        })?;

        Ok(Page {
            url: final_url,
            status: status.as_u16(),
            html,
        })
    }
}

fn default_headers() -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    h.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("pt-BR,pt;q=0.9,en-US;q=0.8,en;q=0.7"),
    );
    h.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );
    h.insert(header::CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    h.insert("sec-fetch-dest", HeaderValue::from_static("document"));
    h.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
    h.insert("sec-fetch-site", HeaderValue::from_static("none"));
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_relative_and_absolute() {
        let client = Client::with_base_url("https://shop.example.com").unwrap();
        assert_eq!(
            client.resolve("/masculinos/").unwrap().as_str(),
            "https://shop.example.com/masculinos/"
        );
        assert_eq!(
            client.resolve("https://cdn.example.com/a.jpg").unwrap().as_str(),
            "https://cdn.example.com/a.jpg"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            Client::with_base_url("not a url"),
            Err(Error::InvalidUrl(_))
        ));
    }

    #[test]
    fn default_retry_policy() {
        let client = Client::new().unwrap();
        assert_eq!(client.retry_policy(), RetryPolicy::default());
        assert_eq!(client.base_url().as_str(), "https://www.jaessencedelavie.com.br/");
    }
}
