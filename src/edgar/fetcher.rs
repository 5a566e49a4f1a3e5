// src/edgar/fetcher.rs
use crate::utils::error::EdgarError;
use reqwest::{header, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::time::sleep;

// IMPORTANT: Replace with your actual details or pass --user-agent
const DEFAULT_USER_AGENT: &str = "sec_subsidiaries research admin@example.com";
// SEC asks for 10 requests/second max. Be conservative. >100ms delay.
const DEFAULT_REQUEST_DELAY_MS: u64 = 150;
// Backoff doubling stops here; waits past 2^20 * base are pointless anyway.
const MAX_BACKOFF_EXPONENT: u32 = 20;

/// Courtesy delays applied at the three pacing boundaries of a batch run:
/// before every request, between years of one company, and between
/// companies. The fetcher consults the request level; the pipeline consults
/// the other two. Tests substitute [`RatePolicy::zero`].
#[derive(Debug, Clone)]
pub struct RatePolicy {
    pub request_delay: Duration,
    pub year_delay: Duration,
    pub company_delay: Duration,
}

impl Default for RatePolicy {
    fn default() -> Self {
        Self {
            request_delay: Duration::from_millis(DEFAULT_REQUEST_DELAY_MS),
            year_delay: Duration::from_secs(1),
            company_delay: Duration::from_secs(2),
        }
    }
}

impl RatePolicy {
    /// No delays at any level. For tests.
    pub fn zero() -> Self {
        Self {
            request_delay: Duration::ZERO,
            year_delay: Duration::ZERO,
            company_delay: Duration::ZERO,
        }
    }

    pub async fn before_request(&self) {
        sleep(self.request_delay).await;
    }

    pub async fn between_years(&self) {
        sleep(self.year_delay).await;
    }

    pub async fn between_companies(&self) {
        sleep(self.company_delay).await;
    }
}

/// Explicit fetcher configuration instead of process-wide globals, so tests
/// can shrink the waits to milliseconds.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// SEC requires an identifying User-Agent on every request.
    pub user_agent: String,
    /// Total attempt budget per URL, shared by 429, 403 and transport retries.
    pub max_attempts: u32,
    /// Base wait for the exponential backoff: `initial_backoff * 2^attempt`.
    pub initial_backoff: Duration,
    /// Fixed cooldown after a 403. EDGAR uses 403 for transient blocking,
    /// not true rejection, so it gets a flat wait rather than the curve.
    pub forbidden_cooldown: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_attempts: 5,
            initial_backoff: Duration::from_secs(1),
            forbidden_cooldown: Duration::from_secs(10),
        }
    }
}

/// HTTP layer for all EDGAR interaction: identifying headers, retry with
/// backoff, and the per-request courtesy delay. No response caching; every
/// call is a live request.
pub struct EdgarFetcher {
    client: reqwest::Client,
    config: FetchConfig,
    rate: RatePolicy,
}

impl EdgarFetcher {
    pub fn new(config: FetchConfig, rate: RatePolicy) -> Result<Self, EdgarError> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self { client, config, rate })
    }

    /// GET a URL and return the response body as text.
    pub async fn fetch_text(&self, url: &str) -> Result<String, EdgarError> {
        let response = self.fetch(url).await?;
        let body = response.text().await?;
        tracing::debug!("Downloaded {} bytes from {}", body.len(), url);
        Ok(body)
    }

    /// GET a URL and deserialize the JSON response body.
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, EdgarError> {
        let response = self.fetch(url).await?;
        Ok(response.json::<T>().await?)
    }

    /// Issues the request, retrying on 429 (exponential backoff), 403 (fixed
    /// cooldown) and transport errors until the attempt budget runs out.
    /// Other non-success statuses fail immediately; callers treat every
    /// failure the same as "data absent".
    async fn fetch(&self, url: &str) -> Result<reqwest::Response, EdgarError> {
        for attempt in 0..self.config.max_attempts {
            self.rate.before_request().await;

            let outcome = self
                .client
                .get(url)
                // SEC serves JSON indexes and HTML filings from the same hosts
                .header(header::ACCEPT, "application/json,text/html,text/plain,*/*")
                .send()
                .await;

            match outcome {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }
                    match status {
                        StatusCode::TOO_MANY_REQUESTS => {
                            let wait = self.backoff(attempt);
                            tracing::warn!(
                                "429 from {} (attempt {}), backing off {:?}",
                                url, attempt + 1, wait
                            );
                            sleep(wait).await;
                        }
                        StatusCode::FORBIDDEN => {
                            tracing::warn!(
                                "403 from {} (attempt {}), cooling down {:?} - check User-Agent",
                                url, attempt + 1, self.config.forbidden_cooldown
                            );
                            sleep(self.config.forbidden_cooldown).await;
                        }
                        _ => {
                            tracing::error!("HTTP error status: {} for URL: {}", status, url);
                            return Err(EdgarError::Http(status));
                        }
                    }
                }
                Err(err) => {
                    if attempt + 1 >= self.config.max_attempts {
                        return Err(err.into());
                    }
                    let wait = self.backoff(attempt);
                    tracing::warn!(
                        "Transport error for {} (attempt {}): {}, retrying in {:?}",
                        url, attempt + 1, err, wait
                    );
                    sleep(wait).await;
                }
            }
        }

        Err(EdgarError::RetriesExhausted(url.to_string()))
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.min(MAX_BACKOFF_EXPONENT));
        self.config.initial_backoff.saturating_mul(factor)
    }
}
