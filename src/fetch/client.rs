//! HTTP request client
//!
//! Every attempt is preceded by a pacing delay. Non-success statuses and
//! network errors are retried until the attempt ceiling, after which the
//! caller receives a `FetchError` and skips the URL.

use crate::config::FetchConfig;
use crate::fetch::pacing::PacingPolicy;
use crate::FetchError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;

/// Builds an HTTP client with browser-like default headers
///
/// # Arguments
///
/// * `config` - The fetch configuration (user agent, language, timeout)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(FetchError)` - A header value was rejected or the client failed to build
///
/// # Example
///
/// ```no_run
/// use listing_harvester::config::FetchConfig;
/// use listing_harvester::fetch::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig) -> Result<Client, FetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
    );
    let language =
        HeaderValue::from_str(&config.accept_language).map_err(|e| FetchError::InvalidHeader {
            name: "accept-language",
            message: e.to_string(),
        })?;
    headers.insert(ACCEPT_LANGUAGE, language);

    let client = Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(config.timeout())
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// Fetches product pages with pacing and retries
///
/// The client holds no per-URL state; one instance serves a whole batch.
#[derive(Debug, Clone)]
pub struct RequestClient {
    client: Client,
    pacing: PacingPolicy,
    max_attempts: u32,
}

impl RequestClient {
    /// Creates a client from the fetch configuration
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_http_client(config)?,
            pacing: PacingPolicy::from_config(config),
            max_attempts: config.max_attempts.max(1),
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Fetches a URL and returns the page body
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | Before every attempt | Sleep a randomized pacing delay |
    /// | HTTP 2xx | Return body |
    /// | Any other status | Retry until the ceiling |
    /// | Timeout / connection / body error | Retry until the ceiling |
    /// | Ceiling reached | Return the last `FetchError` |
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            self.pacing.pause().await;

            match self.attempt(url).await {
                Ok(body) => {
                    tracing::debug!("Fetched {} on attempt {}", url, attempt);
                    return Ok(body);
                }
                Err(e) if attempt < self.max_attempts => {
                    tracing::warn!(
                        "Attempt {}/{} failed for {}: {}",
                        attempt,
                        self.max_attempts,
                        url,
                        e
                    );
                }
                Err(e) => {
                    tracing::warn!("Giving up on {} after {} attempts: {}", url, attempt, e);
                    return Err(e);
                }
            }
        }
    }

    /// Performs a single GET without pacing or retries
    async fn attempt(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| classify_error(url, e))
    }
}

/// Maps a reqwest error onto a network failure for the given URL
fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    let message = if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        "Connection refused".to_string()
    } else {
        error.to_string()
    };

    FetchError::Network {
        url: url.to_string(),
        message,
    }
}
