use async_trait::async_trait;
use lyricscroll_core::{ContentFetcher, CoreError, NetworkConfig};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use std::time::Duration;
use tracing::{debug, warn};

const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Fetches lyric files over HTTP(S) with timeouts and retries on transient failures
pub struct HttpFetcher {
    client: ClientWithMiddleware,
}

impl HttpFetcher {
    /// Create a fetcher using the timeout and retry budget from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &NetworkConfig) -> Result<Self, CoreError> {
        // Base client with timeout
        let base_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .user_agent(concat!("lyricscroll/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CoreError::Configuration {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        // Wrap with retry middleware (exponential backoff)
        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(base_client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self { client })
    }
}

fn fetch_error(url: &str, reason: String) -> CoreError {
    CoreError::Fetch {
        url: url.to_string(),
        reason,
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    fn name(&self) -> &'static str {
        "http"
    }

    /// A charset declared in the response's `Content-Type` takes precedence
    /// over `charset`.
    async fn fetch(&self, url: &str, charset: &str) -> Result<String, CoreError> {
        debug!("GET {url}");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!("{url} returned status: {status}");
            return Err(fetch_error(url, format!("status {status}")));
        }

        response
            .text_with_charset(charset)
            .await
            .map_err(|e| fetch_error(url, e.to_string()))
    }
}
