use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use super::client::Transport;
use super::envelope;
use super::{Document, FetchRequest};
use crate::cache::FetchCache;
use crate::errors::{FetchError, TransportError};

pub const DEFAULT_RETRIES: u32 = 4;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 3000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32, delay_ms: u64) -> Self {
        Self {
            retries,
            delay: Duration::from_millis(delay_ms),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.retries + 1
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RETRIES, DEFAULT_RETRY_DELAY_MS)
    }
}

/// Spaces out the attempts of one request
struct Attempts {
    policy: RetryPolicy,
    count: u32,
}

impl Attempts {
    fn new(policy: RetryPolicy) -> Self {
        Self { policy, count: 0 }
    }

    async fn wait(&mut self) {
        if self.should_wait() {
            self.apply_delay().await;
        }
        self.count += 1;
    }

    fn should_wait(&self) -> bool {
        self.count > 0 && !self.policy.delay.is_zero()
    }

    async fn apply_delay(&self) {
        sleep(self.policy.delay).await;
    }

    fn is_exhausted(&self) -> bool {
        self.count >= self.policy.max_attempts()
    }
}

/// The single entry point for network reads: cache first, then bounded retries.
#[derive(Clone)]
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    cache: FetchCache,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(transport: Arc<dyn Transport>, cache: FetchCache, policy: RetryPolicy) -> Self {
        Self {
            transport,
            cache,
            policy,
        }
    }

    pub fn cache(&self) -> &FetchCache {
        &self.cache
    }

    /// Fetch a document, at most once per run for identical requests
    pub async fn fetch(&self, request: &FetchRequest) -> Result<Document, FetchError> {
        let key = request.signature();
        if let Some(document) = self.cache.get(&key) {
            return Ok(document);
        }

        let body = self.fetch_with_retries(request).await?;
        let document = Document::new(request.url.clone(), body);
        self.cache.set(key, document.clone());
        Ok(document)
    }

    /// Fetch an XHR endpoint and unwrap its envelope into HTML fragments
    pub async fn fetch_envelope(&self, request: &FetchRequest) -> Result<Vec<Document>, FetchError> {
        let document = self.fetch(request).await?;
        envelope::open(request, &document)
    }

    async fn fetch_with_retries(&self, request: &FetchRequest) -> Result<String, FetchError> {
        let mut attempts = Attempts::new(self.policy);

        loop {
            attempts.wait().await;
            debug!("Fetching {} (attempt {}/{})", request, attempts.count, self.policy.max_attempts());

            match self.transport.send(request).await {
                Ok(body) => return Ok(body),
                Err(error) => {
                    warn!(
                        "Request {} failed (attempt {}/{}): {}",
                        request,
                        attempts.count,
                        self.policy.max_attempts(),
                        error
                    );
                    if attempts.is_exhausted() {
                        return Err(self.exhausted(request, attempts.count, error));
                    }
                }
            }
        }
    }

    fn exhausted(&self, request: &FetchRequest, attempts: u32, last_error: TransportError) -> FetchError {
        FetchError::Exhausted {
            request: request.clone(),
            attempts,
            last_error,
        }
    }
}
