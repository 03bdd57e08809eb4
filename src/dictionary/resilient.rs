//! Timeout and retry around a dictionary service.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::epa::Role;
use crate::error::{ActError, ActResult};

use super::{DictionaryService, Term};

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);

/// Default number of retries after the first attempt.
pub const DEFAULT_RETRIES: u32 = 1;

/// Largest retry budget a wrapper accepts; larger requests are clamped.
pub const MAX_RETRIES: u32 = 5;

/// Base delay between attempts, doubled each retry.
const DEFAULT_BACKOFF: Duration = Duration::from_millis(50);

/// Ceiling on any single backoff delay.
const MAX_BACKOFF: Duration = Duration::from_secs(2);

/// Wraps a [`DictionaryService`] with a bounded timeout and retry budget.
///
/// Only `ExternalServiceUnavailable` and timeouts are retried; every other
/// error (notably `NotFound`) is returned on the first attempt.
#[derive(Debug, Clone)]
pub struct ResilientDictionary {
    inner: Arc<dyn DictionaryService>,
    timeout: Duration,
    retries: u32,
    backoff: Duration,
}

impl ResilientDictionary {
    pub fn new(inner: Arc<dyn DictionaryService>) -> Self {
        Self {
            inner,
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
            backoff: DEFAULT_BACKOFF,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        if retries > MAX_RETRIES {
            log::warn!(
                "Dictionary retry budget {} clamped to {}",
                retries,
                MAX_RETRIES
            );
        }
        self.retries = retries.min(MAX_RETRIES);
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Delay before retry number `attempt + 1`.
    fn delay(&self, attempt: u32) -> Duration {
        self.backoff
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(MAX_BACKOFF)
    }

    async fn call<T, F, Fut>(&self, what: &str, operation: F) -> ActResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = ActResult<T>>,
    {
        let mut last_error = None;
        for attempt in 0..=self.retries {
            match tokio::time::timeout(self.timeout, operation()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) if !e.is_retryable() => return Err(e),
                Ok(Err(e)) => last_error = Some(e),
                Err(_) => {
                    last_error = Some(ActError::ExternalServiceUnavailable(format!(
                        "dictionary {} timed out after {} ms",
                        what,
                        self.timeout.as_millis()
                    )));
                }
            }
            if attempt < self.retries {
                log::warn!(
                    "Dictionary {} failed (attempt {}/{}), retrying",
                    what,
                    attempt + 1,
                    self.retries + 1
                );
                tokio::time::sleep(self.delay(attempt)).await;
            }
        }
        Err(last_error.unwrap_or_else(|| {
            ActError::ExternalServiceUnavailable(format!("dictionary {} failed", what))
        }))
    }
}

#[async_trait]
impl DictionaryService for ResilientDictionary {
    async fn lookup(&self, label: &str, role: Role, dictionary: &str) -> ActResult<Term> {
        self.call("lookup", || self.inner.lookup(label, role, dictionary))
            .await
    }

    async fn search(&self, dictionary: &str, query: Option<&str>) -> ActResult<Vec<String>> {
        self.call("search", || self.inner.search(dictionary, query))
            .await
    }

    async fn entries(&self, role: Role, dictionary: &str) -> ActResult<Vec<Term>> {
        self.call("entries", || self.inner.entries(role, dictionary))
            .await
    }

    async fn dictionaries(&self) -> ActResult<Vec<String>> {
        self.call("listing", || self.inner.dictionaries()).await
    }
}
