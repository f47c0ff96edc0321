//! HTTP client for upstream predictors, with pacing and a circuit breaker

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{ACCEPT, RETRY_AFTER};
use reqwest::Client;
use tokio::sync::{Mutex, Semaphore};
use tokio::time::sleep;

use crate::config::{CircuitBreakerConfig, UpstreamConfig};
use crate::error::VariantError;

/// Circuit breaker state
#[derive(Debug, Clone, PartialEq)]
pub enum CircuitState {
    Closed,
    Open { opened_at: Instant },
    HalfOpen,
}

/// Raw upstream reply, before interpretation by a predictor
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    /// Parsed `Retry-After` header (seconds form only)
    pub retry_after: Option<Duration>,
    pub body: String,
}

/// Upstream client
///
/// Requests are serialized through a single permit and spaced at least
/// `1 / rate_limit_per_second` apart. Transport errors and 5xx replies count
/// as failures; enough of them open the circuit and further calls fail fast
/// with [`VariantError::UpstreamUnavailable`] until the recovery timeout.
#[derive(Debug)]
pub struct UpstreamHttpClient {
    client: Client,
    permit: Arc<Semaphore>,
    min_interval: Option<Duration>,
    last_request_time: Arc<Mutex<Option<Instant>>>,
    circuit_state: Arc<Mutex<CircuitState>>,
    circuit_config: CircuitBreakerConfig,
    failure_count: Arc<AtomicU32>,
    /// Successes while half-open
    success_count: Arc<AtomicU32>,
    request_count: Arc<AtomicU64>,
}

impl UpstreamHttpClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, VariantError> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("hnf1b-variants/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .deflate(true);

        if let Some(pool) = &config.connection_pool {
            if let Some(max_idle) = pool.max_idle_per_host {
                builder = builder.pool_max_idle_per_host(max_idle);
            }
            if let Some(idle_timeout) = pool.idle_timeout_seconds {
                builder = builder.pool_idle_timeout(Duration::from_secs(idle_timeout));
            }
            if let Some(keep_alive) = pool.keep_alive_seconds {
                builder = builder.tcp_keepalive(Duration::from_secs(keep_alive));
            }
        }

        let client = builder.build().map_err(|e| VariantError::Config {
            msg: format!("failed to create HTTP client: {}", e),
        })?;

        Ok(Self {
            client,
            permit: Arc::new(Semaphore::new(1)),
            min_interval: config.min_interval(),
            last_request_time: Arc::new(Mutex::new(None)),
            circuit_state: Arc::new(Mutex::new(CircuitState::Closed)),
            circuit_config: config.circuit_breaker.clone().unwrap_or_default(),
            failure_count: Arc::new(AtomicU32::new(0)),
            success_count: Arc::new(AtomicU32::new(0)),
            request_count: Arc::new(AtomicU64::new(0)),
        })
    }

    /// GET a JSON resource
    pub async fn get_json(&self, url: &str) -> Result<UpstreamResponse, VariantError> {
        self.check_circuit_breaker().await?;

        let _permit = self
            .permit
            .acquire()
            .await
            .map_err(|e| VariantError::upstream(format!("request gate closed: {}", e)))?;

        if let Some(interval) = self.min_interval {
            let mut last_time = self.last_request_time.lock().await;
            if let Some(last) = *last_time {
                let elapsed = last.elapsed();
                if elapsed < interval {
                    sleep(interval - elapsed).await;
                }
            }
            *last_time = Some(Instant::now());
        }

        self.request_count.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("GET {}", url);
        let response = match self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                self.record_failure().await;
                return Err(VariantError::upstream(format!("request to {} failed: {}", url, e)));
            }
        };

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after);

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                self.record_failure().await;
                return Err(VariantError::upstream(format!(
                    "failed to read response from {}: {}",
                    url, e
                )));
            }
        };

        if status >= 500 {
            self.record_failure().await;
        } else if status != 429 {
            self.record_success().await;
        }

        Ok(UpstreamResponse {
            status,
            retry_after,
            body,
        })
    }

    async fn check_circuit_breaker(&self) -> Result<(), VariantError> {
        let mut state = self.circuit_state.lock().await;

        match *state {
            CircuitState::Closed | CircuitState::HalfOpen => Ok(()),
            CircuitState::Open { opened_at } => {
                let recovery_timeout =
                    Duration::from_secs(self.circuit_config.recovery_timeout_seconds.unwrap_or(60));

                if opened_at.elapsed() >= recovery_timeout {
                    *state = CircuitState::HalfOpen;
                    self.success_count.store(0, Ordering::Relaxed);
                    tracing::info!("Circuit breaker transitioning to half-open state");
                    Ok(())
                } else {
                    Err(VariantError::upstream(format!(
                        "circuit breaker open; retrying in {}s",
                        recovery_timeout.saturating_sub(opened_at.elapsed()).as_secs()
                    )))
                }
            }
        }
    }

    async fn record_success(&self) {
        let mut state = self.circuit_state.lock().await;

        match *state {
            CircuitState::Closed => {
                self.failure_count.store(0, Ordering::Relaxed);
            }
            CircuitState::HalfOpen => {
                let success_count = self.success_count.fetch_add(1, Ordering::Relaxed) + 1;
                let success_threshold = self.circuit_config.success_threshold.unwrap_or(3);

                if success_count >= success_threshold {
                    *state = CircuitState::Closed;
                    self.failure_count.store(0, Ordering::Relaxed);
                    self.success_count.store(0, Ordering::Relaxed);
                    tracing::info!(
                        "Circuit breaker closed after {} successful requests",
                        success_count
                    );
                }
            }
            CircuitState::Open { .. } => {
                *state = CircuitState::Closed;
                self.failure_count.store(0, Ordering::Relaxed);
            }
        }
    }

    async fn record_failure(&self) {
        let failure_count = self.failure_count.fetch_add(1, Ordering::Relaxed) + 1;
        let failure_threshold = self.circuit_config.failure_threshold.unwrap_or(5);

        let mut state = self.circuit_state.lock().await;
        match *state {
            // a failed trial request reopens immediately
            CircuitState::HalfOpen => {
                *state = CircuitState::Open {
                    opened_at: Instant::now(),
                };
                tracing::warn!("Circuit breaker reopened after failed trial request");
            }
            CircuitState::Closed if failure_count >= failure_threshold => {
                *state = CircuitState::Open {
                    opened_at: Instant::now(),
                };
                tracing::warn!("Circuit breaker opened after {} failures", failure_count);
            }
            _ => {}
        }
    }

    /// Current circuit breaker state
    pub async fn circuit_state(&self) -> CircuitState {
        self.circuit_state.lock().await.clone()
    }

    /// Total requests sent upstream
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }
}

/// `Retry-After` in seconds; HTTP dates and out-of-range values are ignored
fn parse_retry_after(value: &str) -> Option<Duration> {
    let secs = value.trim().parse::<f64>().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(parse_retry_after("2"), Some(Duration::from_secs(2)));
        assert_eq!(parse_retry_after(" 0.5 "), Some(Duration::from_millis(500)));
        assert_eq!(parse_retry_after("1e30"), None);
        assert_eq!(parse_retry_after("-1"), None);
        assert_eq!(parse_retry_after("NaN"), None);
        assert_eq!(parse_retry_after("inf"), None);
        assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
    }

    fn unreachable_config(failure_threshold: u32) -> UpstreamConfig {
        UpstreamConfig {
            timeout_seconds: 2,
            rate_limit_per_second: 0,
            circuit_breaker: Some(CircuitBreakerConfig {
                failure_threshold: Some(failure_threshold),
                recovery_timeout_seconds: Some(60),
                success_threshold: Some(1),
            }),
            ..UpstreamConfig::default()
        }
    }

    #[tokio::test]
    async fn test_circuit_opens_after_failures() {
        let client = UpstreamHttpClient::new(&unreachable_config(2)).unwrap();
        // nothing listens on the discard port
        let url = "http://127.0.0.1:9/info/software";

        for _ in 0..2 {
            let err = client.get_json(url).await.unwrap_err();
            assert!(matches!(err, VariantError::UpstreamUnavailable { .. }));
        }
        assert!(matches!(
            client.circuit_state().await,
            CircuitState::Open { .. }
        ));

        let err = client.get_json(url).await.unwrap_err();
        assert!(err.to_string().contains("circuit breaker open"));
        // fast failure does not reach the network
        assert_eq!(client.request_count(), 2);
    }

    #[tokio::test]
    async fn test_new_client_is_closed() {
        let client = UpstreamHttpClient::new(&UpstreamConfig::default()).unwrap();
        assert_eq!(client.circuit_state().await, CircuitState::Closed);
        assert_eq!(client.request_count(), 0);
    }
}
