use anyhow::Result;
use log::{info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Breaker key for the sunrise-sunset API.
pub const SOLAR_API_SERVICE: &str = "sunrise_sunset_api";

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub success_threshold: u32,
    pub timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 3,
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    failure_count: u32,
    success_count: u32,
    opened_at: Option<Instant>,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerInner>,
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerStats {
    pub state: CircuitState,
    pub failure_count: u32,
    pub success_count: u32,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                failure_count: 0,
                success_count: 0,
                opened_at: None,
            }),
        }
    }

    pub async fn execute<F, T, Fut>(&self, operation: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        self.before_call().await?;

        let result = operation().await;
        match &result {
            Ok(_) => self.on_success().await,
            Err(_) => self.on_failure().await,
        }
        result
    }

    async fn before_call(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.state != CircuitState::Open {
            return Ok(());
        }

        let cooled_down = inner
            .opened_at
            .map(|at| at.elapsed() > self.config.timeout)
            .unwrap_or(true);
        if cooled_down {
            inner.state = CircuitState::HalfOpen;
            inner.success_count = 0;
            info!("Circuit breaker transitioning to half-open after timeout");
            Ok(())
        } else {
            Err(anyhow::anyhow!("Circuit breaker is open"))
        }
    }

    async fn on_success(&self) {
        let mut inner = self.inner.lock().await;
        match inner.state {
            CircuitState::HalfOpen => {
                inner.success_count += 1;
                if inner.success_count >= self.config.success_threshold {
                    inner.state = CircuitState::Closed;
                    inner.failure_count = 0;
                    info!("Circuit breaker closing after {} successful calls", inner.success_count);
                }
            }
            CircuitState::Closed | CircuitState::Open => {
                inner.state = CircuitState::Closed;
                inner.failure_count = 0;
            }
        }
    }

    async fn on_failure(&self) {
        let mut inner = self.inner.lock().await;
        inner.failure_count += 1;

        let trip = match inner.state {
            // One failed trial call is enough to reopen
            CircuitState::HalfOpen => true,
            CircuitState::Closed => inner.failure_count >= self.config.failure_threshold,
            CircuitState::Open => false,
        };
        if trip {
            inner.state = CircuitState::Open;
            inner.opened_at = Some(Instant::now());
            warn!("Circuit breaker opening after {} failures", inner.failure_count);
        }
    }

    pub async fn get_state(&self) -> CircuitState {
        self.inner.lock().await.state
    }

    pub async fn get_stats(&self) -> CircuitBreakerStats {
        let inner = self.inner.lock().await;
        CircuitBreakerStats {
            state: inner.state,
            failure_count: inner.failure_count,
            success_count: inner.success_count,
        }
    }
}

/// Per-service breakers, created on first use.
#[derive(Default)]
pub struct CircuitBreakerRegistry {
    breakers: Mutex<HashMap<String, Arc<CircuitBreaker>>>,
}

impl CircuitBreakerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_breaker(&self, service_name: &str) -> Arc<CircuitBreaker> {
        let mut breakers = self.breakers.lock().await;
        breakers
            .entry(service_name.to_string())
            .or_insert_with(|| {
                let config = match service_name {
                    SOLAR_API_SERVICE => CircuitBreakerConfig {
                        failure_threshold: 3,
                        success_threshold: 1,
                        timeout: Duration::from_secs(30),
                    },
                    _ => CircuitBreakerConfig::default(),
                };
                info!("Created circuit breaker for service: {}", service_name);
                Arc::new(CircuitBreaker::new(config))
            })
            .clone()
    }

    pub async fn get_all_stats(&self) -> HashMap<String, CircuitBreakerStats> {
        let breakers = self.breakers.lock().await;
        let mut stats = HashMap::new();
        for (service_name, breaker) in breakers.iter() {
            stats.insert(service_name.clone(), breaker.get_stats().await);
        }
        stats
    }
}

lazy_static::lazy_static! {
    pub static ref CIRCUIT_BREAKER_REGISTRY: CircuitBreakerRegistry = CircuitBreakerRegistry::new();
}

pub async fn get_circuit_breaker(service_name: &str) -> Arc<CircuitBreaker> {
    CIRCUIT_BREAKER_REGISTRY.get_breaker(service_name).await
}
