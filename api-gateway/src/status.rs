//! Backend Status Poller
//!
//! Periodically calls the `status` webhook and records whether the
//! automation backend is reachable. Polls every 10s while connected and
//! backs off to 30s while down (both configurable).

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use toolhub_normalizer::{backend_status, BackendStatus};
use tracing::{debug, info, warn};

use crate::config::StatusPollConfig;
use crate::executor::Executor;
use crate::registry::{Registry, WebhookDefinition};

const STATUS_WEBHOOK: &str = "status";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PollState {
    Unknown,
    Connected,
    Down,
}

/// Last observed backend status
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub state: PollState,
    pub message: String,
    pub checked_at: Option<DateTime<Utc>>,
    pub latency_ms: u64,
    pub consecutive_failures: u32,
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self {
            state: PollState::Unknown,
            message: "Not checked yet".to_string(),
            checked_at: None,
            latency_ms: 0,
            consecutive_failures: 0,
        }
    }
}

/// Shared view of the latest snapshot, read by the HTTP layer
pub type StatusHandle = Arc<RwLock<StatusSnapshot>>;

pub struct StatusPoller {
    executor: Arc<Executor>,
    definition: Option<WebhookDefinition>,
    connected_interval: Duration,
    down_interval: Duration,
    check_timeout: Duration,
    snapshot: StatusHandle,
}

impl StatusPoller {
    pub fn new(executor: Arc<Executor>, registry: &Registry, config: &StatusPollConfig) -> Self {
        Self {
            executor,
            definition: registry.lookup(STATUS_WEBHOOK).cloned(),
            connected_interval: Duration::from_millis(config.connected_interval_ms),
            down_interval: Duration::from_millis(config.down_interval_ms),
            check_timeout: Duration::from_millis(config.check_timeout_ms),
            snapshot: Arc::new(RwLock::new(StatusSnapshot::default())),
        }
    }

    pub fn handle(&self) -> StatusHandle {
        self.snapshot.clone()
    }

    /// Poll the status webhook once and record the outcome
    pub async fn check_once(&self) -> StatusSnapshot {
        let start = Instant::now();
        let outcome = match &self.definition {
            Some(def) => {
                match tokio::time::timeout(self.check_timeout, self.executor.execute(def, &json!({}))).await {
                    Ok(Ok(data)) => backend_status(&data),
                    Ok(Err(e)) => {
                        debug!("Status webhook failed: {e}");
                        BackendStatus::Down {
                            message: "Server down".to_string(),
                        }
                    }
                    Err(_) => BackendStatus::Down {
                        message: "Status check timed out".to_string(),
                    },
                }
            }
            None => BackendStatus::Down {
                message: "Status webhook not registered".to_string(),
            },
        };
        let latency_ms = start.elapsed().as_millis() as u64;

        let mut snapshot = self.snapshot.write().await;
        let was = snapshot.state;
        match outcome {
            BackendStatus::Connected => {
                if was != PollState::Connected {
                    info!("Automation backend is connected");
                }
                snapshot.state = PollState::Connected;
                snapshot.message = "Connected".to_string();
                snapshot.consecutive_failures = 0;
            }
            BackendStatus::Down { message } => {
                snapshot.consecutive_failures += 1;
                if snapshot.consecutive_failures <= 3 {
                    warn!(
                        "Automation backend status check failed (attempt {}): {}",
                        snapshot.consecutive_failures, message
                    );
                }
                snapshot.state = PollState::Down;
                snapshot.message = message;
            }
        }
        snapshot.checked_at = Some(Utc::now());
        snapshot.latency_ms = latency_ms;
        snapshot.clone()
    }

    /// Delay before the next check given the last observed state
    pub fn interval_after(&self, state: PollState) -> Duration {
        match state {
            PollState::Connected => self.connected_interval,
            PollState::Down | PollState::Unknown => self.down_interval,
        }
    }

    /// Run until cancelled. Each check completes before the next delay
    /// starts, so checks never overlap.
    pub async fn run(self, cancel: CancellationToken) {
        loop {
            let state = tokio::select! {
                _ = cancel.cancelled() => break,
                snapshot = self.check_once() => snapshot.state,
            };
            let delay = self.interval_after(state);

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }
        debug!("Status poller shutting down");
    }
}
