// SPDX-License-Identifier: MIT
//! Timed, error-absorbing invocation of a single adapter.
//!
//! A `ProviderWrapper` owns exactly one adapter and that adapter's mutable
//! [`ProviderStatus`]. Every fault — vendor error, unsupported operation,
//! blown deadline — is absorbed into a [`WrapperOutcome`] so the chain above
//! branches on a boolean, never on error control flow.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::providers::adapter::{AdapterError, SharedAdapter};
use crate::providers::status::ProviderStatus;

/// Default per-attempt deadline. A provider that hangs past this is treated
/// as a failed attempt so fallback can proceed.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(30);

// ─── Options & outcome ────────────────────────────────────────────────────────

/// Construction-time knobs for a [`ProviderWrapper`].
#[derive(Debug, Clone)]
pub struct WrapperOptions {
    /// Simulate calls instead of performing them.
    pub dry_run: bool,
    /// Per-attempt deadline. `None` disables the deadline entirely.
    pub attempt_timeout: Option<Duration>,
    /// Consecutive successes required for promotion to Healthy.
    pub success_threshold: u32,
    /// Consecutive failures required for demotion to Unhealthy.
    pub failure_threshold: u32,
}

impl Default for WrapperOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            attempt_timeout: Some(DEFAULT_ATTEMPT_TIMEOUT),
            success_threshold: crate::providers::status::DEFAULT_SUCCESS_THRESHOLD,
            failure_threshold: crate::providers::status::DEFAULT_FAILURE_THRESHOLD,
        }
    }
}

/// Result of one wrapper invocation. Never an error.
#[derive(Debug, Clone)]
pub struct WrapperOutcome {
    pub success: bool,
    pub result: Option<Value>,
    pub error: Option<String>,
}

impl WrapperOutcome {
    fn ok(result: Option<Value>) -> Self {
        Self {
            success: true,
            result,
            error: None,
        }
    }

    fn failed(error: String) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error),
        }
    }
}

// ─── ProviderWrapper ──────────────────────────────────────────────────────────

/// One adapter plus its owned health record.
///
/// The status is only ever mutated by this wrapper. Concurrent invocations
/// may interleave writes; that is acceptable because health is advisory, not
/// a correctness gate.
pub struct ProviderWrapper {
    adapter: SharedAdapter,
    name: String,
    status: RwLock<ProviderStatus>,
    dry_run: bool,
    attempt_timeout: Option<Duration>,
}

impl ProviderWrapper {
    /// Wrap an adapter with default options.
    pub fn new(adapter: SharedAdapter) -> Self {
        Self::with_options(adapter, WrapperOptions::default())
    }

    /// Wrap an adapter with explicit options.
    pub fn with_options(adapter: SharedAdapter, options: WrapperOptions) -> Self {
        let name = adapter.name().to_string();
        Self {
            adapter,
            name,
            status: RwLock::new(ProviderStatus::with_thresholds(
                options.success_threshold,
                options.failure_threshold,
            )),
            dry_run: options.dry_run,
            attempt_timeout: options.attempt_timeout,
        }
    }

    /// Stable provider name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The wrapped adapter (used by the self-check prober).
    pub fn adapter(&self) -> &SharedAdapter {
        &self.adapter
    }

    /// Snapshot of the current status record.
    pub async fn status(&self) -> ProviderStatus {
        self.status.read().await.clone()
    }

    /// Invoke a named operation on the wrapped adapter.
    ///
    /// Dry-run mode returns success immediately without calling the vendor;
    /// the provider is marked Healthy but the streaks are untouched.
    pub async fn invoke(&self, operation: &str, params: Value) -> WrapperOutcome {
        if self.dry_run || self.adapter.dry_run() {
            debug!(
                provider = %self.name,
                operation,
                "dry-run: simulated provider call"
            );
            self.status.write().await.mark_healthy();
            return WrapperOutcome::ok(None);
        }

        let start = Instant::now();
        let call = self.adapter.invoke(operation, params);
        let outcome = match self.attempt_timeout {
            Some(deadline) => match tokio::time::timeout(deadline, call).await {
                Ok(result) => result,
                Err(_) => Err(AdapterError::Timeout(deadline.as_millis() as u64)),
            },
            None => call.await,
        };
        let latency_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(value) => {
                self.status.write().await.record_success(latency_ms);
                info!(
                    provider = %self.name,
                    operation,
                    latency_ms,
                    "provider call succeeded"
                );
                WrapperOutcome::ok(Some(value))
            }
            Err(err) => {
                let message = err.status_message();
                self.status.write().await.record_failure(message.clone());
                warn!(
                    provider = %self.name,
                    operation,
                    latency_ms,
                    error = %message,
                    "provider call failed"
                );
                WrapperOutcome::failed(message)
            }
        }
    }
}

impl std::fmt::Debug for ProviderWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderWrapper")
            .field("name", &self.name)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

/// Shared wrapper handle, as stored by chains.
pub type SharedProviderWrapper = Arc<ProviderWrapper>;

// ─── Tests ────────────────────────────────────────────────────────────────────
