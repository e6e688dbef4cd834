// SPDX-License-Identifier: MIT
//! Per-provider health bookkeeping.
//!
//! Health is advisory: it reorders fallback attempts but never blocks one.
//! The state machine is streak-driven and has no terminal state:
//!
//! ```text
//! Unknown ──(any result)──► Degraded ──(success streak ≥ 5)──► Healthy
//!    ▲                          ▲  │
//!    │                          │  └──(failure streak ≥ 3)──► Unhealthy
//!    └── fresh status           └──────────(any success)──────────┘
//! ```
//!
//! A success always zeroes the failure streak and vice versa, so health is a
//! pure function of the current streaks once any observation exists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Consecutive successes required before a provider is promoted to Healthy.
pub const DEFAULT_SUCCESS_THRESHOLD: u32 = 5;
/// Consecutive failures required before a provider is demoted to Unhealthy.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;

// Latency EMA weights: avg' = 0.7·avg + 0.3·sample, seeded with the first sample.
const EMA_OLD_WEIGHT: f64 = 0.7;
const EMA_NEW_WEIGHT: f64 = 0.3;

// ─── ProviderHealth ───────────────────────────────────────────────────────────

/// Advisory health classification for one provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderHealth {
    /// No observation recorded yet.
    Unknown,
    /// Observed, but neither streak threshold has been crossed.
    Degraded,
    /// Success streak crossed the promotion threshold.
    Healthy,
    /// Failure streak crossed the demotion threshold.
    Unhealthy,
}

impl ProviderHealth {
    /// Fallback-ordering priority: Healthy providers are attempted first,
    /// Unknown ones last.
    pub fn priority(&self) -> u8 {
        match self {
            ProviderHealth::Healthy => 3,
            ProviderHealth::Degraded => 2,
            ProviderHealth::Unhealthy => 1,
            ProviderHealth::Unknown => 0,
        }
    }
}

impl std::fmt::Display for ProviderHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderHealth::Unknown => write!(f, "unknown"),
            ProviderHealth::Degraded => write!(f, "degraded"),
            ProviderHealth::Healthy => write!(f, "healthy"),
            ProviderHealth::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

// ─── ProviderStatus ───────────────────────────────────────────────────────────

fn default_success_threshold() -> u32 {
    DEFAULT_SUCCESS_THRESHOLD
}

fn default_failure_threshold() -> u32 {
    DEFAULT_FAILURE_THRESHOLD
}

/// Mutable health record owned by exactly one `ProviderWrapper`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub health: ProviderHealth,
    pub last_check_time: Option<DateTime<Utc>>,
    pub last_success_time: Option<DateTime<Utc>>,
    pub last_failure_time: Option<DateTime<Utc>>,
    pub consecutive_successes: u32,
    pub consecutive_failures: u32,
    /// Latency of the most recent successful call.
    pub latency_ms: Option<u64>,
    /// Exponential moving average over observed latencies.
    pub avg_latency_ms: Option<f64>,
    /// `"<Kind>: <message>"` from the most recent failure.
    pub error_message: Option<String>,

    #[serde(skip, default = "default_success_threshold")]
    success_threshold: u32,
    #[serde(skip, default = "default_failure_threshold")]
    failure_threshold: u32,
}

impl ProviderStatus {
    /// Fresh status with the default streak thresholds.
    pub fn new() -> Self {
        Self::with_thresholds(DEFAULT_SUCCESS_THRESHOLD, DEFAULT_FAILURE_THRESHOLD)
    }

    /// Fresh status with custom streak thresholds.
    pub fn with_thresholds(success_threshold: u32, failure_threshold: u32) -> Self {
        Self {
            health: ProviderHealth::Unknown,
            last_check_time: None,
            last_success_time: None,
            last_failure_time: None,
            consecutive_successes: 0,
            consecutive_failures: 0,
            latency_ms: None,
            avg_latency_ms: None,
            error_message: None,
            success_threshold: success_threshold.max(1),
            failure_threshold: failure_threshold.max(1),
        }
    }

    /// Record a successful call observed at `latency_ms`.
    pub fn record_success(&mut self, latency_ms: u64) {
        let now = Utc::now();
        self.last_check_time = Some(now);
        self.last_success_time = Some(now);
        self.consecutive_successes += 1;
        self.consecutive_failures = 0;
        self.latency_ms = Some(latency_ms);
        self.avg_latency_ms = Some(match self.avg_latency_ms {
            Some(avg) => EMA_OLD_WEIGHT * avg + EMA_NEW_WEIGHT * latency_ms as f64,
            None => latency_ms as f64,
        });
        self.error_message = None;
        self.recompute_health();
    }

    /// Record a failed call with its `"<Kind>: <message>"` description.
    pub fn record_failure(&mut self, error: String) {
        let now = Utc::now();
        self.last_check_time = Some(now);
        self.last_failure_time = Some(now);
        self.consecutive_failures += 1;
        self.consecutive_successes = 0;
        self.error_message = Some(error);
        self.recompute_health();
    }

    /// Dry-run path: mark Healthy without touching the streaks.
    pub fn mark_healthy(&mut self) {
        self.last_check_time = Some(Utc::now());
        self.health = ProviderHealth::Healthy;
    }

    /// Sort key for missing-latency-sorts-worst ordering.
    pub fn latency_sort_key(&self) -> u64 {
        self.latency_ms.unwrap_or(u64::MAX)
    }

    fn recompute_health(&mut self) {
        self.health = if self.consecutive_successes >= self.success_threshold {
            ProviderHealth::Healthy
        } else if self.consecutive_failures >= self.failure_threshold {
            ProviderHealth::Unhealthy
        } else {
            ProviderHealth::Degraded
        };
    }
}

impl Default for ProviderStatus {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn healthy_only_at_success_threshold() {
        let mut status = ProviderStatus::new();
        for n in 1..=10u32 {
            status.record_success(20);
            assert_eq!(status.consecutive_successes, n);
            if n >= DEFAULT_SUCCESS_THRESHOLD {
                assert_eq!(status.health, ProviderHealth::Healthy, "at streak {n}");
            } else {
                assert_eq!(status.health, ProviderHealth::Degraded, "at streak {n}");
            }
        }
    }

    #[test]
    fn unhealthy_only_at_failure_threshold() {
        let mut status = ProviderStatus::new();
        for n in 1..=6u32 {
            status.record_failure("Invocation: boom".to_string());
            assert_eq!(status.consecutive_failures, n);
            if n >= DEFAULT_FAILURE_THRESHOLD {
                assert_eq!(status.health, ProviderHealth::Unhealthy, "at streak {n}");
            } else {
                assert_eq!(status.health, ProviderHealth::Degraded, "at streak {n}");
            }
        }
    }

    #[test]
    fn success_resets_failure_streak() {
        let mut status = ProviderStatus::new();
        for _ in 0..5 {
            status.record_failure("Invocation: boom".to_string());
        }
        assert_eq!(status.health, ProviderHealth::Unhealthy);

        status.record_success(12);
        assert_eq!(status.consecutive_failures, 0);
        assert_eq!(status.consecutive_successes, 1);
        // Any success leaves Unhealthy for Degraded, never straight to Healthy.
        assert_eq!(status.health, ProviderHealth::Degraded);
        assert!(status.error_message.is_none());
    }

    #[test]
    fn failure_resets_success_streak() {
        let mut status = ProviderStatus::new();
        for _ in 0..7 {
            status.record_success(8);
        }
        assert_eq!(status.health, ProviderHealth::Healthy);

        status.record_failure("Timeout: attempt exceeded the 100 ms deadline".to_string());
        assert_eq!(status.consecutive_successes, 0);
        assert_eq!(status.consecutive_failures, 1);
        assert_eq!(status.health, ProviderHealth::Degraded);
    }

    #[test]
    fn ema_seeds_then_smooths() {
        let mut status = ProviderStatus::new();
        status.record_success(100);
        assert_eq!(status.avg_latency_ms, Some(100.0));

        status.record_success(200);
        // 0.7·100 + 0.3·200 = 130
        let avg = status.avg_latency_ms.unwrap();
        assert!((avg - 130.0).abs() < 1e-9, "avg was {avg}");
    }

    #[test]
    fn mark_healthy_leaves_streaks_alone() {
        let mut status = ProviderStatus::new();
        status.record_failure("Invocation: boom".to_string());
        status.mark_healthy();
        assert_eq!(status.health, ProviderHealth::Healthy);
        assert_eq!(status.consecutive_failures, 1);
    }

    #[test]
    fn custom_thresholds_respected() {
        let mut status = ProviderStatus::with_thresholds(2, 1);
        status.record_success(5);
        assert_eq!(status.health, ProviderHealth::Degraded);
        status.record_success(5);
        assert_eq!(status.health, ProviderHealth::Healthy);
        status.record_failure("Invocation: boom".to_string());
        assert_eq!(status.health, ProviderHealth::Unhealthy);
    }

    proptest! {
        /// Health is always the pure streak function, whatever the outcome
        /// sequence: Healthy iff the tail success streak ≥ 5, Unhealthy iff
        /// the tail failure streak ≥ 3, Degraded otherwise.
        #[test]
        fn health_matches_tail_streak(outcomes in proptest::collection::vec(any::<bool>(), 1..60)) {
            let mut status = ProviderStatus::new();
            for &ok in &outcomes {
                if ok {
                    status.record_success(10);
                } else {
                    status.record_failure("Invocation: boom".to_string());
                }
            }

            let last = *outcomes.last().unwrap();
            let tail = outcomes.iter().rev().take_while(|&&o| o == last).count() as u32;

            if last {
                prop_assert_eq!(status.consecutive_successes, tail);
                prop_assert_eq!(status.consecutive_failures, 0);
                let expected = if tail >= DEFAULT_SUCCESS_THRESHOLD {
                    ProviderHealth::Healthy
                } else {
                    ProviderHealth::Degraded
                };
                prop_assert_eq!(status.health, expected);
            } else {
                prop_assert_eq!(status.consecutive_failures, tail);
                prop_assert_eq!(status.consecutive_successes, 0);
                let expected = if tail >= DEFAULT_FAILURE_THRESHOLD {
                    ProviderHealth::Unhealthy
                } else {
                    ProviderHealth::Degraded
                };
                prop_assert_eq!(status.health, expected);
            }
        }
    }
}
