// SPDX-License-Identifier: MIT
//! Health-check history and operator recommendations.
//!
//! History is bounded per `"<capability>:<provider>"` key — oldest entries
//! are evicted at [`HISTORY_CAP`]. Recommendations are replace-only: at most
//! one active recommendation per provider, so dashboards show the current
//! action, not an audit trail.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::providers::status::ProviderHealth;

/// Maximum retained health-check results per provider key.
pub const HISTORY_CAP: usize = 100;

// The status report surfaces only the most recently checked keys.
const REPORT_TOP_KEYS: usize = 5;
const DEFAULT_HISTORY_LIMIT: usize = 10;

// ─── HealthCheckResult ────────────────────────────────────────────────────────

/// Immutable snapshot of one invocation attempt or self-check probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub provider_name: String,
    pub capability: String,
    /// RFC 3339 timestamp, stable across serialization round-trips.
    pub timestamp: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, Value>,
}

impl HealthCheckResult {
    /// Successful probe result stamped now.
    pub fn ok(provider_name: impl Into<String>, capability: impl Into<String>) -> Self {
        Self {
            provider_name: provider_name.into(),
            capability: capability.into(),
            timestamp: Utc::now().to_rfc3339(),
            success: true,
            latency_ms: None,
            error_message: None,
            metadata: serde_json::Map::new(),
        }
    }

    /// Failed probe result stamped now.
    pub fn failed(
        provider_name: impl Into<String>,
        capability: impl Into<String>,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            error_message: Some(error_message.into()),
            ..Self::ok(provider_name, capability)
        }
    }

    /// History key: `"<capability>:<provider_name>"`.
    pub fn key(&self) -> String {
        format!("{}:{}", self.capability, self.provider_name)
    }
}

// ─── ProviderRecommendation ───────────────────────────────────────────────────

/// Operator-facing severity of a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

/// One actionable operator recommendation. At most one is active per
/// provider — recording a new one replaces the old.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRecommendation {
    pub provider_name: String,
    pub current_status: ProviderHealth,
    pub issue: String,
    pub suggested_action: String,
    pub severity: Severity,
}

// ─── SelfCheckRegistry ────────────────────────────────────────────────────────

/// Aggregated monitoring report.
#[derive(Debug, Clone, Serialize)]
pub struct RegistryReport {
    /// RFC 3339 timestamp when this report was generated.
    pub generated_at: String,
    /// Latest check per tracked key, most recent first (top 5 keys).
    pub latest_checks: Vec<HealthCheckResult>,
    /// Total recorded checks across all keys.
    pub total_checks: usize,
    /// Fraction of recorded checks that succeeded (1.0 when empty).
    pub success_rate: f64,
    pub recommendations: Vec<ProviderRecommendation>,
}

/// Store of health-check history and active recommendations.
///
/// Explicitly constructed and shared by `Arc`; there is no process-global
/// instance.
pub struct SelfCheckRegistry {
    history: Mutex<HashMap<String, VecDeque<HealthCheckResult>>>,
    recommendations: Mutex<HashMap<String, ProviderRecommendation>>,
}

impl SelfCheckRegistry {
    pub fn new() -> Self {
        Self {
            history: Mutex::new(HashMap::new()),
            recommendations: Mutex::new(HashMap::new()),
        }
    }

    /// Append a result to its key's bounded history.
    pub async fn record_health_check(&self, result: HealthCheckResult) {
        let key = result.key();
        let mut history = self.history.lock().await;
        let entries = history.entry(key).or_default();
        if entries.len() >= HISTORY_CAP {
            entries.pop_front();
        }
        entries.push_back(result);
    }

    /// Record a recommendation, replacing any previous one for the provider.
    pub async fn record_recommendation(&self, recommendation: ProviderRecommendation) {
        debug!(
            provider = %recommendation.provider_name,
            severity = ?recommendation.severity,
            "recording recommendation"
        );
        self.recommendations
            .lock()
            .await
            .insert(recommendation.provider_name.clone(), recommendation);
    }

    /// Most-recent-first history for a provider, optionally narrowed to one
    /// capability. `limit` defaults to 10.
    pub async fn get_health_history(
        &self,
        provider_name: &str,
        capability: Option<&str>,
        limit: Option<usize>,
    ) -> Vec<HealthCheckResult> {
        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        let history = self.history.lock().await;

        let mut results: Vec<HealthCheckResult> = match capability {
            Some(cap) => history
                .get(&format!("{cap}:{provider_name}"))
                .map(|entries| entries.iter().cloned().collect())
                .unwrap_or_default(),
            None => history
                .iter()
                .filter(|(key, _)| {
                    key.rsplit_once(':').map(|(_, p)| p) == Some(provider_name)
                })
                .flat_map(|(_, entries)| entries.iter().cloned())
                .collect(),
        };

        // RFC 3339 strings from one clock sort chronologically.
        results.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        results.truncate(limit);
        results
    }

    /// All active recommendations, optionally filtered by severity.
    pub async fn get_recommendations(
        &self,
        severity: Option<Severity>,
    ) -> Vec<ProviderRecommendation> {
        let recommendations = self.recommendations.lock().await;
        let mut out: Vec<ProviderRecommendation> = recommendations
            .values()
            .filter(|r| severity.map_or(true, |s| r.severity == s))
            .cloned()
            .collect();
        out.sort_by(|a, b| a.provider_name.cmp(&b.provider_name));
        out
    }

    /// Aggregated report: latest check per key (top 5 by recency), global
    /// success rate, and every active recommendation.
    pub async fn status_report(&self) -> RegistryReport {
        let history = self.history.lock().await;

        let mut total = 0usize;
        let mut successes = 0usize;
        let mut latest: Vec<HealthCheckResult> = Vec::new();
        for entries in history.values() {
            total += entries.len();
            successes += entries.iter().filter(|r| r.success).count();
            if let Some(last) = entries.back() {
                latest.push(last.clone());
            }
        }
        latest.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        latest.truncate(REPORT_TOP_KEYS);

        let success_rate = if total == 0 {
            1.0
        } else {
            successes as f64 / total as f64
        };
        drop(history);

        RegistryReport {
            generated_at: Utc::now().to_rfc3339(),
            latest_checks: latest,
            total_checks: total,
            success_rate,
            recommendations: self.get_recommendations(None).await,
        }
    }
}

impl Default for SelfCheckRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared registry handle.
pub type SharedSelfCheckRegistry = Arc<SelfCheckRegistry>;

// ─── Tests ────────────────────────────────────────────────────────────────────
