//! switchboard configuration.
//!
//! Loaded from an optional TOML file with environment overrides on top:
//!
//! ```toml
//! dry_run = false
//! attempt_timeout_secs = 30
//!
//! [health]
//! success_threshold = 5
//! failure_threshold = 3
//!
//! [deep_research]
//! enabled = true
//! max_escalations_per_hour = 10
//!
//! [profiles]
//! email_copy = "premium"
//! ```
//!
//! Environment overrides: `SWITCHBOARD_DRY_RUN`, `SWITCHBOARD_DEEP_RESEARCH`,
//! and the per-use-case `SWITCHBOARD_PROFILE_<USE_CASE>` handled in routing.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::routing::profiles::Profile;

const DEFAULT_ATTEMPT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_ESCALATIONS_PER_HOUR: u64 = 10;

// ─── HealthConfig ─────────────────────────────────────────────────────────────

/// Streak thresholds for the provider health state machine (`[health]`).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Consecutive successes before a provider is promoted to healthy.
    pub success_threshold: u32,
    /// Consecutive failures before a provider is demoted to unhealthy.
    pub failure_threshold: u32,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            success_threshold: crate::providers::status::DEFAULT_SUCCESS_THRESHOLD,
            failure_threshold: crate::providers::status::DEFAULT_FAILURE_THRESHOLD,
        }
    }
}

// ─── DeepResearchConfig ───────────────────────────────────────────────────────

/// Deep-research escalation feature flag and gate (`[deep_research]`).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeepResearchConfig {
    /// Allow appending a research-tier model to resolved fallback lists.
    /// Default: false.
    pub enabled: bool,
    /// Escalation gate: admitted escalations per rolling hour.
    pub max_escalations_per_hour: u64,
}

impl Default for DeepResearchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_escalations_per_hour: DEFAULT_MAX_ESCALATIONS_PER_HOUR,
        }
    }
}

// ─── PlatformConfig ───────────────────────────────────────────────────────────

/// Top-level configuration for the resilience layer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Simulate provider calls instead of performing them. Default: true —
    /// chains are constructed dry-run unless a deployment opts in to live
    /// traffic.
    pub dry_run: bool,
    /// Per-attempt deadline in seconds; 0 disables the deadline.
    pub attempt_timeout_secs: u64,
    pub health: HealthConfig,
    pub deep_research: DeepResearchConfig,
    /// Per-use-case profile overrides (`[profiles]` table).
    pub profiles: HashMap<String, String>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            dry_run: true,
            attempt_timeout_secs: DEFAULT_ATTEMPT_TIMEOUT_SECS,
            health: HealthConfig::default(),
            deep_research: DeepResearchConfig::default(),
            profiles: HashMap::new(),
        }
    }
}

impl PlatformConfig {
    /// Load from a TOML file if it exists, then apply environment overrides.
    ///
    /// A missing file is not an error — defaults apply. A malformed file is:
    /// silently ignoring a broken config hides deployment bugs.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => {
                let raw = std::fs::read_to_string(path)?;
                let config: PlatformConfig = toml::from_str(&raw)?;
                info!(path = %path.display(), "loaded config file");
                config
            }
            Some(path) => {
                warn!(path = %path.display(), "config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(v) = env_bool("SWITCHBOARD_DRY_RUN") {
            self.dry_run = v;
        }
        if let Some(v) = env_bool("SWITCHBOARD_DEEP_RESEARCH") {
            self.deep_research.enabled = v;
        }
    }

    /// The per-attempt deadline, or `None` when disabled.
    pub fn attempt_timeout(&self) -> Option<Duration> {
        match self.attempt_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Profile override for a use case from the `[profiles]` table.
    ///
    /// Unparseable values are ignored rather than failing resolution.
    pub fn profile_override(&self, use_case: &str) -> Option<Profile> {
        let raw = self.profiles.get(use_case)?;
        let parsed = Profile::parse(raw);
        if parsed.is_none() {
            warn!(use_case, value = %raw, "ignoring unparseable profile override");
        }
        parsed
    }
}

fn env_bool(key: &str) -> Option<bool> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_safe() {
        let config = PlatformConfig::default();
        assert!(config.dry_run);
        assert!(!config.deep_research.enabled);
        assert_eq!(config.attempt_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.health.success_threshold, 5);
        assert_eq!(config.health.failure_threshold, 3);
    }

    #[test]
    fn zero_timeout_disables_deadline() {
        let config = PlatformConfig {
            attempt_timeout_secs: 0,
            ..PlatformConfig::default()
        };
        assert_eq!(config.attempt_timeout(), None);
    }

    #[test]
    fn loads_partial_toml_over_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "dry_run = false\n[profiles]\nemail_copy = \"premium\"\nbroken = \"platinum\""
        )
        .unwrap();

        let config = PlatformConfig::load(Some(file.path())).unwrap();
        assert!(!config.dry_run);
        // Untouched sections keep their defaults.
        assert_eq!(config.health.success_threshold, 5);
        assert_eq!(config.profile_override("email_copy"), Some(Profile::Premium));
        assert_eq!(config.profile_override("broken"), None);
        assert_eq!(config.profile_override("unlisted"), None);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config =
            PlatformConfig::load(Some(Path::new("/nonexistent/switchboard.toml"))).unwrap();
        assert!(config.dry_run);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "dry_run = \"definitely\"").unwrap();
        assert!(PlatformConfig::load(Some(file.path())).is_err());
    }
}
