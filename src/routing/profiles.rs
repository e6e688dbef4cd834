//! Use-case → profile resolution and the per-profile provider/model tables.
//!
//! Resolution precedence is deterministic, first match wins:
//! explicit override > `SWITCHBOARD_PROFILE_<USE_CASE>` environment
//! override > configured table > built-in defaults > `standard`.

use serde::{Deserialize, Serialize};

// ─── Profile ──────────────────────────────────────────────────────────────────

/// Cost/capability tier determining eligible provider/model configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Cheap,
    Standard,
    Premium,
    Research,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Cheap => "cheap",
            Profile::Standard => "standard",
            Profile::Premium => "premium",
            Profile::Research => "research",
        }
    }

    /// Parse a profile name, case-insensitively.
    pub fn parse(s: &str) -> Option<Profile> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cheap" => Some(Profile::Cheap),
            "standard" => Some(Profile::Standard),
            "premium" => Some(Profile::Premium),
            "research" => Some(Profile::Research),
            _ => None,
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Use-case defaults ────────────────────────────────────────────────────────

/// Built-in use-case → profile defaults.
///
/// Anything not listed resolves to `standard`.
const USE_CASE_PROFILES: &[(&str, Profile)] = &[
    ("campaign_ideation", Profile::Premium),
    ("brand_voice_analysis", Profile::Premium),
    ("content_generation", Profile::Standard),
    ("email_copy", Profile::Standard),
    ("social_post", Profile::Cheap),
    ("lead_scoring", Profile::Cheap),
    ("report_summary", Profile::Cheap),
    ("market_research", Profile::Research),
];

/// Default profile for a use case from the built-in table.
pub fn default_profile(use_case: &str) -> Profile {
    USE_CASE_PROFILES
        .iter()
        .find(|(uc, _)| *uc == use_case)
        .map(|(_, p)| *p)
        .unwrap_or(Profile::Standard)
}

/// Per-use-case environment override, e.g.
/// `SWITCHBOARD_PROFILE_EMAIL_COPY=premium`.
pub fn env_profile_override(use_case: &str) -> Option<Profile> {
    let suffix: String = use_case
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    let key = format!("SWITCHBOARD_PROFILE_{suffix}");
    std::env::var(key).ok().and_then(|v| Profile::parse(&v))
}

// ─── Provider/model tables ────────────────────────────────────────────────────

/// One resolved fallback entry: which provider, with which model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderModelConfig {
    pub provider: String,
    pub model: String,
}

impl ProviderModelConfig {
    fn new(provider: &str, model: &str) -> Self {
        Self {
            provider: provider.to_string(),
            model: model.to_string(),
        }
    }
}

/// Static fallback-priority ordered provider/model list for a profile.
///
/// The order here is pre-health: the chain reorders attempts by observed
/// health at call time.
pub fn provider_configs(profile: Profile) -> Vec<ProviderModelConfig> {
    match profile {
        Profile::Cheap => vec![
            ProviderModelConfig::new("openai", "gpt-5.3-mini"),
            ProviderModelConfig::new("google", "gemini-3-flash"),
            ProviderModelConfig::new("anthropic", "claude-haiku-4-5"),
        ],
        Profile::Standard => vec![
            ProviderModelConfig::new("openai", "gpt-5.3"),
            ProviderModelConfig::new("anthropic", "claude-sonnet-4-6"),
            ProviderModelConfig::new("google", "gemini-3-flash"),
        ],
        Profile::Premium => vec![
            ProviderModelConfig::new("anthropic", "claude-opus-4-5"),
            ProviderModelConfig::new("openai", "gpt-5.3"),
            ProviderModelConfig::new("google", "gemini-3-pro"),
        ],
        Profile::Research => vec![
            ProviderModelConfig::new("openai", "o4-deep-research"),
            ProviderModelConfig::new("anthropic", "claude-opus-4-5"),
        ],
    }
}

/// The single research-tier entry appended on an admitted deep-research
/// escalation.
pub fn research_escalation_entry() -> ProviderModelConfig {
    ProviderModelConfig::new("openai", "o4-deep-research")
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_use_cases_resolve() {
        assert_eq!(default_profile("campaign_ideation"), Profile::Premium);
        assert_eq!(default_profile("social_post"), Profile::Cheap);
        assert_eq!(default_profile("market_research"), Profile::Research);
    }

    #[test]
    fn unknown_use_case_falls_back_to_standard() {
        assert_eq!(default_profile("never_heard_of_it"), Profile::Standard);
    }

    #[test]
    fn profile_parse_is_case_insensitive() {
        assert_eq!(Profile::parse("Premium"), Some(Profile::Premium));
        assert_eq!(Profile::parse(" cheap "), Some(Profile::Cheap));
        assert_eq!(Profile::parse("platinum"), None);
    }

    #[test]
    fn env_override_reads_sanitized_key() {
        // Unique var name to avoid interference across parallel tests.
        std::env::set_var("SWITCHBOARD_PROFILE_ENV_PROBE_CASE", "research");
        assert_eq!(
            env_profile_override("env-probe.case"),
            Some(Profile::Research)
        );
        std::env::remove_var("SWITCHBOARD_PROFILE_ENV_PROBE_CASE");
        assert_eq!(env_profile_override("env-probe.case"), None);
    }

    #[test]
    fn tables_are_ordered_and_nonempty() {
        for profile in [
            Profile::Cheap,
            Profile::Standard,
            Profile::Premium,
            Profile::Research,
        ] {
            let configs = provider_configs(profile);
            assert!(!configs.is_empty(), "{profile} table is empty");
        }
        // Premium leads with the strongest generation model.
        assert_eq!(provider_configs(Profile::Premium)[0].provider, "anthropic");
    }
}
