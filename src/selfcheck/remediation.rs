//! Operator remediation hints, keyed by provider name.
//!
//! When a self-check probe fails, the sweep synthesizes one actionable
//! recommendation from this table. Unknown providers get a generic hint
//! rather than nothing.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::providers::status::ProviderHealth;
use crate::selfcheck::registry::{ProviderRecommendation, Severity};

struct Remedy {
    issue: &'static str,
    action: &'static str,
    severity: Severity,
}

static REMEDIES: Lazy<HashMap<&'static str, Remedy>> = Lazy::new(|| {
    HashMap::from([
        (
            "openai",
            Remedy {
                issue: "OpenAI API key missing or invalid",
                action: "Set OPENAI_API_KEY and verify the billing account is active",
                severity: Severity::High,
            },
        ),
        (
            "anthropic",
            Remedy {
                issue: "Anthropic API key missing or invalid",
                action: "Set ANTHROPIC_API_KEY and check the workspace quota",
                severity: Severity::High,
            },
        ),
        (
            "google",
            Remedy {
                issue: "Gemini credentials missing or expired",
                action: "Set GOOGLE_API_KEY or refresh the service-account token",
                severity: Severity::High,
            },
        ),
        (
            "sendgrid",
            Remedy {
                issue: "SendGrid key rejected or sender not authorized",
                action: "Set SENDGRID_API_KEY and verify the sender domain",
                severity: Severity::High,
            },
        ),
        (
            "ses",
            Remedy {
                issue: "AWS SES credentials or region misconfigured",
                action: "Set AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY and confirm the SES region",
                severity: Severity::High,
            },
        ),
        (
            "linkedin",
            Remedy {
                issue: "LinkedIn access token expired",
                action: "Re-run the OAuth flow to refresh LINKEDIN_ACCESS_TOKEN",
                severity: Severity::Medium,
            },
        ),
        (
            "twitter",
            Remedy {
                issue: "Twitter/X bearer token rejected",
                action: "Rotate TWITTER_BEARER_TOKEN in the developer portal",
                severity: Severity::Medium,
            },
        ),
        (
            "hubspot",
            Remedy {
                issue: "HubSpot private-app token invalid",
                action: "Regenerate the private-app token and set HUBSPOT_API_KEY",
                severity: Severity::High,
            },
        ),
        (
            "salesforce",
            Remedy {
                issue: "Salesforce connected-app secret rejected",
                action: "Refresh SALESFORCE_CLIENT_SECRET and re-authorize the connected app",
                severity: Severity::High,
            },
        ),
    ])
});

/// Build the recommendation for a failed provider probe.
pub fn recommendation_for(
    provider_name: &str,
    current_status: ProviderHealth,
    detail: Option<&str>,
) -> ProviderRecommendation {
    match REMEDIES.get(provider_name) {
        Some(remedy) => ProviderRecommendation {
            provider_name: provider_name.to_string(),
            current_status,
            issue: remedy.issue.to_string(),
            suggested_action: remedy.action.to_string(),
            severity: remedy.severity,
        },
        None => ProviderRecommendation {
            provider_name: provider_name.to_string(),
            current_status,
            issue: detail.unwrap_or("Health probe failed").to_string(),
            suggested_action: format!(
                "Check credentials and connectivity for provider `{provider_name}`"
            ),
            severity: Severity::Medium,
        },
    }
}
