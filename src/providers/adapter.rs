// SPDX-License-Identifier: MIT
//! The uniform contract every capability provider implements.
//!
//! An adapter is one concrete integration with an external vendor (an LLM
//! API, an email sender, a CRM). Operations are invoked by name with a JSON
//! payload; an operation the adapter does not support is a *typed* error,
//! not a panic, so the wrapper above can absorb it as an ordinary failure.
//!
//! All adapters expose a single asynchronous contract. Synchronous vendor
//! SDKs are wrapped once at construction with [`BlockingAdapter`] — never
//! detected per call.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

// ─── Errors ───────────────────────────────────────────────────────────────────

/// Faults an adapter invocation can produce.
///
/// These never escape `ProviderWrapper::invoke` — they are converted into
/// `"<Kind>: <message>"` strings on the provider's status record.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// The named operation is not part of this adapter's surface.
    #[error("operation `{0}` is not supported by this adapter")]
    UnsupportedOperation(String),

    /// The underlying vendor call failed.
    #[error("{0}")]
    Invocation(String),

    /// The adapter is missing credentials or other local configuration.
    #[error("{0}")]
    NotConfigured(String),

    /// The attempt ran past its deadline (raised by the wrapper, not the adapter).
    #[error("attempt exceeded the {0} ms deadline")]
    Timeout(u64),
}

impl AdapterError {
    /// Short kind tag used when formatting `"<Kind>: <message>"` status strings.
    pub fn kind(&self) -> &'static str {
        match self {
            AdapterError::UnsupportedOperation(_) => "UnsupportedOperation",
            AdapterError::Invocation(_) => "Invocation",
            AdapterError::NotConfigured(_) => "NotConfigured",
            AdapterError::Timeout(_) => "Timeout",
        }
    }

    /// Render this error the way provider status records store it.
    pub fn status_message(&self) -> String {
        format!("{}: {}", self.kind(), self)
    }
}

// ─── Validation probes ────────────────────────────────────────────────────────

/// Which validation probe an adapter supports for active self-checks.
///
/// The self-check service calls exactly one probe per adapter — the one
/// declared here. [`Validation::None`] means the adapter is assumed healthy
/// without any call being made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// `validate_credentials` — verifies API keys / auth state.
    Credentials,
    /// `validate_connection` — verifies endpoint reachability.
    Connection,
    /// `is_configured` — cheap local configuration-presence check.
    Configured,
    /// No probe available.
    None,
}

// ─── ProviderAdapter ──────────────────────────────────────────────────────────

/// Async contract for one concrete capability provider.
///
/// Implementations must be cheap to construct: the router builds one adapter
/// per resolved configuration entry every time a chain is materialized.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Stable provider identifier (e.g. `"openai"`, `"sendgrid"`).
    fn name(&self) -> &str;

    /// The capability this adapter serves (e.g. `"llm"`, `"email_sending"`).
    fn capability(&self) -> &str;

    /// Whether the adapter simulates calls instead of performing them.
    fn dry_run(&self) -> bool {
        false
    }

    /// Invoke a named operation with a JSON payload.
    async fn invoke(&self, operation: &str, params: Value) -> Result<Value, AdapterError>;

    /// The validation probe this adapter supports, if any.
    fn validation(&self) -> Validation {
        Validation::None
    }

    /// Verify credentials with the vendor. Only called when
    /// [`validation`](Self::validation) returns [`Validation::Credentials`].
    async fn validate_credentials(&self) -> Result<bool, AdapterError> {
        Ok(true)
    }

    /// Verify endpoint reachability. Only called when
    /// [`validation`](Self::validation) returns [`Validation::Connection`].
    async fn validate_connection(&self) -> Result<bool, AdapterError> {
        Ok(true)
    }

    /// Cheap local configuration check. Only called when
    /// [`validation`](Self::validation) returns [`Validation::Configured`].
    async fn is_configured(&self) -> bool {
        true
    }
}

/// Shared, type-erased adapter handle.
pub type SharedAdapter = Arc<dyn ProviderAdapter>;

// ─── Blocking bridge ──────────────────────────────────────────────────────────

/// Bridge for synchronous vendor SDKs.
///
/// Wraps one blocking call function at construction time and dispatches it on
/// the blocking thread pool, so the chain only ever sees the async contract.
pub struct BlockingAdapter {
    name: String,
    capability: String,
    call: Arc<dyn Fn(&str, Value) -> Result<Value, AdapterError> + Send + Sync>,
}

impl BlockingAdapter {
    /// Wrap a blocking call function as an async adapter.
    pub fn new(
        name: impl Into<String>,
        capability: impl Into<String>,
        call: impl Fn(&str, Value) -> Result<Value, AdapterError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            capability: capability.into(),
            call: Arc::new(call),
        }
    }
}

#[async_trait]
impl ProviderAdapter for BlockingAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn capability(&self) -> &str {
        &self.capability
    }

    async fn invoke(&self, operation: &str, params: Value) -> Result<Value, AdapterError> {
        let call = Arc::clone(&self.call);
        let operation = operation.to_string();
        tokio::task::spawn_blocking(move || call(&operation, params))
            .await
            .map_err(|e| AdapterError::Invocation(format!("blocking call panicked: {e}")))?
    }
}

impl std::fmt::Debug for BlockingAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingAdapter")
            .field("name", &self.name)
            .field("capability", &self.capability)
            .finish()
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_message_carries_kind_prefix() {
        let err = AdapterError::UnsupportedOperation("sync_contact".to_string());
        assert!(err.status_message().starts_with("UnsupportedOperation: "));

        let err = AdapterError::Timeout(30_000);
        assert_eq!(
            err.status_message(),
            "Timeout: attempt exceeded the 30000 ms deadline"
        );
    }

    #[tokio::test]
    async fn blocking_adapter_runs_sync_call() {
        let adapter = BlockingAdapter::new("legacy-crm", "crm", |op, params| {
            if op == "sync_contact" {
                Ok(json!({ "synced": params }))
            } else {
                Err(AdapterError::UnsupportedOperation(op.to_string()))
            }
        });

        let out = adapter
            .invoke("sync_contact", json!({ "email": "a@b.co" }))
            .await
            .unwrap();
        assert_eq!(out["synced"]["email"], "a@b.co");

        let err = adapter.invoke("nope", json!({})).await.unwrap_err();
        assert_eq!(err.kind(), "UnsupportedOperation");
    }
}
