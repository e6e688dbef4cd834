// SPDX-License-Identifier: MIT
//! Provider invocation layer.
//!
//! Everything a capability chain needs to call one external provider safely:
//! - [`adapter`] — the [`ProviderAdapter`] contract every vendor integration
//!   implements, plus the blocking→async bridge for synchronous SDKs
//! - [`status`] — per-provider health bookkeeping (streaks, latency EMA)
//! - [`wrapper`] — timed, error-absorbing invocation of a single adapter
//! - [`chain`] — health-prioritized sequential fallback across adapters
//!
//! Invocation faults are absorbed here and surfaced as outcome structs so
//! callers branch on a boolean, never on error control flow. The one loud
//! failure in this crate is chain *construction* with zero adapters — see
//! `routing`.

pub mod adapter;
pub mod chain;
pub mod status;
pub mod wrapper;

// Convenience re-exports.
pub use adapter::{AdapterError, BlockingAdapter, ProviderAdapter, SharedAdapter, Validation};
pub use chain::{AttemptRecord, ChainOutcome, ChainStatusReport, ProviderChain, NO_PROVIDERS};
pub use status::{ProviderHealth, ProviderStatus};
pub use wrapper::{ProviderWrapper, WrapperOptions, WrapperOutcome};
