// SPDX-License-Identifier: MIT
//! Monitoring surface: health history, recommendations, active probing.
//!
//! This is the layer's designed error channel for operators. Invocation
//! faults never crash business logic; instead they accumulate here as
//! [`HealthCheckResult`] history and [`ProviderRecommendation`]s that
//! dashboards and CLIs read via [`SelfCheckRegistry::status_report`].
//!
//! The registry is explicitly constructed and passed to its consumers —
//! there is no process-global. Tests build a fresh one each.

pub mod registry;
pub mod remediation;
pub mod service;

pub use registry::{
    HealthCheckResult, ProviderRecommendation, RegistryReport, SelfCheckRegistry, Severity,
    SharedSelfCheckRegistry, HISTORY_CAP,
};
pub use service::{SelfCheckService, SharedSelfCheckService};
