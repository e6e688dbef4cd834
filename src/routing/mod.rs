//! Use-case → profile → provider routing.
//!
//! Maps a semantic use case (what the caller is trying to do) to a cost
//! tier — a [`Profile`] — and a profile to an ordered provider/model
//! fallback list, then materializes a `ProviderChain` over it:
//! - [`profiles`] — resolution precedence (explicit > env > table) and the
//!   static per-profile provider/model tables
//! - [`gate`] — sliding-window admission for deep-research escalation
//! - [`clients`] — the [`CapabilityRouter`] that builds chains per capability

pub mod clients;
pub mod gate;
pub mod profiles;

pub use clients::{AdapterFactory, CapabilityRouter, CatalogFactory, RouterError};
pub use gate::EscalationGate;
pub use profiles::{Profile, ProviderModelConfig};
