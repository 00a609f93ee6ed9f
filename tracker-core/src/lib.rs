//! Core library for the city weather tracker.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Abstraction over the forecast provider and the selection store
//! - Shared domain models (candidates, details)
//! - The orchestrator that turns queries into enriched, observable state
//!
//! It is used by `tracker-cli`, but can also be reused by other frontends.

pub mod config;
pub mod model;
pub mod orchestrator;
pub mod provider;
pub mod store;

pub use config::Config;
pub use model::{Candidate, Detail, Enrichment};
pub use orchestrator::Orchestrator;
pub use provider::{ForecastProvider, ProviderError, provider_from_config};
pub use store::{FileSelectionStore, SelectionStore};
