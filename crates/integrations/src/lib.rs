//! # gridbook-integrations
//!
//! API integrations for worksheets: configuration, a per-worksheet
//! registry, and the executor that pulls rows from a fetcher and merges
//! them into a worksheet through the store surface.

mod error;
mod executor;
mod model;
mod registry;

/// Re-export integration error types.
pub use error::{IntegrationError, Result};
/// Re-export the executor.
pub use executor::{run_integration, RunOutcome};
/// Re-export the integration model.
pub use model::{
    ApiIntegration, Frequency, IntegrationDraft, IntegrationId, IntegrationUpdate, Schedule,
};
/// Re-export the registry.
pub use registry::IntegrationRegistry;
