//! Repository implementations for the søknadsbehandling ports
//!
//! Each repository owns a clone of the pool, uses runtime-checked SQLx
//! queries and maps rows into domain types before they leave the crate.

pub mod soknad;
pub mod soknadsbehandling;

pub use soknad::PostgresSoknadRepo;
pub use soknadsbehandling::PostgresSoknadsbehandlingRepo;

/// Status column prefix shared by both iverksatt statuses
pub(crate) const IVERKSATT_PREFIX: &str = "IVERKSATT%";
