//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the søknadsbehandling domain using SQLx.
//!
//! # Architecture
//!
//! The crate implements the domain's repository ports
//! ([`SoknadsbehandlingRepo`](domain_soknadsbehandling::SoknadsbehandlingRepo) and
//! [`SoknadRepo`](domain_soknadsbehandling::SoknadRepo)) on top of a
//! connection pool. Database failures are mapped into [`DatabaseError`] and
//! then into the domain's `PortError` at the port boundary.
//!
//! # Storage Model
//!
//! A søknadsbehandling is written as a JSONB snapshot of the whole aggregate,
//! next to a few copied columns (status, utbetaling id, journalpost id,
//! brevbestilling id) used by the lookups the ferdigstilling batch needs.
//! Every write is guarded by the aggregate's `versjon`, so two writers
//! racing on the same case cannot both succeed.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, DatabaseConfig, PostgresSoknadsbehandlingRepo};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/soknadsbehandling")).await?;
//! infra_db::migrate(&pool).await?;
//! let repo = PostgresSoknadsbehandlingRepo::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;

pub use pool::{DatabasePool, create_pool, create_pool_from_url, migrate, DatabaseConfig};
pub use error::DatabaseError;
pub use repositories::{PostgresSoknadRepo, PostgresSoknadsbehandlingRepo};
