//! Test Utilities Crate
//!
//! Shared test infrastructure for the søknadsbehandling workspace.
//!
//! # Modules
//!
//! - `fixtures`: Fixed identities, periods, søknader and vilkårsvurderinger
//! - `builders`: Cases walked to any status through the real aggregate
//! - `mocks`: All mock ports wired around one shared call log
//! - `database`: Postgres testcontainer with the schema applied
//! - `assertions`: Status, transition and call-order assertions
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod mocks;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use mocks::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
