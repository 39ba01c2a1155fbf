//! Core Kernel - Foundational types for the søknadsbehandling system
//!
//! This crate provides the building blocks shared by every other crate:
//! - Typed identifiers, fødselsnummer and caseworker idents
//! - NOK money with precise decimal arithmetic
//! - Calendar months and month-based periods
//! - Port error and marker traits for the ports-and-adapters layout

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod error;
pub mod ports;

pub use money::{Money, Currency, MoneyError, Rate};
pub use temporal::{Maned, Periode, TemporalError, Timezone};
pub use identifiers::{
    SakId, SoknadId, BehandlingId, BeregningId, UtbetalingId, AuditEventId,
    OppgaveId, JournalpostId, BrevbestillingId, AktorId,
    Saksnummer, Fnr, NavIdent, Saksbehandler, Attestant,
};
pub use error::CoreError;
pub use ports::{PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth};
