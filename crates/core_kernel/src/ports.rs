//! Ports and adapters infrastructure
//!
//! Domain crates define port traits for everything they need from the outside
//! world: the case store, the person registry, the user directory, oppgave,
//! the letter service and the payment system. Each port trait extends the
//! marker traits here, and adapters (Postgres, in-memory, HTTP clients)
//! implement them.
//!
//! ```text
//!   SoknadsbehandlingService ──► SoknadsbehandlingRepo ◄── PostgresSoknadsbehandlingRepo
//!                             ──► BrevPort              ◄── InMemoryBrev / HTTP client
//!                             ──► UtbetalingPort        ◄── InMemoryUtbetaling / oppdrag
//! ```
//!
//! ```rust,ignore
//! #[async_trait]
//! pub trait SoknadRepo: DomainPort {
//!     async fn hent_soknad(&self, id: SoknadId) -> Result<Option<Soknad>, PortError>;
//! }
//! ```

use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Failure reported by any port adapter
///
/// The services only branch on the variant, never on the message.
#[derive(Debug, Error)]
pub enum PortError {
    #[error("Not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    /// The adapter rejected the data it was given
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// The write lost an optimistic-locking race or hit a uniqueness constraint
    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Timeout after {duration_ms}ms: {operation}")]
    Timeout { operation: String, duration_ms: u64 },

    /// Stored data could not be mapped to or from the domain model
    #[error("Transformation error: {message}")]
    Transformation { message: String },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },
}

impl PortError {
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        PortError::Validation { message: message.into() }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        PortError::Conflict { message: message.into() }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    pub fn transformation(message: impl Into<String>) -> Self {
        PortError::Transformation { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, PortError::Conflict { .. })
    }
}

/// Supertrait of every port, so ports can be shared as `Arc<dyn Port>`
pub trait DomainPort: Send + Sync + 'static {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterHealth {
    Healthy,
    Unhealthy,
}

/// Outcome of probing one adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub adapter_id: String,
    pub status: AdapterHealth,
    pub latency_ms: u64,
    pub message: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl HealthCheckResult {
    fn measured(adapter_id: String, started: Instant, status: AdapterHealth, message: Option<String>) -> Self {
        Self {
            adapter_id,
            status,
            latency_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            message,
            checked_at: Utc::now(),
        }
    }

    /// A healthy result measured from `started`
    pub fn healthy(adapter_id: impl Into<String>, started: Instant) -> Self {
        Self::measured(adapter_id.into(), started, AdapterHealth::Healthy, None)
    }

    pub fn unhealthy(adapter_id: impl Into<String>, started: Instant, message: impl Into<String>) -> Self {
        Self::measured(
            adapter_id.into(),
            started,
            AdapterHealth::Unhealthy,
            Some(message.into()),
        )
    }

    pub fn is_healthy(&self) -> bool {
        self.status == AdapterHealth::Healthy
    }
}

/// Adapters that can probe their backing system
#[async_trait::async_trait]
pub trait HealthCheckable: Send + Sync {
    async fn health_check(&self) -> HealthCheckResult;
}
