//! Statistics events for the søknadsbehandling lifecycle
//!
//! Events are published to observers after the case has been persisted.
//! Each carries the persisted snapshot, so consumers never have to read the
//! case back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use core_kernel::BehandlingId;

use crate::behandling::Soknadsbehandling;

/// Lifecycle events consumed by the statistics pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatistikkEvent {
    SoknadsbehandlingOpprettet {
        behandling: Box<Soknadsbehandling>,
        timestamp: DateTime<Utc>,
    },

    SoknadsbehandlingTilAttestering {
        behandling: Box<Soknadsbehandling>,
        timestamp: DateTime<Utc>,
    },

    SoknadsbehandlingUnderkjent {
        behandling: Box<Soknadsbehandling>,
        timestamp: DateTime<Utc>,
    },

    /// Emitted exactly once per case, by the iverksetting
    SoknadsbehandlingIverksatt {
        behandling: Box<Soknadsbehandling>,
        timestamp: DateTime<Utc>,
    },
}

impl StatistikkEvent {
    pub fn opprettet(behandling: &Soknadsbehandling) -> Self {
        StatistikkEvent::SoknadsbehandlingOpprettet {
            behandling: Box::new(behandling.clone()),
            timestamp: Utc::now(),
        }
    }

    pub fn til_attestering(behandling: &Soknadsbehandling) -> Self {
        StatistikkEvent::SoknadsbehandlingTilAttestering {
            behandling: Box::new(behandling.clone()),
            timestamp: Utc::now(),
        }
    }

    pub fn underkjent(behandling: &Soknadsbehandling) -> Self {
        StatistikkEvent::SoknadsbehandlingUnderkjent {
            behandling: Box::new(behandling.clone()),
            timestamp: Utc::now(),
        }
    }

    pub fn iverksatt(behandling: &Soknadsbehandling) -> Self {
        StatistikkEvent::SoknadsbehandlingIverksatt {
            behandling: Box::new(behandling.clone()),
            timestamp: Utc::now(),
        }
    }

    /// The snapshot carried by the event
    pub fn behandling(&self) -> &Soknadsbehandling {
        match self {
            StatistikkEvent::SoknadsbehandlingOpprettet { behandling, .. }
            | StatistikkEvent::SoknadsbehandlingTilAttestering { behandling, .. }
            | StatistikkEvent::SoknadsbehandlingUnderkjent { behandling, .. }
            | StatistikkEvent::SoknadsbehandlingIverksatt { behandling, .. } => behandling,
        }
    }

    pub fn behandling_id(&self) -> BehandlingId {
        self.behandling().id()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            StatistikkEvent::SoknadsbehandlingOpprettet { timestamp, .. }
            | StatistikkEvent::SoknadsbehandlingTilAttestering { timestamp, .. }
            | StatistikkEvent::SoknadsbehandlingUnderkjent { timestamp, .. }
            | StatistikkEvent::SoknadsbehandlingIverksatt { timestamp, .. } => *timestamp,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            StatistikkEvent::SoknadsbehandlingOpprettet { .. } => "SoknadsbehandlingOpprettet",
            StatistikkEvent::SoknadsbehandlingTilAttestering { .. } => "SoknadsbehandlingTilAttestering",
            StatistikkEvent::SoknadsbehandlingUnderkjent { .. } => "SoknadsbehandlingUnderkjent",
            StatistikkEvent::SoknadsbehandlingIverksatt { .. } => "SoknadsbehandlingIverksatt",
        }
    }
}

/// Receives statistics events; fire-and-forget
pub trait StatistikkObserver: Send + Sync {
    fn handle(&self, event: &StatistikkEvent);
}

/// Writes every event to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingStatistikkObserver;

impl StatistikkObserver for LoggingStatistikkObserver {
    fn handle(&self, event: &StatistikkEvent) {
        let behandling = event.behandling();
        info!(
            event_type = event.event_type(),
            behandling_id = %behandling.id(),
            sak_id = %behandling.sak_id(),
            status = %behandling.status(),
            "statistikk event"
        );
    }
}
