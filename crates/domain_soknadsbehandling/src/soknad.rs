//! The incoming søknad

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Fnr, JournalpostId, NavIdent, OppgaveId, SakId, Saksnummer, SoknadId};
use domain_beregning::Sakstype;

/// Why and by whom a søknad was closed without a behandling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lukket {
    pub tidspunkt: DateTime<Utc>,
    pub saksbehandler: NavIdent,
}

/// A søknad as received and journaled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Soknad {
    pub id: SoknadId,
    pub sak_id: SakId,
    pub saksnummer: Saksnummer,
    pub fnr: Fnr,
    pub sakstype: Sakstype,
    pub opprettet: DateTime<Utc>,
    pub oppgave_id: Option<OppgaveId>,
    pub journalpost_id: Option<JournalpostId>,
    pub lukket: Option<Lukket>,
}

impl Soknad {
    pub fn er_lukket(&self) -> bool {
        self.lukket.is_some()
    }
}
