//! Attestering (four-eyes approval)
//!
//! A case sent to attestering is either approved (iverksatt) or sent back
//! (underkjent) by an attestant who is not the saksbehandler. Every decision
//! is kept in an append-only history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::Attestant;

/// Why an attestant sent a case back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnderkjentGrunn {
    InngangsvilkaareneErFeilvurdert,
    BeregningenErFeil,
    DokumentasjonMangler,
    VedtaksbrevetErFeil,
    AndreForhold,
}

/// One attestant decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Attestering {
    Iverksatt {
        attestant: Attestant,
        opprettet: DateTime<Utc>,
    },
    Underkjent {
        attestant: Attestant,
        grunn: UnderkjentGrunn,
        kommentar: String,
        opprettet: DateTime<Utc>,
    },
}

impl Attestering {
    pub fn iverksatt(attestant: Attestant) -> Self {
        Attestering::Iverksatt {
            attestant,
            opprettet: Utc::now(),
        }
    }

    pub fn underkjent(attestant: Attestant, grunn: UnderkjentGrunn, kommentar: impl Into<String>) -> Self {
        Attestering::Underkjent {
            attestant,
            grunn,
            kommentar: kommentar.into(),
            opprettet: Utc::now(),
        }
    }

    pub fn attestant(&self) -> &Attestant {
        match self {
            Attestering::Iverksatt { attestant, .. } | Attestering::Underkjent { attestant, .. } => attestant,
        }
    }

    pub fn opprettet(&self) -> DateTime<Utc> {
        match self {
            Attestering::Iverksatt { opprettet, .. } | Attestering::Underkjent { opprettet, .. } => *opprettet,
        }
    }

    pub fn er_underkjent(&self) -> bool {
        matches!(self, Attestering::Underkjent { .. })
    }
}

/// Append-only list of attestant decisions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attesteringshistorikk(Vec<Attestering>);

impl Attesteringshistorikk {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn legg_til(&mut self, attestering: Attestering) {
        self.0.push(attestering);
    }

    /// The most recent decision
    pub fn siste(&self) -> Option<&Attestering> {
        self.0.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attestering> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Attesteringshistorikk {
    type Item = &'a Attestering;
    type IntoIter = std::slice::Iter<'a, Attestering>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
