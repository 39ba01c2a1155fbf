//! External steps after iverksetting: journaling and distributing the vedtaksbrev

use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::{BrevbestillingId, JournalpostId};

/// Progress of the post-iverksetting steps
///
/// Advanced only after the downstream call has succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "steg", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EksterneIverksettingssteg {
    /// Not yet journaled. Innvilget cases wait here for the payment receipt.
    VenterPaKvittering,
    Journalfort {
        journalpost_id: JournalpostId,
    },
    JournalfortOgDistribuertBrev {
        journalpost_id: JournalpostId,
        brevbestilling_id: BrevbestillingId,
    },
}

/// Illegal advance of the external steps
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KunneIkkeEndreSteg {
    #[error("Letter is already journaled")]
    AlleredeJournalfort,

    #[error("Letter must be journaled before it can be distributed")]
    MaaJournalforesForst,

    #[error("Letter is already distributed")]
    AlleredeDistribuert,
}

impl KunneIkkeEndreSteg {
    pub fn kode(&self) -> &'static str {
        match self {
            KunneIkkeEndreSteg::AlleredeJournalfort => "allerede_journalfort",
            KunneIkkeEndreSteg::MaaJournalforesForst => "maa_journalfores_forst",
            KunneIkkeEndreSteg::AlleredeDistribuert => "allerede_distribuert",
        }
    }
}

impl EksterneIverksettingssteg {
    pub fn journalpost_id(&self) -> Option<&JournalpostId> {
        match self {
            EksterneIverksettingssteg::VenterPaKvittering => None,
            EksterneIverksettingssteg::Journalfort { journalpost_id }
            | EksterneIverksettingssteg::JournalfortOgDistribuertBrev { journalpost_id, .. } => Some(journalpost_id),
        }
    }

    pub fn brevbestilling_id(&self) -> Option<&BrevbestillingId> {
        match self {
            EksterneIverksettingssteg::JournalfortOgDistribuertBrev { brevbestilling_id, .. } => Some(brevbestilling_id),
            _ => None,
        }
    }

    pub fn er_ferdig(&self) -> bool {
        matches!(self, EksterneIverksettingssteg::JournalfortOgDistribuertBrev { .. })
    }

    pub fn journalfor(&self, journalpost_id: JournalpostId) -> Result<Self, KunneIkkeEndreSteg> {
        match self {
            EksterneIverksettingssteg::VenterPaKvittering => {
                Ok(EksterneIverksettingssteg::Journalfort { journalpost_id })
            }
            _ => Err(KunneIkkeEndreSteg::AlleredeJournalfort),
        }
    }

    pub fn distribuer(&self, brevbestilling_id: BrevbestillingId) -> Result<Self, KunneIkkeEndreSteg> {
        match self {
            EksterneIverksettingssteg::VenterPaKvittering => Err(KunneIkkeEndreSteg::MaaJournalforesForst),
            EksterneIverksettingssteg::Journalfort { journalpost_id } => {
                Ok(EksterneIverksettingssteg::JournalfortOgDistribuertBrev {
                    journalpost_id: journalpost_id.clone(),
                    brevbestilling_id,
                })
            }
            EksterneIverksettingssteg::JournalfortOgDistribuertBrev { .. } => {
                Err(KunneIkkeEndreSteg::AlleredeDistribuert)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let steg = EksterneIverksettingssteg::VenterPaKvittering
            .journalfor(JournalpostId::from("jp-1"))
            .unwrap()
            .distribuer(BrevbestillingId::from("bb-1"))
            .unwrap();
        assert!(steg.er_ferdig());
        assert_eq!(steg.journalpost_id().map(|j| j.as_str()), Some("jp-1"));
        assert_eq!(steg.brevbestilling_id().map(|b| b.as_str()), Some("bb-1"));
    }

    #[test]
    fn test_illegal_advances() {
        let venter = EksterneIverksettingssteg::VenterPaKvittering;
        assert_eq!(
            venter.distribuer(BrevbestillingId::from("bb")),
            Err(KunneIkkeEndreSteg::MaaJournalforesForst)
        );

        let journalfort = venter.journalfor(JournalpostId::from("jp")).unwrap();
        assert_eq!(
            journalfort.journalfor(JournalpostId::from("jp2")),
            Err(KunneIkkeEndreSteg::AlleredeJournalfort)
        );

        let ferdig = journalfort.distribuer(BrevbestillingId::from("bb")).unwrap();
        assert_eq!(
            ferdig.distribuer(BrevbestillingId::from("bb2")),
            Err(KunneIkkeEndreSteg::AlleredeDistribuert)
        );
    }
}
