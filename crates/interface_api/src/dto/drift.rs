//! Drift DTOs

use serde::Serialize;

use core_kernel::{BehandlingId, BrevbestillingId, JournalpostId};
use domain_soknadsbehandling::BatchResultat;

/// One attempted step in the ferdigstilling batch
#[derive(Debug, Serialize)]
pub struct StegResponse {
    pub behandling_id: BehandlingId,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journalpost_id: Option<JournalpostId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brevbestilling_id: Option<BrevbestillingId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feil: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub melding: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchResultatResponse {
    pub journalposter: Vec<StegResponse>,
    pub brevbestillinger: Vec<StegResponse>,
}

impl From<&BatchResultat> for BatchResultatResponse {
    fn from(resultat: &BatchResultat) -> Self {
        let journalposter = resultat
            .journalposter
            .iter()
            .map(|r| match r {
                Ok(ok) => StegResponse {
                    behandling_id: ok.behandling_id,
                    ok: true,
                    journalpost_id: Some(ok.journalpost_id.clone()),
                    brevbestilling_id: None,
                    feil: None,
                    melding: None,
                },
                Err(e) => StegResponse {
                    behandling_id: e.behandling_id(),
                    ok: false,
                    journalpost_id: None,
                    brevbestilling_id: None,
                    feil: Some(e.kode()),
                    melding: Some(e.to_string()),
                },
            })
            .collect();

        let brevbestillinger = resultat
            .brevbestillinger
            .iter()
            .map(|r| match r {
                Ok(ok) => StegResponse {
                    behandling_id: ok.behandling_id,
                    ok: true,
                    journalpost_id: Some(ok.journalpost_id.clone()),
                    brevbestilling_id: Some(ok.brevbestilling_id.clone()),
                    feil: None,
                    melding: None,
                },
                Err(e) => StegResponse {
                    behandling_id: e.behandling_id(),
                    ok: false,
                    journalpost_id: None,
                    brevbestilling_id: None,
                    feil: Some(e.kode()),
                    melding: Some(e.to_string()),
                },
            })
            .collect();

        Self { journalposter, brevbestillinger }
    }
}
