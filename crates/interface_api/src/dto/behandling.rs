//! Søknadsbehandling DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{
    BehandlingId, BrevbestillingId, JournalpostId, Money, OppgaveId, Periode, SakId, Saksbehandler,
    SoknadId, UtbetalingId,
};
use domain_beregning::{Beregning, Bosituasjon, Fradrag};
use domain_soknadsbehandling::{
    Attesteringshistorikk, EksterneIverksettingssteg, Grunnlagsdata, Simulering, Soknadsbehandling,
    UnderkjentGrunn, Vilkarsvurderinger,
};

fn trimmet<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|s| s.trim().to_string())
}

#[derive(Debug, Deserialize, Validate)]
pub struct OpprettBehandlingRequest {
    pub soknad_id: Uuid,
}

#[derive(Debug, Deserialize, Validate)]
pub struct StonadsperiodeRequest {
    pub fra_og_med: NaiveDate,
    pub til_og_med: NaiveDate,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BosituasjonRequest {
    pub bosituasjon: Bosituasjon,
}

#[derive(Debug, Deserialize, Validate)]
pub struct FradragRequest {
    #[validate(length(max = 100))]
    pub fradrag: Vec<Fradrag>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct VilkarsvurderRequest {
    pub vilkarsvurderinger: Vilkarsvurderinger,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct BeregnRequest {
    #[serde(default)]
    #[validate(length(max = 4000))]
    pub begrunnelse: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TilAttesteringRequest {
    #[serde(default)]
    #[validate(length(max = 10000))]
    pub fritekst: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UnderkjennRequest {
    pub grunn: UnderkjentGrunn,
    #[serde(deserialize_with = "trimmet")]
    #[validate(length(min = 1, max = 4000))]
    pub kommentar: String,
}

/// The case as returned from every behandling endpoint
#[derive(Debug, Serialize)]
pub struct BehandlingResponse {
    pub id: BehandlingId,
    pub sak_id: SakId,
    pub soknad_id: SoknadId,
    pub saksnummer: i64,
    pub status: &'static str,
    pub oppgave_id: OppgaveId,
    pub stonadsperiode: Option<Periode>,
    pub grunnlagsdata: Grunnlagsdata,
    pub vilkarsvurderinger: Vilkarsvurderinger,
    pub beregning: Option<Beregning>,
    pub sum_ytelse: Option<Money>,
    pub simulering: Option<Simulering>,
    pub saksbehandler: Option<Saksbehandler>,
    pub fritekst_til_brev: String,
    pub attesteringer: Attesteringshistorikk,
    pub utbetaling_id: Option<UtbetalingId>,
    pub eksterne_iverksettingssteg: Option<EksterneIverksettingssteg>,
    pub journalpost_id: Option<JournalpostId>,
    pub brevbestilling_id: Option<BrevbestillingId>,
    pub versjon: i64,
    pub opprettet: DateTime<Utc>,
    pub endret: DateTime<Utc>,
}

impl From<&Soknadsbehandling> for BehandlingResponse {
    fn from(b: &Soknadsbehandling) -> Self {
        Self {
            id: b.id(),
            sak_id: b.sak_id(),
            soknad_id: b.soknad_id(),
            saksnummer: b.saksnummer().value(),
            status: b.status().navn(),
            oppgave_id: b.oppgave_id().clone(),
            stonadsperiode: b.stonadsperiode().copied(),
            grunnlagsdata: b.grunnlagsdata().clone(),
            vilkarsvurderinger: b.vilkarsvurderinger().clone(),
            beregning: b.beregning().cloned(),
            sum_ytelse: b.beregning().map(|beregning| beregning.sum_ytelse()),
            simulering: b.simulering().cloned(),
            saksbehandler: b.saksbehandler().cloned(),
            fritekst_til_brev: b.fritekst_til_brev().to_string(),
            attesteringer: b.attesteringer().clone(),
            utbetaling_id: b.utbetaling_id(),
            eksterne_iverksettingssteg: b.eksterne_iverksettingssteg().cloned(),
            journalpost_id: b.journalpost_id().cloned(),
            brevbestilling_id: b.brevbestilling_id().cloned(),
            versjon: b.versjon(),
            opprettet: b.opprettet(),
            endret: b.endret(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_kommentar_fails_validation() {
        let request: UnderkjennRequest =
            serde_json::from_str(r#"{"grunn": "BEREGNINGEN_ER_FEIL", "kommentar": "   "}"#).unwrap();
        assert_eq!(request.kommentar, "");
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_unknown_grunn_is_rejected() {
        let result = serde_json::from_str::<UnderkjennRequest>(r#"{"grunn": "FORDI", "kommentar": "x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_fritekst_defaults_to_empty() {
        let request: TilAttesteringRequest = serde_json::from_str("{}").unwrap();
        assert!(request.fritekst.is_empty());
        assert!(request.validate().is_ok());
    }
}
