//! Soknadsbehandling aggregate
//!
//! Every mutation goes through [`statusovergang::valider`], so an
//! `Iverksatt` case rejects all further changes. Changing grunnlag or
//! vilkår throws away any beregning and simulering and puts the case back
//! to the status the vilkårsvurdering gives.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::{
    Attestant, BehandlingId, BrevbestillingId, Fnr, JournalpostId, OppgaveId, Periode, SakId,
    Saksbehandler, Saksnummer, SoknadId, UtbetalingId,
};
use domain_beregning::{
    Beregning, BeregningFactory, BeregningInput, Bosituasjon, Fradrag, FradragTilhorer, Sakstype,
};

use crate::attestering::{Attestering, Attesteringshistorikk, UnderkjentGrunn};
use crate::error::SoknadsbehandlingError;
use crate::grunnlag::Grunnlagsdata;
use crate::iverksettingssteg::EksterneIverksettingssteg;
use crate::simulering::Simulering;
use crate::soknad::Soknad;
use crate::status::{SoknadsbehandlingStatus, Utfall};
use crate::statusovergang;
use crate::vilkar::{Vilkarsresultat, Vilkarsvurderinger};

/// Longest allowed stønadsperiode
pub const MAKS_MANEDER_I_STONADSPERIODE: usize = 12;

/// What the attestant's iverksetting produced downstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Iverksetting {
    /// Payment dispatched, waiting for the kvittering
    Innvilget { utbetaling_id: UtbetalingId },
    /// Avslag letter journaled as part of the iverksetting
    Avslag { journalpost_id: JournalpostId },
}

impl Iverksetting {
    pub fn utfall(&self) -> Utfall {
        match self {
            Iverksetting::Innvilget { .. } => Utfall::Innvilget,
            Iverksetting::Avslag { .. } => Utfall::Avslag,
        }
    }
}

/// One søknadsbehandling case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Soknadsbehandling {
    id: BehandlingId,
    sak_id: SakId,
    saksnummer: Saksnummer,
    soknad_id: SoknadId,
    fnr: Fnr,
    sakstype: Sakstype,
    oppgave_id: OppgaveId,
    status: SoknadsbehandlingStatus,
    vilkarsvurderinger: Vilkarsvurderinger,
    grunnlagsdata: Grunnlagsdata,
    stonadsperiode: Option<Periode>,
    beregning: Option<Beregning>,
    simulering: Option<Simulering>,
    saksbehandler: Option<Saksbehandler>,
    fritekst_til_brev: String,
    attesteringer: Attesteringshistorikk,
    utbetaling_id: Option<UtbetalingId>,
    eksterne_iverksettingssteg: Option<EksterneIverksettingssteg>,
    opprettet: DateTime<Utc>,
    endret: DateTime<Utc>,
    versjon: i64,
}

impl Soknadsbehandling {
    /// Starts a new case for a søknad, carrying the søknad's oppgave
    pub fn ny(soknad: &Soknad, oppgave_id: OppgaveId) -> Self {
        let now = Utc::now();
        Self {
            id: BehandlingId::new_v7(),
            sak_id: soknad.sak_id,
            saksnummer: soknad.saksnummer,
            soknad_id: soknad.id,
            fnr: soknad.fnr.clone(),
            sakstype: soknad.sakstype,
            oppgave_id,
            status: SoknadsbehandlingStatus::Uavklart,
            vilkarsvurderinger: Vilkarsvurderinger::ikke_vurdert(),
            grunnlagsdata: Grunnlagsdata::default(),
            stonadsperiode: None,
            beregning: None,
            simulering: None,
            saksbehandler: None,
            fritekst_til_brev: String::new(),
            attesteringer: Attesteringshistorikk::new(),
            utbetaling_id: None,
            eksterne_iverksettingssteg: None,
            opprettet: now,
            endret: now,
            versjon: 0,
        }
    }

    pub fn id(&self) -> BehandlingId {
        self.id
    }

    pub fn sak_id(&self) -> SakId {
        self.sak_id
    }

    pub fn saksnummer(&self) -> Saksnummer {
        self.saksnummer
    }

    pub fn soknad_id(&self) -> SoknadId {
        self.soknad_id
    }

    pub fn fnr(&self) -> &Fnr {
        &self.fnr
    }

    pub fn sakstype(&self) -> Sakstype {
        self.sakstype
    }

    pub fn oppgave_id(&self) -> &OppgaveId {
        &self.oppgave_id
    }

    pub fn status(&self) -> SoknadsbehandlingStatus {
        self.status
    }

    pub fn vilkarsvurderinger(&self) -> &Vilkarsvurderinger {
        &self.vilkarsvurderinger
    }

    pub fn grunnlagsdata(&self) -> &Grunnlagsdata {
        &self.grunnlagsdata
    }

    pub fn stonadsperiode(&self) -> Option<&Periode> {
        self.stonadsperiode.as_ref()
    }

    pub fn beregning(&self) -> Option<&Beregning> {
        self.beregning.as_ref()
    }

    pub fn simulering(&self) -> Option<&Simulering> {
        self.simulering.as_ref()
    }

    pub fn saksbehandler(&self) -> Option<&Saksbehandler> {
        self.saksbehandler.as_ref()
    }

    pub fn fritekst_til_brev(&self) -> &str {
        &self.fritekst_til_brev
    }

    pub fn attesteringer(&self) -> &Attesteringshistorikk {
        &self.attesteringer
    }

    pub fn utbetaling_id(&self) -> Option<UtbetalingId> {
        self.utbetaling_id
    }

    pub fn eksterne_iverksettingssteg(&self) -> Option<&EksterneIverksettingssteg> {
        self.eksterne_iverksettingssteg.as_ref()
    }

    pub fn journalpost_id(&self) -> Option<&JournalpostId> {
        self.eksterne_iverksettingssteg.as_ref().and_then(|s| s.journalpost_id())
    }

    pub fn brevbestilling_id(&self) -> Option<&BrevbestillingId> {
        self.eksterne_iverksettingssteg.as_ref().and_then(|s| s.brevbestilling_id())
    }

    pub fn opprettet(&self) -> DateTime<Utc> {
        self.opprettet
    }

    pub fn endret(&self) -> DateTime<Utc> {
        self.endret
    }

    pub fn versjon(&self) -> i64 {
        self.versjon
    }

    /// The attestant who last sent the case back, if it was underkjent
    pub fn forrige_attestant(&self) -> Option<&Attestant> {
        match self.attesteringer.siste() {
            Some(a) if a.er_underkjent() => Some(a.attestant()),
            _ => None,
        }
    }

    /// Checks whether the case may move to `til` from its current status
    pub fn kan_ga_til(&self, til: SoknadsbehandlingStatus) -> Result<(), SoknadsbehandlingError> {
        statusovergang::valider(self.status, til)
    }

    /// Bumps the optimistic-locking version before a write
    pub fn oppdater_versjon(&mut self) {
        self.versjon += 1;
        self.endret = Utc::now();
    }

    fn vilkarsstatus(&self) -> SoknadsbehandlingStatus {
        match self.vilkarsvurderinger.resultat() {
            Vilkarsresultat::Innvilget => SoknadsbehandlingStatus::Vilkarsvurdert(Utfall::Innvilget),
            Vilkarsresultat::Avslag => SoknadsbehandlingStatus::Vilkarsvurdert(Utfall::Avslag),
            Vilkarsresultat::Uavklart => SoknadsbehandlingStatus::Uavklart,
        }
    }

    fn tilbakestill(&mut self) {
        self.beregning = None;
        self.simulering = None;
        self.status = self.vilkarsstatus();
    }

    /// Sets the stønadsperiode
    ///
    /// The periode must be whole months, at most 12 of them, and start no
    /// earlier than January 2021. Fradrag that fall outside the new periode
    /// are dropped.
    pub fn oppdater_stonadsperiode(&mut self, periode: Periode) -> Result<(), SoknadsbehandlingError> {
        self.kan_ga_til(self.vilkarsstatus())?;

        if !periode.er_hele_maneder() {
            return Err(SoknadsbehandlingError::UgyldigPeriode(
                "stønadsperioden må bestå av hele måneder".to_string(),
            ));
        }
        if periode.antall_maneder() > MAKS_MANEDER_I_STONADSPERIODE {
            return Err(SoknadsbehandlingError::UgyldigPeriode(
                "stønadsperioden kan ikke være lenger enn 12 måneder".to_string(),
            ));
        }
        let tidligste = NaiveDate::from_ymd_opt(2021, 1, 1);
        if tidligste.is_some_and(|d| periode.fra_og_med() < d) {
            return Err(SoknadsbehandlingError::UgyldigPeriode(
                "stønadsperioden kan ikke starte før januar 2021".to_string(),
            ));
        }

        let antall_for = self.grunnlagsdata.fradrag.len();
        self.grunnlagsdata.fradrag.retain(|f| periode.inneholder(&f.periode));
        if self.grunnlagsdata.fradrag.len() != antall_for {
            debug!(behandling_id = %self.id, "dropped fradrag outside new stønadsperiode");
        }

        self.stonadsperiode = Some(periode);
        self.tilbakestill();
        Ok(())
    }

    pub fn leggtil_bosituasjon(&mut self, bosituasjon: Bosituasjon) -> Result<(), SoknadsbehandlingError> {
        self.kan_ga_til(self.vilkarsstatus())?;

        let har_eps_fradrag = self
            .grunnlagsdata
            .fradrag
            .iter()
            .any(|f| f.tilhorer == FradragTilhorer::Eps);
        if !bosituasjon.har_eps() && (self.vilkarsvurderinger.har_eps_data() || har_eps_fradrag) {
            return Err(SoknadsbehandlingError::HarIkkeEktefelle);
        }

        self.grunnlagsdata.bosituasjon = Some(bosituasjon);
        self.tilbakestill();
        Ok(())
    }

    /// Replaces the registered fradrag
    pub fn leggtil_fradrag(&mut self, fradrag: Vec<Fradrag>) -> Result<(), SoknadsbehandlingError> {
        self.kan_ga_til(self.vilkarsstatus())?;

        let stonadsperiode = self
            .stonadsperiode
            .ok_or(SoknadsbehandlingError::ManglerStonadsperiode)?;
        Grunnlagsdata::valider_fradrag(&fradrag, &stonadsperiode)?;
        if !self.grunnlagsdata.har_eps() && fradrag.iter().any(|f| f.tilhorer == FradragTilhorer::Eps) {
            return Err(SoknadsbehandlingError::HarIkkeEktefelle);
        }

        self.grunnlagsdata.fradrag = fradrag;
        self.tilbakestill();
        Ok(())
    }

    /// Records the vilkårsvurdering; status becomes Uavklart or Vilkarsvurdert(resultat)
    pub fn vilkarsvurder(&mut self, vilkarsvurderinger: Vilkarsvurderinger) -> Result<(), SoknadsbehandlingError> {
        if vilkarsvurderinger.har_eps_data() && !self.grunnlagsdata.har_eps() {
            return Err(SoknadsbehandlingError::HarIkkeEktefelle);
        }

        let for_status = self.status;
        let forrige = std::mem::replace(&mut self.vilkarsvurderinger, vilkarsvurderinger);
        if let Err(e) = self.kan_ga_til(self.vilkarsstatus()) {
            self.vilkarsvurderinger = forrige;
            return Err(e);
        }

        self.tilbakestill();
        debug!(behandling_id = %self.id, fra = %for_status, til = %self.status, "vilkårsvurdert");
        Ok(())
    }

    /// Runs the beregning; all-zero months give Beregnet(Avslag)
    pub fn beregn(
        &mut self,
        factory: &BeregningFactory,
        begrunnelse: Option<String>,
    ) -> Result<Utfall, SoknadsbehandlingError> {
        self.kan_ga_til(SoknadsbehandlingStatus::Beregnet(Utfall::Innvilget))?;
        if self.vilkarsvurderinger.resultat() != Vilkarsresultat::Innvilget {
            return Err(SoknadsbehandlingError::ugyldig_overgang(
                self.status,
                SoknadsbehandlingStatus::Beregnet(Utfall::Avslag),
            ));
        }

        let periode = self
            .stonadsperiode
            .ok_or(SoknadsbehandlingError::ManglerStonadsperiode)?;
        let bosituasjon = self
            .grunnlagsdata
            .bosituasjon
            .ok_or(SoknadsbehandlingError::ManglerBosituasjon)?;
        let uforegrunnlag = match self.sakstype {
            Sakstype::Ufore => self.vilkarsvurderinger.uforegrunnlag().cloned().into_iter().collect(),
            Sakstype::Alder => Vec::new(),
        };

        let beregning = factory.beregn(BeregningInput {
            periode,
            sakstype: self.sakstype,
            bosituasjon,
            fradrag: self.grunnlagsdata.fradrag.clone(),
            uforegrunnlag,
            begrunnelse,
        })?;

        let utfall = if beregning.alle_maneder_er_null() {
            Utfall::Avslag
        } else {
            Utfall::Innvilget
        };
        self.beregning = Some(beregning);
        self.simulering = None;
        self.status = SoknadsbehandlingStatus::Beregnet(utfall);
        Ok(utfall)
    }

    /// Stores a simulering the caller has checked against the beregning
    pub fn simuler(
        &mut self,
        saksbehandler: Saksbehandler,
        simulering: Simulering,
    ) -> Result<(), SoknadsbehandlingError> {
        self.kan_ga_til(SoknadsbehandlingStatus::Simulert)?;
        if self.beregning.is_none() {
            return Err(SoknadsbehandlingError::ManglerBeregning);
        }

        self.saksbehandler = Some(saksbehandler);
        self.simulering = Some(simulering);
        self.status = SoknadsbehandlingStatus::Simulert;
        Ok(())
    }

    /// The TilAttestering status the case would move to, if allowed
    pub fn status_til_attestering(&self) -> Result<SoknadsbehandlingStatus, SoknadsbehandlingError> {
        let utfall = self.status.utfall().unwrap_or(Utfall::Innvilget);
        let til = SoknadsbehandlingStatus::TilAttestering(utfall);
        self.kan_ga_til(til)?;
        if utfall == Utfall::Innvilget && self.simulering.is_none() {
            return Err(SoknadsbehandlingError::ManglerSimulering);
        }
        Ok(til)
    }

    /// Sends the case to attestering, returning the oppgave it replaces
    pub fn send_til_attestering(
        &mut self,
        saksbehandler: Saksbehandler,
        fritekst_til_brev: impl Into<String>,
        attesteringsoppgave: OppgaveId,
    ) -> Result<OppgaveId, SoknadsbehandlingError> {
        let til = self.status_til_attestering()?;

        self.saksbehandler = Some(saksbehandler);
        self.fritekst_til_brev = fritekst_til_brev.into();
        self.status = til;
        Ok(std::mem::replace(&mut self.oppgave_id, attesteringsoppgave))
    }

    fn kontroller_attestant(
        &self,
        attestant: &Attestant,
        til: fn(Utfall) -> SoknadsbehandlingStatus,
    ) -> Result<Utfall, SoknadsbehandlingError> {
        if self
            .saksbehandler
            .as_ref()
            .is_some_and(|s| attestant.er_samme_person_som(s))
        {
            return Err(SoknadsbehandlingError::AttestantOgSaksbehandlerKanIkkeVaereSammePerson);
        }
        match self.status {
            SoknadsbehandlingStatus::TilAttestering(utfall) => Ok(utfall),
            fra => Err(SoknadsbehandlingError::ugyldig_overgang(
                fra,
                til(fra.utfall().unwrap_or(Utfall::Innvilget)),
            )),
        }
    }

    /// Same-person guard first, then the TilAttestering requirement
    pub fn kan_iverksettes(&self, attestant: &Attestant) -> Result<Utfall, SoknadsbehandlingError> {
        self.kontroller_attestant(attestant, SoknadsbehandlingStatus::Iverksatt)
    }

    pub fn kan_underkjennes(&self, attestant: &Attestant) -> Result<Utfall, SoknadsbehandlingError> {
        self.kontroller_attestant(attestant, SoknadsbehandlingStatus::Underkjent)
    }

    /// Sends the case back to the saksbehandler, returning the oppgave it replaces
    pub fn underkjenn(
        &mut self,
        attestant: Attestant,
        grunn: UnderkjentGrunn,
        kommentar: impl Into<String>,
        behandlingsoppgave: OppgaveId,
    ) -> Result<OppgaveId, SoknadsbehandlingError> {
        let utfall = self.kan_underkjennes(&attestant)?;

        self.attesteringer
            .legg_til(Attestering::underkjent(attestant, grunn, kommentar));
        self.status = SoknadsbehandlingStatus::Underkjent(utfall);
        Ok(std::mem::replace(&mut self.oppgave_id, behandlingsoppgave))
    }

    /// Marks the case iverksatt
    ///
    /// Innvilget cases wait for the payment kvittering before journaling;
    /// avslag cases are journaled already.
    pub fn iverksett(
        &mut self,
        attestant: Attestant,
        iverksetting: Iverksetting,
    ) -> Result<(), SoknadsbehandlingError> {
        let utfall = self.kan_iverksettes(&attestant)?;
        if iverksetting.utfall() != utfall {
            return Err(SoknadsbehandlingError::ugyldig_overgang(
                self.status,
                SoknadsbehandlingStatus::Iverksatt(iverksetting.utfall()),
            ));
        }

        let steg = EksterneIverksettingssteg::VenterPaKvittering;
        self.eksterne_iverksettingssteg = Some(match iverksetting {
            Iverksetting::Innvilget { utbetaling_id } => {
                self.utbetaling_id = Some(utbetaling_id);
                steg
            }
            Iverksetting::Avslag { journalpost_id } => steg.journalfor(journalpost_id)?,
        });
        self.attesteringer.legg_til(Attestering::iverksatt(attestant));
        self.status = SoknadsbehandlingStatus::Iverksatt(utfall);
        Ok(())
    }

    pub fn journalfor(&mut self, journalpost_id: JournalpostId) -> Result<(), SoknadsbehandlingError> {
        let steg = self
            .eksterne_iverksettingssteg
            .as_ref()
            .ok_or(SoknadsbehandlingError::IkkeIverksatt)?;
        self.eksterne_iverksettingssteg = Some(steg.journalfor(journalpost_id)?);
        Ok(())
    }

    pub fn distribuer(&mut self, brevbestilling_id: BrevbestillingId) -> Result<(), SoknadsbehandlingError> {
        let steg = self
            .eksterne_iverksettingssteg
            .as_ref()
            .ok_or(SoknadsbehandlingError::IkkeIverksatt)?;
        self.eksterne_iverksettingssteg = Some(steg.distribuer(brevbestilling_id)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{Maned, NavIdent};

    fn soknad() -> Soknad {
        Soknad {
            id: SoknadId::new(),
            sak_id: SakId::new(),
            saksnummer: Saksnummer::new(2021).unwrap(),
            fnr: "12345678901".parse().unwrap(),
            sakstype: Sakstype::Ufore,
            opprettet: Utc::now(),
            oppgave_id: Some(OppgaveId::from("o-1")),
            journalpost_id: None,
            lukket: None,
        }
    }

    fn periode(fra: (i32, u32), til: (i32, u32)) -> Periode {
        Periode::for_maneder(Maned::new(fra.0, fra.1).unwrap(), Maned::new(til.0, til.1).unwrap()).unwrap()
    }

    #[test]
    fn test_new_case_is_uavklart() {
        let behandling = Soknadsbehandling::ny(&soknad(), OppgaveId::from("o-1"));
        assert_eq!(behandling.status(), SoknadsbehandlingStatus::Uavklart);
        assert_eq!(behandling.versjon(), 0);
        assert!(behandling.eksterne_iverksettingssteg().is_none());
    }

    #[test]
    fn test_stonadsperiode_rules() {
        let mut behandling = Soknadsbehandling::ny(&soknad(), OppgaveId::from("o-1"));

        assert!(behandling.oppdater_stonadsperiode(periode((2021, 1), (2021, 12))).is_ok());
        assert!(matches!(
            behandling.oppdater_stonadsperiode(periode((2021, 1), (2022, 1))),
            Err(SoknadsbehandlingError::UgyldigPeriode(_))
        ));
        assert!(matches!(
            behandling.oppdater_stonadsperiode(periode((2020, 12), (2021, 11))),
            Err(SoknadsbehandlingError::UgyldigPeriode(_))
        ));
        let delvis = Periode::new(
            NaiveDate::from_ymd_opt(2021, 1, 15).unwrap(),
            NaiveDate::from_ymd_opt(2021, 6, 30).unwrap(),
        )
        .unwrap();
        assert!(matches!(
            behandling.oppdater_stonadsperiode(delvis),
            Err(SoknadsbehandlingError::UgyldigPeriode(_))
        ));
    }

    #[test]
    fn test_stonadsperiode_ending_at_max_date_is_rejected() {
        let mut behandling = Soknadsbehandling::ny(&soknad(), OppgaveId::from("o-1"));
        let apen = Periode::new(NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(), NaiveDate::MAX).unwrap();

        assert!(matches!(
            behandling.oppdater_stonadsperiode(apen),
            Err(SoknadsbehandlingError::UgyldigPeriode(_))
        ));
        assert!(behandling.stonadsperiode().is_none());
    }

    #[test]
    fn test_fradrag_requires_stonadsperiode() {
        let mut behandling = Soknadsbehandling::ny(&soknad(), OppgaveId::from("o-1"));
        assert_eq!(
            behandling.leggtil_fradrag(Vec::new()),
            Err(SoknadsbehandlingError::ManglerStonadsperiode)
        );
    }

    #[test]
    fn test_beregn_needs_innvilget_vilkar() {
        let mut behandling = Soknadsbehandling::ny(&soknad(), OppgaveId::from("o-1"));
        behandling.oppdater_stonadsperiode(periode((2021, 1), (2021, 12))).unwrap();

        let result = behandling.beregn(&BeregningFactory::new(), None);
        assert!(matches!(result, Err(SoknadsbehandlingError::UgyldigStatusovergang { .. })));
    }

    #[test]
    fn test_underkjenn_from_uavklart_is_illegal() {
        let mut behandling = Soknadsbehandling::ny(&soknad(), OppgaveId::from("o-1"));
        let attestant = Attestant(NavIdent::new("A1").unwrap());

        let result = behandling.underkjenn(
            attestant,
            UnderkjentGrunn::AndreForhold,
            "nei",
            OppgaveId::from("o-2"),
        );
        assert!(matches!(result, Err(SoknadsbehandlingError::UgyldigStatusovergang { .. })));
        assert!(behandling.attesteringer().is_empty());
    }

    #[test]
    fn test_eps_formue_without_eps_is_rejected() {
        let mut behandling = Soknadsbehandling::ny(&soknad(), OppgaveId::from("o-1"));
        behandling.leggtil_bosituasjon(Bosituasjon::Enslig).unwrap();

        let mut vurderinger = Vilkarsvurderinger::ikke_vurdert();
        vurderinger.formue.formue_eps = Some(core_kernel::Money::zero(core_kernel::Currency::NOK));
        assert_eq!(
            behandling.vilkarsvurder(vurderinger),
            Err(SoknadsbehandlingError::HarIkkeEktefelle)
        );
    }

    #[test]
    fn test_snapshot_roundtrips_through_json() {
        let behandling = Soknadsbehandling::ny(&soknad(), OppgaveId::from("o-1"));
        let json = serde_json::to_value(&behandling).unwrap();
        let tilbake: Soknadsbehandling = serde_json::from_value(json).unwrap();
        assert_eq!(tilbake, behandling);
    }
}
