//! Test Data Builders
//!
//! Walks a [`Soknadsbehandling`] through the real aggregate operations up to
//! the status a test needs, so every built case is one the domain could
//! actually have produced.

use rust_decimal_macros::dec;

use core_kernel::{
    Attestant, BrevbestillingId, JournalpostId, Money, OppgaveId, Periode, Saksbehandler, UtbetalingId,
};
use domain_beregning::{BeregningFactory, Bosituasjon, Fradrag, FradragTilhorer, Fradragstype};
use domain_soknadsbehandling::ports::mock::simulering_for;
use domain_soknadsbehandling::{
    Iverksetting, Soknad, Soknadsbehandling, SoknadsbehandlingStatus, UnderkjentGrunn, Utfall,
};

use crate::fixtures::{IdentFixtures, PeriodeFixtures, SoknadFixtures, VilkarFixtures};

/// Builder for cases in any status
#[derive(Clone)]
pub struct SoknadsbehandlingBuilder {
    soknad: Soknad,
    periode: Periode,
    bosituasjon: Bosituasjon,
    fradrag: Vec<Fradrag>,
    saksbehandler: Saksbehandler,
    attestant: Attestant,
}

impl Default for SoknadsbehandlingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SoknadsbehandlingBuilder {
    /// Enslig uføre case for January 2021, no fradrag
    pub fn new() -> Self {
        Self {
            soknad: SoknadFixtures::soknad(),
            periode: PeriodeFixtures::januar_2021(),
            bosituasjon: Bosituasjon::Enslig,
            fradrag: Vec::new(),
            saksbehandler: IdentFixtures::saksbehandler(),
            attestant: IdentFixtures::attestant(),
        }
    }

    pub fn with_soknad(mut self, soknad: Soknad) -> Self {
        self.soknad = soknad;
        self
    }

    pub fn with_periode(mut self, periode: Periode) -> Self {
        self.periode = periode;
        self
    }

    pub fn with_bosituasjon(mut self, bosituasjon: Bosituasjon) -> Self {
        self.bosituasjon = bosituasjon;
        self
    }

    pub fn with_fradrag(mut self, fradrag: Vec<Fradrag>) -> Self {
        self.fradrag = fradrag;
        self
    }

    /// Arbeidsinntekt high enough to bring every month to zero
    pub fn with_for_hoy_inntekt(self) -> Self {
        let periode = self.periode;
        self.with_fradrag(vec![Fradrag::new(
            Fradragstype::Arbeidsinntekt,
            Money::nok(dec!(50000)),
            periode,
            FradragTilhorer::Bruker,
        )])
    }

    pub fn with_saksbehandler(mut self, saksbehandler: Saksbehandler) -> Self {
        self.saksbehandler = saksbehandler;
        self
    }

    pub fn with_attestant(mut self, attestant: Attestant) -> Self {
        self.attestant = attestant;
        self
    }

    pub fn soknad(&self) -> &Soknad {
        &self.soknad
    }

    pub fn saksbehandler(&self) -> &Saksbehandler {
        &self.saksbehandler
    }

    pub fn attestant(&self) -> &Attestant {
        &self.attestant
    }

    // ------------------------------------------------------------------
    // Statuses
    // ------------------------------------------------------------------

    /// Fresh case with periode and bosituasjon registered
    pub fn uavklart(&self) -> Soknadsbehandling {
        let oppgave_id = self
            .soknad
            .oppgave_id
            .clone()
            .unwrap_or_else(|| OppgaveId::new("oppgave-soknad"));
        let mut behandling = Soknadsbehandling::ny(&self.soknad, oppgave_id);
        behandling
            .oppdater_stonadsperiode(self.periode)
            .expect("stønadsperiode");
        behandling
            .leggtil_bosituasjon(self.bosituasjon)
            .expect("bosituasjon");
        if !self.fradrag.is_empty() {
            behandling
                .leggtil_fradrag(self.fradrag.clone())
                .expect("fradrag");
        }
        behandling
    }

    pub fn vilkarsvurdert_innvilget(&self) -> Soknadsbehandling {
        let mut behandling = self.uavklart();
        behandling
            .vilkarsvurder(VilkarFixtures::alle_innvilget(self.periode))
            .expect("vilkårsvurdering");
        behandling
    }

    pub fn vilkarsvurdert_avslag(&self) -> Soknadsbehandling {
        let mut behandling = self.uavklart();
        behandling
            .vilkarsvurder(VilkarFixtures::formue_avslag(self.periode))
            .expect("vilkårsvurdering");
        behandling
    }

    /// Beregnet; innvilget unless fradrag bring every month to zero
    pub fn beregnet(&self) -> Soknadsbehandling {
        let mut behandling = self.vilkarsvurdert_innvilget();
        behandling
            .beregn(&BeregningFactory::new(), None)
            .expect("beregning");
        behandling
    }

    pub fn beregnet_avslag(&self) -> Soknadsbehandling {
        self.clone().with_for_hoy_inntekt().beregnet()
    }

    pub fn simulert(&self) -> Soknadsbehandling {
        let mut behandling = self.beregnet();
        let simulering = match behandling.beregning() {
            Some(beregning) => simulering_for(behandling.fnr(), beregning),
            None => panic!("beregnet case without beregning"),
        };
        behandling
            .simuler(self.saksbehandler.clone(), simulering)
            .expect("simulering");
        behandling
    }

    pub fn til_attestering_innvilget(&self) -> Soknadsbehandling {
        let mut behandling = self.simulert();
        behandling
            .send_til_attestering(
                self.saksbehandler.clone(),
                "fritekst",
                OppgaveId::new("oppgave-attestering"),
            )
            .expect("til attestering");
        behandling
    }

    pub fn til_attestering_avslag(&self) -> Soknadsbehandling {
        let mut behandling = self.vilkarsvurdert_avslag();
        behandling
            .send_til_attestering(
                self.saksbehandler.clone(),
                "fritekst",
                OppgaveId::new("oppgave-attestering"),
            )
            .expect("til attestering");
        behandling
    }

    pub fn underkjent(&self, utfall: Utfall) -> Soknadsbehandling {
        let mut behandling = self.til_attestering(utfall);
        behandling
            .underkjenn(
                self.attestant.clone(),
                UnderkjentGrunn::BeregningenErFeil,
                "se over",
                OppgaveId::new("oppgave-underkjent"),
            )
            .expect("underkjenn");
        behandling
    }

    pub fn til_attestering(&self, utfall: Utfall) -> Soknadsbehandling {
        match utfall {
            Utfall::Innvilget => self.til_attestering_innvilget(),
            Utfall::Avslag => self.til_attestering_avslag(),
        }
    }

    /// Innvilget and waiting for the payment kvittering
    pub fn iverksatt_innvilget(&self, utbetaling_id: UtbetalingId) -> Soknadsbehandling {
        let mut behandling = self.til_attestering_innvilget();
        behandling
            .iverksett(self.attestant.clone(), Iverksetting::Innvilget { utbetaling_id })
            .expect("iverksett");
        behandling
    }

    /// Avslag with the vedtaksbrev already journaled
    pub fn iverksatt_avslag(&self, journalpost_id: JournalpostId) -> Soknadsbehandling {
        let mut behandling = self.til_attestering_avslag();
        behandling
            .iverksett(self.attestant.clone(), Iverksetting::Avslag { journalpost_id })
            .expect("iverksett");
        behandling
    }

    /// Innvilget, journaled and distributed
    pub fn ferdigstilt(&self) -> Soknadsbehandling {
        let mut behandling = self.iverksatt_innvilget(UtbetalingId::new_v7());
        behandling
            .journalfor(JournalpostId::new("jp-ferdig"))
            .expect("journalfør");
        behandling
            .distribuer(BrevbestillingId::new("bb-ferdig"))
            .expect("distribuer");
        behandling
    }

    /// A case in the given status
    pub fn med_status(&self, status: SoknadsbehandlingStatus) -> Soknadsbehandling {
        match status {
            SoknadsbehandlingStatus::Uavklart => self.uavklart(),
            SoknadsbehandlingStatus::Vilkarsvurdert(Utfall::Innvilget) => self.vilkarsvurdert_innvilget(),
            SoknadsbehandlingStatus::Vilkarsvurdert(Utfall::Avslag) => self.vilkarsvurdert_avslag(),
            SoknadsbehandlingStatus::Beregnet(Utfall::Innvilget) => self.beregnet(),
            SoknadsbehandlingStatus::Beregnet(Utfall::Avslag) => self.beregnet_avslag(),
            SoknadsbehandlingStatus::Simulert => self.simulert(),
            SoknadsbehandlingStatus::TilAttestering(utfall) => self.til_attestering(utfall),
            SoknadsbehandlingStatus::Underkjent(utfall) => self.underkjent(utfall),
            SoknadsbehandlingStatus::Iverksatt(Utfall::Innvilget) => self.iverksatt_innvilget(UtbetalingId::new_v7()),
            SoknadsbehandlingStatus::Iverksatt(Utfall::Avslag) => {
                self.iverksatt_avslag(JournalpostId::new("jp-avslag"))
            }
        }
    }
}
