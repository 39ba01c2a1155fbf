//! The søknadsbehandling service

use std::sync::Arc;

use tracing::{error, info, warn};

use core_kernel::{Attestant, BehandlingId, Periode, Saksbehandler, SoknadId};
use domain_beregning::{BeregningFactory, Bosituasjon, Fradrag};

use super::{lag_brev_request, lagre_behandling, publiser, BrevgrunnlagFeil, FerdigstillIverksettingService, Ports};
use crate::attestering::UnderkjentGrunn;
use crate::behandling::{Iverksetting, Soknadsbehandling};
use crate::error::{
    KunneIkkeBeregne, KunneIkkeHente, KunneIkkeIverksette, KunneIkkeLageBrevutkast, KunneIkkeOppdatere,
    KunneIkkeOpprette, KunneIkkeSendeTilAttestering, KunneIkkeSimulere, KunneIkkeUnderkjenne,
    KunneIkkeVilkarsvurdere, SoknadsbehandlingError,
};
use crate::events::{StatistikkEvent, StatistikkObserver};
use crate::ports::OppgaveConfig;
use crate::status::{SoknadsbehandlingStatus, Utfall};
use crate::vilkar::Vilkarsvurderinger;

/// Drives a case from intake to iverksetting
///
/// Each operation loads the case, applies the aggregate's rules, calls the
/// downstream ports it needs, persists and notifies observers. Nothing is
/// persisted when an operation fails.
///
/// # Example
///
/// ```rust,ignore
/// let service = SoknadsbehandlingService::new(ports)
///     .with_observer(Arc::new(LoggingStatistikkObserver));
///
/// let behandling = service.opprett(soknad_id).await?;
/// service.oppdater_stonadsperiode(behandling.id(), periode).await?;
/// ```
#[derive(Clone)]
pub struct SoknadsbehandlingService {
    ports: Ports,
    observers: Vec<Arc<dyn StatistikkObserver>>,
    beregning_factory: BeregningFactory,
    ferdigstill: FerdigstillIverksettingService,
}

impl SoknadsbehandlingService {
    pub fn new(ports: Ports) -> Self {
        Self {
            ferdigstill: FerdigstillIverksettingService::new(ports.clone()),
            ports,
            observers: Vec::new(),
            beregning_factory: BeregningFactory::new(),
        }
    }

    /// Adds a statistics observer; observers are called in the order added
    pub fn with_observer(mut self, observer: Arc<dyn StatistikkObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Replaces the beregning factory, e.g. to pin the satser
    pub fn with_beregning_factory(mut self, factory: BeregningFactory) -> Self {
        self.beregning_factory = factory;
        self
    }

    /// Starts a case for a søknad
    ///
    /// # Errors
    ///
    /// * `FantIkkeSoknad` - no søknad with that id
    /// * `SoknadErLukket` - the søknad was closed
    /// * `SoknadManglerOppgave` - the søknad has no oppgave to carry over
    /// * `SoknadHarAlleredeBehandling` - a case exists for this søknad
    /// * `HarAlleredeAapenBehandling` - another case on the sak is not iverksatt
    pub async fn opprett(&self, soknad_id: SoknadId) -> Result<Soknadsbehandling, KunneIkkeOpprette> {
        let soknad = self
            .ports
            .soknader
            .hent_soknad(soknad_id)
            .await?
            .ok_or(KunneIkkeOpprette::FantIkkeSoknad)?;
        if soknad.er_lukket() {
            return Err(KunneIkkeOpprette::SoknadErLukket);
        }
        let oppgave_id = soknad
            .oppgave_id
            .clone()
            .ok_or(KunneIkkeOpprette::SoknadManglerOppgave)?;
        if self.ports.behandlinger.hent_for_soknad(soknad_id).await?.is_some() {
            return Err(KunneIkkeOpprette::SoknadHarAlleredeBehandling);
        }
        let pa_saken = self.ports.behandlinger.hent_for_sak(soknad.sak_id).await?;
        if pa_saken.iter().any(|b| !b.status().er_iverksatt()) {
            return Err(KunneIkkeOpprette::HarAlleredeAapenBehandling);
        }

        let mut behandling = Soknadsbehandling::ny(&soknad, oppgave_id);
        lagre_behandling(self.ports.behandlinger.as_ref(), &mut behandling).await?;

        info!(behandling_id = %behandling.id(), sak_id = %behandling.sak_id(), "søknadsbehandling opprettet");
        publiser(&self.observers, StatistikkEvent::opprettet(&behandling));
        Ok(behandling)
    }

    pub async fn hent(&self, id: BehandlingId) -> Result<Soknadsbehandling, KunneIkkeHente> {
        self.ports
            .behandlinger
            .hent(id)
            .await?
            .ok_or(KunneIkkeHente::FantIkkeBehandling)
    }

    async fn oppdater(
        &self,
        id: BehandlingId,
        endring: impl FnOnce(&mut Soknadsbehandling) -> Result<(), SoknadsbehandlingError>,
    ) -> Result<Soknadsbehandling, KunneIkkeOppdatere> {
        let mut behandling = self
            .ports
            .behandlinger
            .hent(id)
            .await?
            .ok_or(KunneIkkeOppdatere::FantIkkeBehandling)?;
        endring(&mut behandling)?;
        lagre_behandling(self.ports.behandlinger.as_ref(), &mut behandling).await?;
        Ok(behandling)
    }

    /// Sets the stønadsperiode: whole months, at most 12, from January 2021
    pub async fn oppdater_stonadsperiode(
        &self,
        id: BehandlingId,
        periode: Periode,
    ) -> Result<Soknadsbehandling, KunneIkkeOppdatere> {
        let behandling = self.oppdater(id, |b| b.oppdater_stonadsperiode(periode)).await?;
        info!(behandling_id = %id, %periode, "stønadsperiode oppdatert");
        Ok(behandling)
    }

    pub async fn leggtil_bosituasjon(
        &self,
        id: BehandlingId,
        bosituasjon: Bosituasjon,
    ) -> Result<Soknadsbehandling, KunneIkkeOppdatere> {
        self.oppdater(id, |b| b.leggtil_bosituasjon(bosituasjon)).await
    }

    /// Replaces the fradrag; they must lie within the stønadsperiode
    pub async fn leggtil_fradrag(
        &self,
        id: BehandlingId,
        fradrag: Vec<Fradrag>,
    ) -> Result<Soknadsbehandling, KunneIkkeOppdatere> {
        self.oppdater(id, |b| b.leggtil_fradrag(fradrag)).await
    }

    pub async fn vilkarsvurder(
        &self,
        id: BehandlingId,
        vilkarsvurderinger: Vilkarsvurderinger,
    ) -> Result<Soknadsbehandling, KunneIkkeVilkarsvurdere> {
        let mut behandling = self
            .ports
            .behandlinger
            .hent(id)
            .await?
            .ok_or(KunneIkkeVilkarsvurdere::FantIkkeBehandling)?;
        behandling.vilkarsvurder(vilkarsvurderinger)?;
        lagre_behandling(self.ports.behandlinger.as_ref(), &mut behandling).await?;

        info!(behandling_id = %id, status = %behandling.status(), "vilkårsvurdert");
        Ok(behandling)
    }

    /// Runs the beregning
    ///
    /// Gives Beregnet(Avslag) when no month pays anything.
    pub async fn beregn(
        &self,
        id: BehandlingId,
        begrunnelse: Option<String>,
    ) -> Result<Soknadsbehandling, KunneIkkeBeregne> {
        let mut behandling = self
            .ports
            .behandlinger
            .hent(id)
            .await?
            .ok_or(KunneIkkeBeregne::FantIkkeBehandling)?;
        let utfall = behandling.beregn(&self.beregning_factory, begrunnelse)?;
        lagre_behandling(self.ports.behandlinger.as_ref(), &mut behandling).await?;

        info!(behandling_id = %id, ?utfall, "beregnet");
        Ok(behandling)
    }

    /// Simulates the payout and checks it against the beregning
    pub async fn simuler(
        &self,
        id: BehandlingId,
        saksbehandler: Saksbehandler,
    ) -> Result<Soknadsbehandling, KunneIkkeSimulere> {
        let mut behandling = self
            .ports
            .behandlinger
            .hent(id)
            .await?
            .ok_or(KunneIkkeSimulere::FantIkkeBehandling)?;
        behandling.kan_ga_til(SoknadsbehandlingStatus::Simulert)?;

        let beregning = behandling.beregning().ok_or(SoknadsbehandlingError::ManglerBeregning)?;
        let simulering = self
            .ports
            .utbetaling
            .simuler_utbetaling(behandling.sak_id(), behandling.fnr(), &saksbehandler, beregning)
            .await
            .map_err(|e| {
                warn!(behandling_id = %id, error = %e, "simulering failed");
                KunneIkkeSimulere::SimuleringFeilet(e)
            })?;
        if !simulering.stemmer_med(beregning) {
            warn!(behandling_id = %id, "simulering does not match beregning");
            return Err(KunneIkkeSimulere::SimuleringStemmerIkkeMedBeregning);
        }

        behandling.simuler(saksbehandler, simulering)?;
        lagre_behandling(self.ports.behandlinger.as_ref(), &mut behandling).await?;

        info!(behandling_id = %id, "simulert");
        Ok(behandling)
    }

    /// Sends the case to attestering
    ///
    /// Creates an attestering oppgave, assigned to the attestant who last
    /// sent the case back if there is one, and closes the old oppgave.
    pub async fn send_til_attestering(
        &self,
        id: BehandlingId,
        saksbehandler: Saksbehandler,
        fritekst_til_brev: String,
    ) -> Result<Soknadsbehandling, KunneIkkeSendeTilAttestering> {
        let mut behandling = self
            .ports
            .behandlinger
            .hent(id)
            .await?
            .ok_or(KunneIkkeSendeTilAttestering::FantIkkeBehandling)?;
        behandling.status_til_attestering()?;

        let aktor_id = self.ports.person.hent_aktor_id(behandling.fnr()).await.map_err(|e| {
            warn!(behandling_id = %id, error = %e, "could not look up aktør-id");
            KunneIkkeSendeTilAttestering::KunneIkkeFinneAktorId
        })?;
        let config = OppgaveConfig::Attestering {
            soknad_id: behandling.soknad_id(),
            aktor_id,
            tilordnet: behandling.forrige_attestant().map(|a| a.nav_ident().clone()),
        };
        let attesteringsoppgave = self.ports.oppgave.opprett_oppgave(config).await.map_err(|e| {
            warn!(behandling_id = %id, error = %e, "could not create attestering oppgave");
            KunneIkkeSendeTilAttestering::KunneIkkeOppretteOppgave
        })?;

        let gammel_oppgave = behandling.send_til_attestering(saksbehandler, fritekst_til_brev, attesteringsoppgave)?;
        lagre_behandling(self.ports.behandlinger.as_ref(), &mut behandling).await?;

        if let Err(e) = self.ports.oppgave.lukk_oppgave(&gammel_oppgave).await {
            error!(behandling_id = %id, oppgave_id = %gammel_oppgave, error = %e, "could not close behandling oppgave");
        }

        info!(behandling_id = %id, status = %behandling.status(), "sendt til attestering");
        publiser(&self.observers, StatistikkEvent::til_attestering(&behandling));
        Ok(behandling)
    }

    /// Sends the case back to the saksbehandler
    ///
    /// # Errors
    ///
    /// * `AttestantOgSaksbehandlerKanIkkeVaereSammePerson` - checked before anything else
    /// * `UgyldigStatusovergang` - the case is not til attestering
    /// * `KunneIkkeFinneAktorId`, `KunneIkkeOppretteOppgave` - downstream failures
    pub async fn underkjenn(
        &self,
        id: BehandlingId,
        attestant: Attestant,
        grunn: UnderkjentGrunn,
        kommentar: String,
    ) -> Result<Soknadsbehandling, KunneIkkeUnderkjenne> {
        let mut behandling = self
            .ports
            .behandlinger
            .hent(id)
            .await?
            .ok_or(KunneIkkeUnderkjenne::FantIkkeBehandling)?;
        behandling.kan_underkjennes(&attestant)?;
        let saksbehandler = behandling
            .saksbehandler()
            .cloned()
            .ok_or(SoknadsbehandlingError::ManglerSaksbehandler)?;

        let aktor_id = self.ports.person.hent_aktor_id(behandling.fnr()).await.map_err(|e| {
            warn!(behandling_id = %id, error = %e, "could not look up aktør-id");
            KunneIkkeUnderkjenne::KunneIkkeFinneAktorId
        })?;
        let config = OppgaveConfig::Saksbehandling {
            soknad_id: behandling.soknad_id(),
            aktor_id,
            tilordnet: Some(saksbehandler.nav_ident().clone()),
        };
        let behandlingsoppgave = self.ports.oppgave.opprett_oppgave(config).await.map_err(|e| {
            warn!(behandling_id = %id, error = %e, "could not create behandling oppgave");
            KunneIkkeUnderkjenne::KunneIkkeOppretteOppgave
        })?;

        let attesteringsoppgave = behandling.underkjenn(attestant, grunn, kommentar, behandlingsoppgave)?;
        lagre_behandling(self.ports.behandlinger.as_ref(), &mut behandling).await?;

        if let Err(e) = self.ports.oppgave.lukk_oppgave(&attesteringsoppgave).await {
            error!(behandling_id = %id, oppgave_id = %attesteringsoppgave, error = %e, "could not close attestering oppgave");
        }

        info!(behandling_id = %id, ?grunn, "underkjent");
        publiser(&self.observers, StatistikkEvent::underkjent(&behandling));
        Ok(behandling)
    }

    /// Iverksetter the case
    ///
    /// Innvilget cases are paid first; the letter follows when the
    /// kvittering arrives. Avslag cases are journaled before they are
    /// stored, then distributed and the oppgave closed right after.
    /// Exactly one `SoknadsbehandlingIverksatt` event is published.
    pub async fn iverksett(
        &self,
        id: BehandlingId,
        attestant: Attestant,
    ) -> Result<Soknadsbehandling, KunneIkkeIverksette> {
        let mut behandling = self
            .ports
            .behandlinger
            .hent(id)
            .await?
            .ok_or(KunneIkkeIverksette::FantIkkeBehandling)?;
        let utfall = behandling.kan_iverksettes(&attestant)?;

        let iverksetting = match utfall {
            Utfall::Innvilget => {
                let beregning = behandling.beregning().ok_or(SoknadsbehandlingError::ManglerBeregning)?;
                let simulering = behandling.simulering().ok_or(SoknadsbehandlingError::ManglerSimulering)?;
                let utbetaling_id = self
                    .ports
                    .utbetaling
                    .utbetal(behandling.sak_id(), &attestant, beregning, simulering)
                    .await
                    .map_err(|e| {
                        warn!(behandling_id = %id, error = %e, "utbetaling failed");
                        KunneIkkeIverksette::from(e)
                    })?;
                Iverksetting::Innvilget { utbetaling_id }
            }
            Utfall::Avslag => {
                let request = lag_brev_request(
                    &self.ports,
                    &behandling,
                    Utfall::Avslag,
                    behandling.saksbehandler(),
                    Some(&attestant),
                )
                .await
                .map_err(|e| match e {
                    BrevgrunnlagFeil::FantIkkePerson => KunneIkkeIverksette::FantIkkePerson,
                    BrevgrunnlagFeil::FikkIkkeHentetSaksbehandlerEllerAttestant => {
                        KunneIkkeIverksette::FikkIkkeHentetSaksbehandlerEllerAttestant
                    }
                })?;
                let journalpost_id = self
                    .ports
                    .brev
                    .journalfor_brev(request, behandling.saksnummer())
                    .await
                    .map_err(|e| {
                        warn!(behandling_id = %id, error = %e, "journaling of avslag failed");
                        KunneIkkeIverksette::KunneIkkeJournalforeBrev
                    })?;
                Iverksetting::Avslag { journalpost_id }
            }
        };

        behandling.iverksett(attestant, iverksetting)?;
        lagre_behandling(self.ports.behandlinger.as_ref(), &mut behandling).await?;

        info!(behandling_id = %id, ?utfall, "iverksatt");
        publiser(&self.observers, StatistikkEvent::iverksatt(&behandling));

        if utfall == Utfall::Avslag {
            let resultat = self
                .ferdigstill
                .ferdigstill_iverksetting_for_behandling(&mut behandling)
                .await;
            if let Some(Err(e)) = &resultat.brevbestilling {
                warn!(behandling_id = %id, error = %e, "avslag distribution left for the batch");
            }
        }
        Ok(behandling)
    }

    /// Renders the vedtaksbrev the case would get, without journaling it
    pub async fn lag_brevutkast(
        &self,
        id: BehandlingId,
        saksbehandler: Saksbehandler,
    ) -> Result<Vec<u8>, KunneIkkeLageBrevutkast> {
        let behandling = self
            .ports
            .behandlinger
            .hent(id)
            .await?
            .ok_or(KunneIkkeLageBrevutkast::FantIkkeBehandling)?;
        let utfall = behandling
            .status()
            .utfall()
            .ok_or(KunneIkkeLageBrevutkast::ManglerUtfall)?;
        let attestant = behandling.attesteringer().siste().map(|a| a.attestant().clone());

        let request = lag_brev_request(
            &self.ports,
            &behandling,
            utfall,
            Some(behandling.saksbehandler().unwrap_or(&saksbehandler)),
            attestant.as_ref(),
        )
        .await
        .map_err(|e| match e {
            BrevgrunnlagFeil::FantIkkePerson => KunneIkkeLageBrevutkast::FantIkkePerson,
            BrevgrunnlagFeil::FikkIkkeHentetSaksbehandlerEllerAttestant => {
                KunneIkkeLageBrevutkast::FikkIkkeHentetSaksbehandlerEllerAttestant
            }
        })?;

        self.ports.brev.lag_brev(&request).await.map_err(|e| {
            warn!(behandling_id = %id, error = %e, "could not render brevutkast");
            KunneIkkeLageBrevutkast::KunneIkkeLageBrev
        })
    }

    /// The finalization service sharing this service's ports
    pub fn ferdigstill(&self) -> &FerdigstillIverksettingService {
        &self.ferdigstill
    }
}
