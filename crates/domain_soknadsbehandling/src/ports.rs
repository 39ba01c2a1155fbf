//! Ports for søknadsbehandling
//!
//! The services reach storage and every downstream system through these
//! traits. Downstream ports return their own small error enums so the
//! services can map each failure to the operation's error type; storage
//! returns `PortError`.
//!
//! ```text
//!                        ┌──► SoknadsbehandlingRepo / SoknadRepo
//!                        ├──► PersonPort      (person registry)
//!  SoknadsbehandlingService ─┼──► DirectoryPort   (staff directory)
//!  FerdigstillIverksetting   ├──► BrevPort        (journal + distribute)
//!                        ├──► OppgavePort     (task tickets)
//!                        └──► UtbetalingPort  (simulate + pay)
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::{
    AktorId, Attestant, BehandlingId, BrevbestillingId, DomainPort, Fnr, HealthCheckable,
    JournalpostId, NavIdent, OppgaveId, PortError, SakId, Saksbehandler, Saksnummer, SoknadId,
    UtbetalingId,
};
use domain_beregning::Beregning;

use crate::behandling::Soknadsbehandling;
use crate::brev::BrevRequest;
use crate::person::Person;
use crate::simulering::Simulering;
use crate::soknad::Soknad;

/// Storage for case aggregates
///
/// `lagre` uses optimistic locking: the stored version must be exactly one
/// below the version being written (or absent, for version 1). Otherwise
/// the write fails with `PortError::Conflict`.
#[async_trait]
pub trait SoknadsbehandlingRepo: DomainPort + HealthCheckable {
    async fn hent(&self, id: BehandlingId) -> Result<Option<Soknadsbehandling>, PortError>;

    async fn hent_for_soknad(&self, soknad_id: SoknadId) -> Result<Option<Soknadsbehandling>, PortError>;

    async fn hent_for_sak(&self, sak_id: SakId) -> Result<Vec<Soknadsbehandling>, PortError>;

    async fn lagre(&self, behandling: &Soknadsbehandling) -> Result<(), PortError>;

    async fn hent_for_utbetaling(&self, utbetaling_id: UtbetalingId) -> Result<Vec<Soknadsbehandling>, PortError>;

    /// Iverksatt cases without a journalpost, oldest first
    async fn hent_iverksatte_uten_journalpost(&self) -> Result<Vec<Soknadsbehandling>, PortError>;

    /// Iverksatt cases that are journaled but not distributed, oldest first
    async fn hent_iverksatte_uten_brevbestilling(&self) -> Result<Vec<Soknadsbehandling>, PortError>;
}

/// Read access to received søknader
#[async_trait]
pub trait SoknadRepo: DomainPort {
    async fn hent_soknad(&self, id: SoknadId) -> Result<Option<Soknad>, PortError>;

    async fn lagre_soknad(&self, soknad: &Soknad) -> Result<(), PortError>;
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersonFeil {
    #[error("Person not found")]
    FantIkkePerson,

    #[error("Not authorized to see the person")]
    IkkeTilgang,

    #[error("Person registry error: {0}")]
    Teknisk(String),
}

/// The person registry
#[async_trait]
pub trait PersonPort: DomainPort {
    async fn hent_person(&self, fnr: &Fnr) -> Result<Person, PersonFeil>;

    async fn hent_aktor_id(&self, fnr: &Fnr) -> Result<AktorId, PersonFeil>;
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryFeil {
    #[error("No user with that nav ident")]
    FantIkkeBruker,

    #[error("Directory error: {0}")]
    Teknisk(String),
}

/// The staff directory
#[async_trait]
pub trait DirectoryPort: DomainPort {
    async fn hent_navn_for_nav_ident(&self, nav_ident: &NavIdent) -> Result<String, DirectoryFeil>;
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BrevFeil {
    #[error("Could not journal the letter")]
    KunneIkkeJournalfore,

    #[error("Could not distribute the letter")]
    KunneIkkeDistribuere,

    #[error("Could not generate the letter")]
    KunneIkkeGenerere,
}

/// The letter service: render, journal and distribute
#[async_trait]
pub trait BrevPort: DomainPort {
    async fn journalfor_brev(&self, request: BrevRequest, saksnummer: Saksnummer) -> Result<JournalpostId, BrevFeil>;

    async fn distribuer_brev(&self, journalpost_id: &JournalpostId) -> Result<BrevbestillingId, BrevFeil>;

    /// Renders the letter to PDF bytes without journaling it
    async fn lag_brev(&self, request: &BrevRequest) -> Result<Vec<u8>, BrevFeil>;
}

/// What kind of oppgave to create, and for whom
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OppgaveConfig {
    Saksbehandling {
        soknad_id: SoknadId,
        aktor_id: AktorId,
        tilordnet: Option<NavIdent>,
    },
    Attestering {
        soknad_id: SoknadId,
        aktor_id: AktorId,
        tilordnet: Option<NavIdent>,
    },
}

impl OppgaveConfig {
    pub fn tilordnet(&self) -> Option<&NavIdent> {
        match self {
            OppgaveConfig::Saksbehandling { tilordnet, .. } | OppgaveConfig::Attestering { tilordnet, .. } => {
                tilordnet.as_ref()
            }
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OppgaveFeil {
    #[error("Could not create oppgave")]
    KunneIkkeOpprette,

    #[error("Could not close oppgave {0}")]
    KunneIkkeLukke(OppgaveId),
}

/// The oppgave (task ticket) system
#[async_trait]
pub trait OppgavePort: DomainPort {
    async fn opprett_oppgave(&self, config: OppgaveConfig) -> Result<OppgaveId, OppgaveFeil>;

    async fn lukk_oppgave(&self, oppgave_id: &OppgaveId) -> Result<(), OppgaveFeil>;

    /// Closes the oppgave as the system user, used when no caseworker is acting
    async fn lukk_oppgave_med_systembruker(&self, oppgave_id: &OppgaveId) -> Result<(), OppgaveFeil>;
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SimuleringFeil {
    #[error("The oppdrag system is closed or down")]
    OppdragStengtEllerNede,

    #[error("The simulation was rejected: {0}")]
    FunksjonellFeil(String),

    #[error("Technical simulation error: {0}")]
    TekniskFeil(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UtbetalingFeil {
    #[error("Protocol error sending the utbetaling")]
    Protokollfeil,

    #[error("Kontrollsimulering failed")]
    KunneIkkeSimulere,

    #[error("The simulering has changed since the saksbehandler simulated")]
    SimuleringHarBlittEndretSidenSaksbehandlerSimulerte,
}

/// The payment system
#[async_trait]
pub trait UtbetalingPort: DomainPort {
    async fn simuler_utbetaling(
        &self,
        sak_id: SakId,
        fnr: &Fnr,
        saksbehandler: &Saksbehandler,
        beregning: &Beregning,
    ) -> Result<Simulering, SimuleringFeil>;

    /// Sends the utbetaling, after a kontrollsimulering against `simulering`
    async fn utbetal(
        &self,
        sak_id: SakId,
        attestant: &Attestant,
        beregning: &Beregning,
        simulering: &Simulering,
    ) -> Result<UtbetalingId, UtbetalingFeil>;
}

#[cfg(any(test, feature = "mock"))]
pub mod mock {
    //! In-memory implementations of every port
    //!
    //! The downstream mocks share a [`KallLogg`] so tests can assert on the
    //! order of calls across ports.

    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    use chrono::Utc;
    use core_kernel::{HealthCheckResult, Money};
    use tokio::sync::RwLock;

    use crate::events::{StatistikkEvent, StatistikkObserver};
    use crate::person::Navn;
    use crate::simulering::SimulertPeriode;

    /// Ordered record of downstream calls
    #[derive(Debug, Clone, Default)]
    pub struct KallLogg(Arc<RwLock<Vec<String>>>);

    impl KallLogg {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn registrer(&self, kall: impl Into<String>) {
            self.0.write().await.push(kall.into());
        }

        pub async fn kall(&self) -> Vec<String> {
            self.0.read().await.clone()
        }

        /// Number of calls whose name starts with `prefix`
        pub async fn antall(&self, prefix: &str) -> usize {
            self.0.read().await.iter().filter(|k| k.starts_with(prefix)).count()
        }

        pub async fn er_tom(&self) -> bool {
            self.0.read().await.is_empty()
        }
    }

    // ========================================================================
    // Storage
    // ========================================================================

    #[derive(Debug, Default, Clone)]
    pub struct InMemorySoknadsbehandlingRepo {
        behandlinger: Arc<RwLock<HashMap<BehandlingId, Soknadsbehandling>>>,
    }

    impl InMemorySoknadsbehandlingRepo {
        pub fn new() -> Self {
            Self::default()
        }

        async fn filtrer(&self, filter: impl Fn(&Soknadsbehandling) -> bool) -> Vec<Soknadsbehandling> {
            let mut treff: Vec<_> = self
                .behandlinger
                .read()
                .await
                .values()
                .filter(|b| filter(b))
                .cloned()
                .collect();
            treff.sort_by_key(|b| (b.opprettet(), b.id()));
            treff
        }
    }

    impl DomainPort for InMemorySoknadsbehandlingRepo {}

    #[async_trait]
    impl HealthCheckable for InMemorySoknadsbehandlingRepo {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("in-memory-soknadsbehandling-repo", Instant::now())
        }
    }

    #[async_trait]
    impl SoknadsbehandlingRepo for InMemorySoknadsbehandlingRepo {
        async fn hent(&self, id: BehandlingId) -> Result<Option<Soknadsbehandling>, PortError> {
            Ok(self.behandlinger.read().await.get(&id).cloned())
        }

        async fn hent_for_soknad(&self, soknad_id: SoknadId) -> Result<Option<Soknadsbehandling>, PortError> {
            Ok(self.filtrer(|b| b.soknad_id() == soknad_id).await.into_iter().next())
        }

        async fn hent_for_sak(&self, sak_id: SakId) -> Result<Vec<Soknadsbehandling>, PortError> {
            Ok(self.filtrer(|b| b.sak_id() == sak_id).await)
        }

        async fn lagre(&self, behandling: &Soknadsbehandling) -> Result<(), PortError> {
            let mut behandlinger = self.behandlinger.write().await;
            let lagret_versjon = behandlinger.get(&behandling.id()).map(|b| b.versjon());
            let forventet = match lagret_versjon {
                Some(v) => v + 1,
                None => 1,
            };
            if behandling.versjon() != forventet {
                return Err(PortError::conflict(format!(
                    "behandling {} has versjon {:?}, tried to write {}",
                    behandling.id(),
                    lagret_versjon,
                    behandling.versjon()
                )));
            }
            behandlinger.insert(behandling.id(), behandling.clone());
            Ok(())
        }

        async fn hent_for_utbetaling(&self, utbetaling_id: UtbetalingId) -> Result<Vec<Soknadsbehandling>, PortError> {
            Ok(self
                .filtrer(|b| b.status().er_iverksatt() && b.utbetaling_id() == Some(utbetaling_id))
                .await)
        }

        async fn hent_iverksatte_uten_journalpost(&self) -> Result<Vec<Soknadsbehandling>, PortError> {
            Ok(self
                .filtrer(|b| b.status().er_iverksatt() && b.journalpost_id().is_none())
                .await)
        }

        async fn hent_iverksatte_uten_brevbestilling(&self) -> Result<Vec<Soknadsbehandling>, PortError> {
            Ok(self
                .filtrer(|b| {
                    b.status().er_iverksatt() && b.journalpost_id().is_some() && b.brevbestilling_id().is_none()
                })
                .await)
        }
    }

    #[derive(Debug, Default, Clone)]
    pub struct InMemorySoknadRepo {
        soknader: Arc<RwLock<HashMap<SoknadId, Soknad>>>,
    }

    impl InMemorySoknadRepo {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn with_soknader(soknader: Vec<Soknad>) -> Self {
            let repo = Self::new();
            for soknad in soknader {
                repo.soknader.write().await.insert(soknad.id, soknad);
            }
            repo
        }
    }

    impl DomainPort for InMemorySoknadRepo {}

    #[async_trait]
    impl SoknadRepo for InMemorySoknadRepo {
        async fn hent_soknad(&self, id: SoknadId) -> Result<Option<Soknad>, PortError> {
            Ok(self.soknader.read().await.get(&id).cloned())
        }

        async fn lagre_soknad(&self, soknad: &Soknad) -> Result<(), PortError> {
            self.soknader.write().await.insert(soknad.id, soknad.clone());
            Ok(())
        }
    }

    // ========================================================================
    // Downstream systems
    // ========================================================================

    /// Answers every fnr with a generated person unless told otherwise
    #[derive(Debug, Default, Clone)]
    pub struct MockPersonPort {
        logg: KallLogg,
        personer: Arc<RwLock<HashMap<Fnr, Person>>>,
        feil: Option<PersonFeil>,
    }

    impl MockPersonPort {
        pub fn new(logg: KallLogg) -> Self {
            Self {
                logg,
                ..Self::default()
            }
        }

        pub fn with_feil(mut self, feil: PersonFeil) -> Self {
            self.feil = Some(feil);
            self
        }

        pub async fn with_person(self, person: Person) -> Self {
            self.personer.write().await.insert(person.fnr.clone(), person);
            self
        }
    }

    impl DomainPort for MockPersonPort {}

    #[async_trait]
    impl PersonPort for MockPersonPort {
        async fn hent_person(&self, fnr: &Fnr) -> Result<Person, PersonFeil> {
            self.logg.registrer(format!("person.hent_person:{}", fnr)).await;
            if let Some(feil) = &self.feil {
                return Err(feil.clone());
            }
            let kjent = self.personer.read().await.get(fnr).cloned();
            Ok(kjent.unwrap_or_else(|| Person {
                fnr: fnr.clone(),
                navn: Navn {
                    fornavn: "Test".to_string(),
                    mellomnavn: None,
                    etternavn: "Testesen".to_string(),
                },
            }))
        }

        async fn hent_aktor_id(&self, fnr: &Fnr) -> Result<AktorId, PersonFeil> {
            self.logg.registrer(format!("person.hent_aktor_id:{}", fnr)).await;
            match &self.feil {
                Some(feil) => Err(feil.clone()),
                None => Ok(AktorId::new(format!("aktor-{}", fnr))),
            }
        }
    }

    /// Looks up display names; unknown idents get their ident back as name
    #[derive(Debug, Default, Clone)]
    pub struct MockDirectoryPort {
        logg: KallLogg,
        navn: Arc<RwLock<HashMap<NavIdent, String>>>,
        feil: Option<DirectoryFeil>,
    }

    impl MockDirectoryPort {
        pub fn new(logg: KallLogg) -> Self {
            Self {
                logg,
                ..Self::default()
            }
        }

        pub fn with_feil(mut self, feil: DirectoryFeil) -> Self {
            self.feil = Some(feil);
            self
        }

        pub async fn with_navn(self, nav_ident: NavIdent, navn: impl Into<String>) -> Self {
            self.navn.write().await.insert(nav_ident, navn.into());
            self
        }
    }

    impl DomainPort for MockDirectoryPort {}

    #[async_trait]
    impl DirectoryPort for MockDirectoryPort {
        async fn hent_navn_for_nav_ident(&self, nav_ident: &NavIdent) -> Result<String, DirectoryFeil> {
            self.logg.registrer(format!("directory.hent_navn:{}", nav_ident)).await;
            if let Some(feil) = &self.feil {
                return Err(feil.clone());
            }
            let navn = self.navn.read().await.get(nav_ident).cloned();
            Ok(navn.unwrap_or_else(|| nav_ident.to_string()))
        }
    }

    #[derive(Debug, Default, Clone)]
    pub struct MockBrevPort {
        logg: KallLogg,
        teller: Arc<RwLock<u64>>,
        journalfor_feiler: bool,
        distribuer_feiler: bool,
        lag_brev_feiler: bool,
    }

    impl MockBrevPort {
        pub fn new(logg: KallLogg) -> Self {
            Self {
                logg,
                ..Self::default()
            }
        }

        pub fn with_journalforing_feil(mut self) -> Self {
            self.journalfor_feiler = true;
            self
        }

        pub fn with_distribusjon_feil(mut self) -> Self {
            self.distribuer_feiler = true;
            self
        }

        pub fn with_lag_brev_feil(mut self) -> Self {
            self.lag_brev_feiler = true;
            self
        }

        async fn neste(&self) -> u64 {
            let mut teller = self.teller.write().await;
            *teller += 1;
            *teller
        }
    }

    impl DomainPort for MockBrevPort {}

    #[async_trait]
    impl BrevPort for MockBrevPort {
        async fn journalfor_brev(&self, _request: BrevRequest, saksnummer: Saksnummer) -> Result<JournalpostId, BrevFeil> {
            self.logg.registrer(format!("brev.journalfor:{}", saksnummer)).await;
            if self.journalfor_feiler {
                return Err(BrevFeil::KunneIkkeJournalfore);
            }
            Ok(JournalpostId::new(format!("jp-{}", self.neste().await)))
        }

        async fn distribuer_brev(&self, journalpost_id: &JournalpostId) -> Result<BrevbestillingId, BrevFeil> {
            self.logg.registrer(format!("brev.distribuer:{}", journalpost_id)).await;
            if self.distribuer_feiler {
                return Err(BrevFeil::KunneIkkeDistribuere);
            }
            Ok(BrevbestillingId::new(format!("bb-{}", self.neste().await)))
        }

        async fn lag_brev(&self, request: &BrevRequest) -> Result<Vec<u8>, BrevFeil> {
            self.logg.registrer(format!("brev.lag:{}", request.saksnummer)).await;
            if self.lag_brev_feiler {
                return Err(BrevFeil::KunneIkkeGenerere);
            }
            Ok(b"%PDF-1.7\n".to_vec())
        }
    }

    #[derive(Debug, Default, Clone)]
    pub struct MockOppgavePort {
        logg: KallLogg,
        teller: Arc<RwLock<u64>>,
        opprettet: Arc<RwLock<Vec<OppgaveConfig>>>,
        opprett_feiler: bool,
        lukk_feiler: bool,
    }

    impl MockOppgavePort {
        pub fn new(logg: KallLogg) -> Self {
            Self {
                logg,
                ..Self::default()
            }
        }

        pub fn with_opprett_feil(mut self) -> Self {
            self.opprett_feiler = true;
            self
        }

        pub fn with_lukk_feil(mut self) -> Self {
            self.lukk_feiler = true;
            self
        }

        /// Every config passed to `opprett_oppgave`, in order
        pub async fn opprettede(&self) -> Vec<OppgaveConfig> {
            self.opprettet.read().await.clone()
        }
    }

    impl DomainPort for MockOppgavePort {}

    #[async_trait]
    impl OppgavePort for MockOppgavePort {
        async fn opprett_oppgave(&self, config: OppgaveConfig) -> Result<OppgaveId, OppgaveFeil> {
            self.logg.registrer("oppgave.opprett").await;
            if self.opprett_feiler {
                return Err(OppgaveFeil::KunneIkkeOpprette);
            }
            self.opprettet.write().await.push(config);
            let mut teller = self.teller.write().await;
            *teller += 1;
            Ok(OppgaveId::new(format!("oppgave-{}", *teller)))
        }

        async fn lukk_oppgave(&self, oppgave_id: &OppgaveId) -> Result<(), OppgaveFeil> {
            self.logg.registrer(format!("oppgave.lukk:{}", oppgave_id)).await;
            if self.lukk_feiler {
                return Err(OppgaveFeil::KunneIkkeLukke(oppgave_id.clone()));
            }
            Ok(())
        }

        async fn lukk_oppgave_med_systembruker(&self, oppgave_id: &OppgaveId) -> Result<(), OppgaveFeil> {
            self.logg.registrer(format!("oppgave.lukk_systembruker:{}", oppgave_id)).await;
            if self.lukk_feiler {
                return Err(OppgaveFeil::KunneIkkeLukke(oppgave_id.clone()));
            }
            Ok(())
        }
    }

    /// Simulates exactly what the beregning says unless told to deviate
    #[derive(Debug, Default, Clone)]
    pub struct MockUtbetalingPort {
        logg: KallLogg,
        simulering_feil: Option<SimuleringFeil>,
        utbetaling_feil: Option<UtbetalingFeil>,
        avvik: bool,
    }

    impl MockUtbetalingPort {
        pub fn new(logg: KallLogg) -> Self {
            Self {
                logg,
                ..Self::default()
            }
        }

        pub fn with_simulering_feil(mut self, feil: SimuleringFeil) -> Self {
            self.simulering_feil = Some(feil);
            self
        }

        pub fn with_utbetaling_feil(mut self, feil: UtbetalingFeil) -> Self {
            self.utbetaling_feil = Some(feil);
            self
        }

        /// Makes simulations pay one krone more than the beregning
        pub fn with_avvik(mut self) -> Self {
            self.avvik = true;
            self
        }
    }

    /// A simulering that matches the beregning month for month
    pub fn simulering_for(fnr: &Fnr, beregning: &Beregning) -> Simulering {
        let perioder: Vec<SimulertPeriode> = beregning
            .maanedsberegninger
            .iter()
            .map(|m| SimulertPeriode {
                maned: m.maned,
                belop: m.belop,
            })
            .collect();
        Simulering {
            gjelder_id: fnr.clone(),
            gjelder_navn: "Test Testesen".to_string(),
            dato_beregnet: Utc::now().date_naive(),
            netto_belop: beregning.sum_ytelse(),
            perioder,
        }
    }

    impl DomainPort for MockUtbetalingPort {}

    #[async_trait]
    impl UtbetalingPort for MockUtbetalingPort {
        async fn simuler_utbetaling(
            &self,
            sak_id: SakId,
            fnr: &Fnr,
            _saksbehandler: &Saksbehandler,
            beregning: &Beregning,
        ) -> Result<Simulering, SimuleringFeil> {
            self.logg.registrer(format!("utbetaling.simuler:{}", sak_id)).await;
            if let Some(feil) = &self.simulering_feil {
                return Err(feil.clone());
            }
            let mut simulering = simulering_for(fnr, beregning);
            if self.avvik {
                if let Some(forste) = simulering.perioder.first_mut() {
                    forste.belop = forste.belop + Money::nok(rust_decimal::Decimal::ONE);
                }
            }
            Ok(simulering)
        }

        async fn utbetal(
            &self,
            sak_id: SakId,
            _attestant: &Attestant,
            beregning: &Beregning,
            simulering: &Simulering,
        ) -> Result<UtbetalingId, UtbetalingFeil> {
            self.logg.registrer(format!("utbetaling.utbetal:{}", sak_id)).await;
            if let Some(feil) = &self.utbetaling_feil {
                return Err(feil.clone());
            }
            if !simulering.stemmer_med(beregning) {
                return Err(UtbetalingFeil::SimuleringHarBlittEndretSidenSaksbehandlerSimulerte);
            }
            Ok(UtbetalingId::new_v7())
        }
    }

    // ========================================================================
    // Observers
    // ========================================================================

    /// Keeps every event it sees
    #[derive(Debug, Default)]
    pub struct RecordingStatistikkObserver {
        events: Mutex<Vec<StatistikkEvent>>,
    }

    impl RecordingStatistikkObserver {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn events(&self) -> Vec<StatistikkEvent> {
            self.events.lock().map(|e| e.clone()).unwrap_or_default()
        }

        pub fn antall(&self, event_type: &str) -> usize {
            self.events().iter().filter(|e| e.event_type() == event_type).count()
        }
    }

    impl StatistikkObserver for RecordingStatistikkObserver {
        fn handle(&self, event: &StatistikkEvent) {
            if let Ok(mut events) = self.events.lock() {
                events.push(event.clone());
            }
        }
    }
}
