//! Søknadsbehandling errors
//!
//! `SoknadsbehandlingError` covers rule violations on the aggregate. Each
//! service operation has its own closed error enum that wraps it together
//! with the downstream failures that operation can run into. Every enum
//! exposes `kode()`, a stable machine-readable code.

use thiserror::Error;

use core_kernel::{BehandlingId, JournalpostId, PortError, SakId};
use domain_beregning::{BeregningError, Fradragstype};

use crate::iverksettingssteg::KunneIkkeEndreSteg;
use crate::ports::{SimuleringFeil, UtbetalingFeil};
use crate::status::SoknadsbehandlingStatus;

/// Rule violations on the case aggregate
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SoknadsbehandlingError {
    #[error("Illegal status transition from {fra} to {til}")]
    UgyldigStatusovergang {
        fra: SoknadsbehandlingStatus,
        til: SoknadsbehandlingStatus,
    },

    #[error("Attestant and saksbehandler cannot be the same person")]
    AttestantOgSaksbehandlerKanIkkeVaereSammePerson,

    #[error("The case has no stønadsperiode")]
    ManglerStonadsperiode,

    #[error("The case has no bosituasjon")]
    ManglerBosituasjon,

    #[error("The case has no beregning")]
    ManglerBeregning,

    #[error("The case has no simulering")]
    ManglerSimulering,

    #[error("The case has no saksbehandler")]
    ManglerSaksbehandler,

    #[error("Invalid stønadsperiode: {0}")]
    UgyldigPeriode(String),

    #[error("Fradrag must lie within the stønadsperiode")]
    FradragUtenforStonadsperiode,

    #[error("Fradragstype {0:?} is derived and cannot be registered")]
    UgyldigFradragstype(Fradragstype),

    #[error("EPS data given, but the bruker has no ektefelle or samboer")]
    HarIkkeEktefelle,

    #[error("The case is not iverksatt")]
    IkkeIverksatt,

    #[error(transparent)]
    Beregning(#[from] BeregningError),

    #[error(transparent)]
    Steg(#[from] KunneIkkeEndreSteg),
}

impl SoknadsbehandlingError {
    pub fn ugyldig_overgang(fra: SoknadsbehandlingStatus, til: SoknadsbehandlingStatus) -> Self {
        SoknadsbehandlingError::UgyldigStatusovergang { fra, til }
    }

    pub fn kode(&self) -> &'static str {
        match self {
            SoknadsbehandlingError::UgyldigStatusovergang { .. } => "ugyldig_statusovergang",
            SoknadsbehandlingError::AttestantOgSaksbehandlerKanIkkeVaereSammePerson => {
                "attestant_og_saksbehandler_kan_ikke_vaere_samme_person"
            }
            SoknadsbehandlingError::ManglerStonadsperiode => "mangler_stonadsperiode",
            SoknadsbehandlingError::ManglerBosituasjon => "mangler_bosituasjon",
            SoknadsbehandlingError::ManglerBeregning => "mangler_beregning",
            SoknadsbehandlingError::ManglerSimulering => "mangler_simulering",
            SoknadsbehandlingError::ManglerSaksbehandler => "mangler_saksbehandler",
            SoknadsbehandlingError::UgyldigPeriode(_) => "ugyldig_periode",
            SoknadsbehandlingError::FradragUtenforStonadsperiode => "fradrag_utenfor_stonadsperiode",
            SoknadsbehandlingError::UgyldigFradragstype(_) => "ugyldig_fradragstype",
            SoknadsbehandlingError::HarIkkeEktefelle => "har_ikke_ektefelle",
            SoknadsbehandlingError::IkkeIverksatt => "ikke_iverksatt",
            SoknadsbehandlingError::Beregning(e) => e.kode(),
            SoknadsbehandlingError::Steg(e) => e.kode(),
        }
    }
}

/// Errors from `SoknadsbehandlingService::opprett`
#[derive(Debug, Error)]
pub enum KunneIkkeOpprette {
    #[error("Søknad not found")]
    FantIkkeSoknad,

    #[error("Søknad is closed")]
    SoknadErLukket,

    #[error("Søknad has no oppgave")]
    SoknadManglerOppgave,

    #[error("Søknad already has a behandling")]
    SoknadHarAlleredeBehandling,

    #[error("The sak already has an open behandling")]
    HarAlleredeAapenBehandling,

    #[error("Repository error: {0}")]
    Repo(#[from] PortError),
}

impl KunneIkkeOpprette {
    pub fn kode(&self) -> &'static str {
        match self {
            KunneIkkeOpprette::FantIkkeSoknad => "fant_ikke_soknad",
            KunneIkkeOpprette::SoknadErLukket => "soknad_er_lukket",
            KunneIkkeOpprette::SoknadManglerOppgave => "soknad_mangler_oppgave",
            KunneIkkeOpprette::SoknadHarAlleredeBehandling => "soknad_har_allerede_behandling",
            KunneIkkeOpprette::HarAlleredeAapenBehandling => "har_allerede_aapen_behandling",
            KunneIkkeOpprette::Repo(_) => "repository_feil",
        }
    }
}

/// Errors from `SoknadsbehandlingService::hent`
#[derive(Debug, Error)]
pub enum KunneIkkeHente {
    #[error("Behandling not found")]
    FantIkkeBehandling,

    #[error("Repository error: {0}")]
    Repo(#[from] PortError),
}

impl KunneIkkeHente {
    pub fn kode(&self) -> &'static str {
        match self {
            KunneIkkeHente::FantIkkeBehandling => "fant_ikke_behandling",
            KunneIkkeHente::Repo(_) => "repository_feil",
        }
    }
}

/// Errors from updating stønadsperiode, bosituasjon or fradrag
#[derive(Debug, Error)]
pub enum KunneIkkeOppdatere {
    #[error("Behandling not found")]
    FantIkkeBehandling,

    #[error(transparent)]
    Behandling(#[from] SoknadsbehandlingError),

    #[error("Repository error: {0}")]
    Repo(#[from] PortError),
}

impl KunneIkkeOppdatere {
    pub fn kode(&self) -> &'static str {
        match self {
            KunneIkkeOppdatere::FantIkkeBehandling => "fant_ikke_behandling",
            KunneIkkeOppdatere::Behandling(e) => e.kode(),
            KunneIkkeOppdatere::Repo(_) => "repository_feil",
        }
    }
}

/// Errors from `SoknadsbehandlingService::vilkarsvurder`
#[derive(Debug, Error)]
pub enum KunneIkkeVilkarsvurdere {
    #[error("Behandling not found")]
    FantIkkeBehandling,

    #[error(transparent)]
    Behandling(#[from] SoknadsbehandlingError),

    #[error("Repository error: {0}")]
    Repo(#[from] PortError),
}

impl KunneIkkeVilkarsvurdere {
    pub fn kode(&self) -> &'static str {
        match self {
            KunneIkkeVilkarsvurdere::FantIkkeBehandling => "fant_ikke_behandling",
            KunneIkkeVilkarsvurdere::Behandling(e) => e.kode(),
            KunneIkkeVilkarsvurdere::Repo(_) => "repository_feil",
        }
    }
}

/// Errors from `SoknadsbehandlingService::beregn`
#[derive(Debug, Error)]
pub enum KunneIkkeBeregne {
    #[error("Behandling not found")]
    FantIkkeBehandling,

    #[error("The case has no stønadsperiode")]
    ManglerStonadsperiode,

    #[error("The case has no bosituasjon")]
    ManglerBosituasjon,

    #[error(transparent)]
    Beregning(BeregningError),

    #[error(transparent)]
    Behandling(SoknadsbehandlingError),

    #[error("Repository error: {0}")]
    Repo(#[from] PortError),
}

impl From<SoknadsbehandlingError> for KunneIkkeBeregne {
    fn from(e: SoknadsbehandlingError) -> Self {
        match e {
            SoknadsbehandlingError::ManglerStonadsperiode => KunneIkkeBeregne::ManglerStonadsperiode,
            SoknadsbehandlingError::ManglerBosituasjon => KunneIkkeBeregne::ManglerBosituasjon,
            SoknadsbehandlingError::Beregning(e) => KunneIkkeBeregne::Beregning(e),
            other => KunneIkkeBeregne::Behandling(other),
        }
    }
}

impl KunneIkkeBeregne {
    pub fn kode(&self) -> &'static str {
        match self {
            KunneIkkeBeregne::FantIkkeBehandling => "fant_ikke_behandling",
            KunneIkkeBeregne::ManglerStonadsperiode => "mangler_stonadsperiode",
            KunneIkkeBeregne::ManglerBosituasjon => "mangler_bosituasjon",
            KunneIkkeBeregne::Beregning(e) => e.kode(),
            KunneIkkeBeregne::Behandling(e) => e.kode(),
            KunneIkkeBeregne::Repo(_) => "repository_feil",
        }
    }
}

/// Errors from `SoknadsbehandlingService::simuler`
#[derive(Debug, Error)]
pub enum KunneIkkeSimulere {
    #[error("Behandling not found")]
    FantIkkeBehandling,

    #[error("Simulering failed: {0}")]
    SimuleringFeilet(SimuleringFeil),

    #[error("Simulering does not match the beregning")]
    SimuleringStemmerIkkeMedBeregning,

    #[error(transparent)]
    Behandling(#[from] SoknadsbehandlingError),

    #[error("Repository error: {0}")]
    Repo(#[from] PortError),
}

impl KunneIkkeSimulere {
    pub fn kode(&self) -> &'static str {
        match self {
            KunneIkkeSimulere::FantIkkeBehandling => "fant_ikke_behandling",
            KunneIkkeSimulere::SimuleringFeilet(_) => "kunne_ikke_simulere",
            KunneIkkeSimulere::SimuleringStemmerIkkeMedBeregning => "simulering_stemmer_ikke_med_beregning",
            KunneIkkeSimulere::Behandling(e) => e.kode(),
            KunneIkkeSimulere::Repo(_) => "repository_feil",
        }
    }
}

/// Errors from `SoknadsbehandlingService::send_til_attestering`
#[derive(Debug, Error)]
pub enum KunneIkkeSendeTilAttestering {
    #[error("Behandling not found")]
    FantIkkeBehandling,

    #[error("Could not look up the aktør-id")]
    KunneIkkeFinneAktorId,

    #[error("Could not create the attestering oppgave")]
    KunneIkkeOppretteOppgave,

    #[error(transparent)]
    Behandling(#[from] SoknadsbehandlingError),

    #[error("Repository error: {0}")]
    Repo(#[from] PortError),
}

impl KunneIkkeSendeTilAttestering {
    pub fn kode(&self) -> &'static str {
        match self {
            KunneIkkeSendeTilAttestering::FantIkkeBehandling => "fant_ikke_behandling",
            KunneIkkeSendeTilAttestering::KunneIkkeFinneAktorId => "kunne_ikke_finne_aktor_id",
            KunneIkkeSendeTilAttestering::KunneIkkeOppretteOppgave => "kunne_ikke_opprette_oppgave",
            KunneIkkeSendeTilAttestering::Behandling(e) => e.kode(),
            KunneIkkeSendeTilAttestering::Repo(_) => "repository_feil",
        }
    }
}

/// Errors from `SoknadsbehandlingService::underkjenn`
#[derive(Debug, Error)]
pub enum KunneIkkeUnderkjenne {
    #[error("Behandling not found")]
    FantIkkeBehandling,

    #[error("Could not look up the aktør-id")]
    KunneIkkeFinneAktorId,

    #[error("Could not create the behandling oppgave")]
    KunneIkkeOppretteOppgave,

    #[error(transparent)]
    Behandling(#[from] SoknadsbehandlingError),

    #[error("Repository error: {0}")]
    Repo(#[from] PortError),
}

impl KunneIkkeUnderkjenne {
    pub fn kode(&self) -> &'static str {
        match self {
            KunneIkkeUnderkjenne::FantIkkeBehandling => "fant_ikke_behandling",
            KunneIkkeUnderkjenne::KunneIkkeFinneAktorId => "kunne_ikke_finne_aktor_id",
            KunneIkkeUnderkjenne::KunneIkkeOppretteOppgave => "kunne_ikke_opprette_oppgave",
            KunneIkkeUnderkjenne::Behandling(e) => e.kode(),
            KunneIkkeUnderkjenne::Repo(_) => "repository_feil",
        }
    }
}

/// Errors from `SoknadsbehandlingService::iverksett`
#[derive(Debug, Error)]
pub enum KunneIkkeIverksette {
    #[error("Behandling not found")]
    FantIkkeBehandling,

    #[error("Payment failed: {0}")]
    KunneIkkeUtbetale(UtbetalingFeil),

    #[error("Kontrollsimulering failed")]
    KunneIkkeKontrollsimulere,

    #[error("The simulering has changed since the saksbehandler simulated")]
    SimuleringHarBlittEndretSidenSaksbehandlerSimulerte,

    #[error("Person not found")]
    FantIkkePerson,

    #[error("Could not look up saksbehandler or attestant")]
    FikkIkkeHentetSaksbehandlerEllerAttestant,

    #[error("Could not journal the vedtaksbrev")]
    KunneIkkeJournalforeBrev,

    #[error(transparent)]
    Behandling(#[from] SoknadsbehandlingError),

    #[error("Repository error: {0}")]
    Repo(#[from] PortError),
}

impl From<UtbetalingFeil> for KunneIkkeIverksette {
    fn from(e: UtbetalingFeil) -> Self {
        match e {
            UtbetalingFeil::SimuleringHarBlittEndretSidenSaksbehandlerSimulerte => {
                KunneIkkeIverksette::SimuleringHarBlittEndretSidenSaksbehandlerSimulerte
            }
            UtbetalingFeil::KunneIkkeSimulere => KunneIkkeIverksette::KunneIkkeKontrollsimulere,
            other @ UtbetalingFeil::Protokollfeil => KunneIkkeIverksette::KunneIkkeUtbetale(other),
        }
    }
}

impl KunneIkkeIverksette {
    pub fn kode(&self) -> &'static str {
        match self {
            KunneIkkeIverksette::FantIkkeBehandling => "fant_ikke_behandling",
            KunneIkkeIverksette::KunneIkkeUtbetale(_) => "kunne_ikke_utbetale",
            KunneIkkeIverksette::KunneIkkeKontrollsimulere => "kunne_ikke_kontrollsimulere",
            KunneIkkeIverksette::SimuleringHarBlittEndretSidenSaksbehandlerSimulerte => {
                "simulering_har_blitt_endret_siden_saksbehandler_simulerte"
            }
            KunneIkkeIverksette::FantIkkePerson => "fant_ikke_person",
            KunneIkkeIverksette::FikkIkkeHentetSaksbehandlerEllerAttestant => {
                "fikk_ikke_hentet_saksbehandler_eller_attestant"
            }
            KunneIkkeIverksette::KunneIkkeJournalforeBrev => "kunne_ikke_journalfore_brev",
            KunneIkkeIverksette::Behandling(e) => e.kode(),
            KunneIkkeIverksette::Repo(_) => "repository_feil",
        }
    }
}

/// Errors from `SoknadsbehandlingService::lag_brevutkast`
#[derive(Debug, Error)]
pub enum KunneIkkeLageBrevutkast {
    #[error("Behandling not found")]
    FantIkkeBehandling,

    #[error("Person not found")]
    FantIkkePerson,

    #[error("Could not look up saksbehandler or attestant")]
    FikkIkkeHentetSaksbehandlerEllerAttestant,

    #[error("The case has no outcome to write a letter about yet")]
    ManglerUtfall,

    #[error("Could not generate the letter")]
    KunneIkkeLageBrev,

    #[error("Repository error: {0}")]
    Repo(#[from] PortError),
}

impl KunneIkkeLageBrevutkast {
    pub fn kode(&self) -> &'static str {
        match self {
            KunneIkkeLageBrevutkast::FantIkkeBehandling => "fant_ikke_behandling",
            KunneIkkeLageBrevutkast::FantIkkePerson => "fant_ikke_person",
            KunneIkkeLageBrevutkast::FikkIkkeHentetSaksbehandlerEllerAttestant => {
                "fikk_ikke_hentet_saksbehandler_eller_attestant"
            }
            KunneIkkeLageBrevutkast::ManglerUtfall => "mangler_utfall",
            KunneIkkeLageBrevutkast::KunneIkkeLageBrev => "kunne_ikke_lage_brev",
            KunneIkkeLageBrevutkast::Repo(_) => "repository_feil",
        }
    }
}

/// Failure to journal the vedtaksbrev for one case
#[derive(Debug, Error)]
pub enum KunneIkkeOppretteJournalpost {
    #[error("Person not found for sak {sak_id}, behandling {behandling_id}")]
    FantIkkePerson {
        sak_id: SakId,
        behandling_id: BehandlingId,
    },

    #[error("Could not look up saksbehandler or attestant for sak {sak_id}, behandling {behandling_id}")]
    FikkIkkeHentetSaksbehandlerEllerAttestant {
        sak_id: SakId,
        behandling_id: BehandlingId,
    },

    #[error("Journaling failed for sak {sak_id}, behandling {behandling_id}")]
    FeilVedJournalforing {
        sak_id: SakId,
        behandling_id: BehandlingId,
    },

    #[error("Journalpost {journalpost_id} created but not stored for behandling {behandling_id}: {kilde}")]
    FeilVedLagring {
        sak_id: SakId,
        behandling_id: BehandlingId,
        journalpost_id: JournalpostId,
        kilde: String,
    },
}

impl KunneIkkeOppretteJournalpost {
    pub fn behandling_id(&self) -> BehandlingId {
        match self {
            KunneIkkeOppretteJournalpost::FantIkkePerson { behandling_id, .. }
            | KunneIkkeOppretteJournalpost::FikkIkkeHentetSaksbehandlerEllerAttestant { behandling_id, .. }
            | KunneIkkeOppretteJournalpost::FeilVedJournalforing { behandling_id, .. }
            | KunneIkkeOppretteJournalpost::FeilVedLagring { behandling_id, .. } => *behandling_id,
        }
    }

    pub fn kode(&self) -> &'static str {
        match self {
            KunneIkkeOppretteJournalpost::FantIkkePerson { .. } => "fant_ikke_person",
            KunneIkkeOppretteJournalpost::FikkIkkeHentetSaksbehandlerEllerAttestant { .. } => {
                "fikk_ikke_hentet_saksbehandler_eller_attestant"
            }
            KunneIkkeOppretteJournalpost::FeilVedJournalforing { .. } => "feil_ved_journalforing",
            KunneIkkeOppretteJournalpost::FeilVedLagring { .. } => "feil_ved_lagring",
        }
    }
}

/// Failure to distribute the vedtaksbrev for one case
#[derive(Debug, Error)]
pub enum KunneIkkeBestilleBrev {
    #[error("Distribution of journalpost {journalpost_id} failed for behandling {behandling_id}")]
    FeilVedDistribusjon {
        sak_id: SakId,
        behandling_id: BehandlingId,
        journalpost_id: JournalpostId,
    },

    #[error("Behandling {behandling_id} must be journaled before distribution")]
    MaaJournalforesForst {
        sak_id: SakId,
        behandling_id: BehandlingId,
    },

    #[error("Brevbestilling for journalpost {journalpost_id} not stored for behandling {behandling_id}: {kilde}")]
    FeilVedLagring {
        sak_id: SakId,
        behandling_id: BehandlingId,
        journalpost_id: JournalpostId,
        kilde: String,
    },
}

impl KunneIkkeBestilleBrev {
    pub fn behandling_id(&self) -> BehandlingId {
        match self {
            KunneIkkeBestilleBrev::FeilVedDistribusjon { behandling_id, .. }
            | KunneIkkeBestilleBrev::MaaJournalforesForst { behandling_id, .. }
            | KunneIkkeBestilleBrev::FeilVedLagring { behandling_id, .. } => *behandling_id,
        }
    }

    pub fn kode(&self) -> &'static str {
        match self {
            KunneIkkeBestilleBrev::FeilVedDistribusjon { .. } => "feil_ved_distribusjon",
            KunneIkkeBestilleBrev::MaaJournalforesForst { .. } => "maa_journalfores_forst",
            KunneIkkeBestilleBrev::FeilVedLagring { .. } => "feil_ved_lagring",
        }
    }
}

/// Errors from `FerdigstillIverksettingService::ferdigstill_iverksetting`
#[derive(Debug, Error)]
pub enum KunneIkkeFerdigstilleIverksetting {
    #[error("No iverksatt behandling for the utbetaling")]
    FantIkkeBehandling,

    #[error("Several behandlinger share the utbetaling")]
    FlereBehandlingerForUtbetaling,

    #[error(transparent)]
    Journalpost(KunneIkkeOppretteJournalpost),

    #[error(transparent)]
    Brev(KunneIkkeBestilleBrev),

    #[error("Repository error: {0}")]
    Repo(#[from] PortError),
}

impl KunneIkkeFerdigstilleIverksetting {
    pub fn kode(&self) -> &'static str {
        match self {
            KunneIkkeFerdigstilleIverksetting::FantIkkeBehandling => "fant_ikke_behandling",
            KunneIkkeFerdigstilleIverksetting::FlereBehandlingerForUtbetaling => {
                "flere_behandlinger_for_utbetaling"
            }
            KunneIkkeFerdigstilleIverksetting::Journalpost(e) => e.kode(),
            KunneIkkeFerdigstilleIverksetting::Brev(e) => e.kode(),
            KunneIkkeFerdigstilleIverksetting::Repo(_) => "repository_feil",
        }
    }
}
