//! Søknadsbehandling Domain
//!
//! The case aggregate for supplerende stønad and the services that drive it
//! from intake to iverksetting.
//!
//! ```text
//! opprett ─► Uavklart ─► Vilkarsvurdert ─► Beregnet ─► Simulert ─► TilAttestering
//!                             ▲                                        │
//!                             └────────────── Underkjent ◄─────────────┤
//!                                                                      ▼
//!                         utbetal / journalfør avslag ─────────────► Iverksatt
//!                                                                      │
//!                 FerdigstillIverksettingService: journalfør ► distribuer ► lukk oppgave
//! ```
//!
//! Downstream systems (person registry, staff directory, oppgave, brev,
//! oppdrag) are reached through the traits in [`ports`]. With the `mock`
//! feature enabled, [`ports::mock`] provides in-memory versions of all of
//! them.

pub mod attestering;
pub mod behandling;
pub mod brev;
pub mod error;
pub mod events;
pub mod grunnlag;
pub mod iverksettingssteg;
pub mod person;
pub mod ports;
pub mod services;
pub mod simulering;
pub mod soknad;
pub mod status;
pub mod statusovergang;
pub mod vilkar;

pub use attestering::{Attestering, Attesteringshistorikk, UnderkjentGrunn};
pub use behandling::{Iverksetting, Soknadsbehandling};
pub use brev::{Avslagsgrunn, BrevInnhold, BrevRequest};
pub use error::{
    KunneIkkeBeregne, KunneIkkeBestilleBrev, KunneIkkeFerdigstilleIverksetting, KunneIkkeHente,
    KunneIkkeIverksette, KunneIkkeLageBrevutkast, KunneIkkeOppdatere, KunneIkkeOpprette,
    KunneIkkeOppretteJournalpost, KunneIkkeSendeTilAttestering, KunneIkkeSimulere, KunneIkkeUnderkjenne,
    KunneIkkeVilkarsvurdere, SoknadsbehandlingError,
};
pub use events::{LoggingStatistikkObserver, StatistikkEvent, StatistikkObserver};
pub use grunnlag::Grunnlagsdata;
pub use iverksettingssteg::{EksterneIverksettingssteg, KunneIkkeEndreSteg};
pub use person::{Navn, Person};
pub use ports::{
    BrevFeil, BrevPort, DirectoryFeil, DirectoryPort, OppgaveConfig, OppgaveFeil, OppgavePort, PersonFeil,
    PersonPort, SimuleringFeil, SoknadRepo, SoknadsbehandlingRepo, UtbetalingFeil, UtbetalingPort,
};
pub use services::{
    BatchResultat, BestiltBrev, FerdigstillIverksettingService, FerdigstillResultat, OpprettetJournalpost, Ports,
    SoknadsbehandlingService,
};
pub use simulering::{Simulering, SimulertPeriode};
pub use soknad::{Lukket, Soknad};
pub use status::{SoknadsbehandlingStatus, Utfall};
pub use vilkar::{Formuevilkar, Uforevilkar, Vilkar, Vilkarsresultat, Vilkarsvurderinger, Vurdering};
