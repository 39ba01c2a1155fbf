//! Søknadsbehandling services
//!
//! The services load a case through the repository, apply the aggregate's
//! rules, call downstream ports in a fixed order, persist, and notify the
//! statistics observers. All port calls are awaited one at a time.

mod ferdigstill;
mod soknadsbehandling;

pub use ferdigstill::{
    BatchResultat, BestiltBrev, FerdigstillIverksettingService, FerdigstillResultat, OpprettetJournalpost,
};
pub use soknadsbehandling::SoknadsbehandlingService;

use std::sync::Arc;

use tracing::warn;

use core_kernel::{Attestant, PortError, Saksbehandler};

use crate::behandling::Soknadsbehandling;
use crate::brev::BrevRequest;
use crate::events::{StatistikkEvent, StatistikkObserver};
use crate::ports::{
    BrevPort, DirectoryPort, OppgavePort, PersonPort, SoknadRepo, SoknadsbehandlingRepo,
    UtbetalingPort,
};
use crate::status::Utfall;

/// Every port the services talk to
#[derive(Clone)]
pub struct Ports {
    pub behandlinger: Arc<dyn SoknadsbehandlingRepo>,
    pub soknader: Arc<dyn SoknadRepo>,
    pub person: Arc<dyn PersonPort>,
    pub directory: Arc<dyn DirectoryPort>,
    pub brev: Arc<dyn BrevPort>,
    pub oppgave: Arc<dyn OppgavePort>,
    pub utbetaling: Arc<dyn UtbetalingPort>,
}

/// Bumps the version and writes the case
pub(crate) async fn lagre_behandling(
    repo: &dyn SoknadsbehandlingRepo,
    behandling: &mut Soknadsbehandling,
) -> Result<(), PortError> {
    behandling.oppdater_versjon();
    repo.lagre(behandling).await
}

pub(crate) fn publiser(observers: &[Arc<dyn StatistikkObserver>], event: StatistikkEvent) {
    for observer in observers {
        observer.handle(&event);
    }
}

/// Why a vedtaksbrev request could not be assembled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BrevgrunnlagFeil {
    FantIkkePerson,
    FikkIkkeHentetSaksbehandlerEllerAttestant,
}

/// Looks up the person, then the saksbehandler's name, then the attestant's
pub(crate) async fn lag_brev_request(
    ports: &Ports,
    behandling: &Soknadsbehandling,
    utfall: Utfall,
    saksbehandler: Option<&Saksbehandler>,
    attestant: Option<&Attestant>,
) -> Result<BrevRequest, BrevgrunnlagFeil> {
    let person = ports.person.hent_person(behandling.fnr()).await.map_err(|e| {
        warn!(behandling_id = %behandling.id(), error = %e, "could not fetch person for vedtaksbrev");
        BrevgrunnlagFeil::FantIkkePerson
    })?;

    let saksbehandler = saksbehandler.ok_or(BrevgrunnlagFeil::FikkIkkeHentetSaksbehandlerEllerAttestant)?;
    let saksbehandler_navn = ports
        .directory
        .hent_navn_for_nav_ident(saksbehandler.nav_ident())
        .await
        .map_err(|e| {
            warn!(behandling_id = %behandling.id(), error = %e, "could not fetch saksbehandler name");
            BrevgrunnlagFeil::FikkIkkeHentetSaksbehandlerEllerAttestant
        })?;

    let attestant_navn = match attestant {
        Some(attestant) => Some(
            ports
                .directory
                .hent_navn_for_nav_ident(attestant.nav_ident())
                .await
                .map_err(|e| {
                    warn!(behandling_id = %behandling.id(), error = %e, "could not fetch attestant name");
                    BrevgrunnlagFeil::FikkIkkeHentetSaksbehandlerEllerAttestant
                })?,
        ),
        None => None,
    };

    Ok(BrevRequest::vedtak(behandling, utfall, person, saksbehandler_navn, attestant_navn))
}
