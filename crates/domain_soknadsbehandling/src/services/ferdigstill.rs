//! Finishing iverksatte cases: journal the vedtaksbrev, distribute it,
//! close the oppgave.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{error, info, warn};

use core_kernel::{BehandlingId, BrevbestillingId, JournalpostId, PortError, SakId, UtbetalingId};

use super::{lag_brev_request, lagre_behandling, BrevgrunnlagFeil, Ports};
use crate::behandling::Soknadsbehandling;
use crate::error::{KunneIkkeBestilleBrev, KunneIkkeFerdigstilleIverksetting, KunneIkkeOppretteJournalpost};
use crate::status::Utfall;

/// A vedtaksbrev that was journaled and stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpprettetJournalpost {
    pub sak_id: SakId,
    pub behandling_id: BehandlingId,
    pub journalpost_id: JournalpostId,
}

/// A vedtaksbrev that was distributed and stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BestiltBrev {
    pub sak_id: SakId,
    pub behandling_id: BehandlingId,
    pub journalpost_id: JournalpostId,
    pub brevbestilling_id: BrevbestillingId,
}

/// What the finalization of one case did
///
/// `None` means the step was not needed or could not be attempted.
#[derive(Debug, Default)]
pub struct FerdigstillResultat {
    pub journalpost: Option<Result<OpprettetJournalpost, KunneIkkeOppretteJournalpost>>,
    pub brevbestilling: Option<Result<BestiltBrev, KunneIkkeBestilleBrev>>,
}

impl FerdigstillResultat {
    pub fn er_tom(&self) -> bool {
        self.journalpost.is_none() && self.brevbestilling.is_none()
    }
}

/// Outcome of a batch sweep, one entry per attempted step
#[derive(Debug, Default)]
pub struct BatchResultat {
    pub journalposter: Vec<Result<OpprettetJournalpost, KunneIkkeOppretteJournalpost>>,
    pub brevbestillinger: Vec<Result<BestiltBrev, KunneIkkeBestilleBrev>>,
}

impl BatchResultat {
    pub fn er_tom(&self) -> bool {
        self.journalposter.is_empty() && self.brevbestillinger.is_empty()
    }

    fn legg_til(&mut self, resultat: FerdigstillResultat) {
        if let Some(r) = resultat.journalpost {
            self.journalposter.push(r);
        }
        if let Some(r) = resultat.brevbestilling {
            self.brevbestillinger.push(r);
        }
    }
}

/// Journals and distributes vedtaksbrev for iverksatte cases
///
/// Runs when the payment kvittering arrives, straight after an avslag is
/// iverksatt, and as a periodic sweep that picks up anything left behind.
#[derive(Clone)]
pub struct FerdigstillIverksettingService {
    ports: Ports,
}

impl FerdigstillIverksettingService {
    pub fn new(ports: Ports) -> Self {
        Self { ports }
    }

    /// Kvittering hook: finishes the single case paid by `utbetaling_id`
    ///
    /// # Errors
    ///
    /// Returns `FantIkkeBehandling` or `FlereBehandlingerForUtbetaling` unless
    /// exactly one iverksatt case matches, and the journal or distribution
    /// failure if either step fails.
    pub async fn ferdigstill_iverksetting(
        &self,
        utbetaling_id: UtbetalingId,
    ) -> Result<Soknadsbehandling, KunneIkkeFerdigstilleIverksetting> {
        let mut treff = self.ports.behandlinger.hent_for_utbetaling(utbetaling_id).await?;
        treff.retain(|b| b.status().er_iverksatt());
        let mut behandling = match treff.len() {
            0 => return Err(KunneIkkeFerdigstilleIverksetting::FantIkkeBehandling),
            1 => treff.remove(0),
            antall => {
                error!(utbetaling_id = %utbetaling_id, antall, "several behandlinger share one utbetaling");
                return Err(KunneIkkeFerdigstilleIverksetting::FlereBehandlingerForUtbetaling);
            }
        };

        let resultat = self.ferdigstill_iverksetting_for_behandling(&mut behandling).await;
        if let Some(Err(e)) = resultat.journalpost {
            return Err(KunneIkkeFerdigstilleIverksetting::Journalpost(e));
        }
        if let Some(Err(e)) = resultat.brevbestilling {
            return Err(KunneIkkeFerdigstilleIverksetting::Brev(e));
        }
        Ok(behandling)
    }

    /// Journals, distributes and closes the oppgave for one case
    ///
    /// The oppgave is closed whatever happened to the letter. A case that
    /// is not iverksatt, or is already distributed, is left alone.
    pub async fn ferdigstill_iverksetting_for_behandling(
        &self,
        behandling: &mut Soknadsbehandling,
    ) -> FerdigstillResultat {
        if !behandling.status().er_iverksatt() {
            warn!(
                behandling_id = %behandling.id(),
                status = ?behandling.status(),
                "not finishing behandling that is not iverksatt"
            );
            return FerdigstillResultat::default();
        }
        if behandling.brevbestilling_id().is_some() {
            return FerdigstillResultat::default();
        }

        let mut resultat = FerdigstillResultat::default();

        if behandling.journalpost_id().is_none() {
            resultat.journalpost = Some(self.journalfor(behandling).await);
        }

        let journalforing_ok = !matches!(resultat.journalpost, Some(Err(_)));
        if journalforing_ok && behandling.journalpost_id().is_some() {
            resultat.brevbestilling = Some(self.distribuer(behandling).await);
        }

        self.lukk_oppgave(behandling).await;
        resultat
    }

    /// Sweeps cases missing a journalpost, then cases missing distribution
    ///
    /// One case failing does not stop the sweep. A case handled in the
    /// first pass is not touched again in the second.
    pub async fn opprett_manglende_journalpost_og_brevdistribusjon(&self) -> Result<BatchResultat, PortError> {
        let mut batch = BatchResultat::default();
        let mut behandlet: HashSet<BehandlingId> = HashSet::new();

        for mut behandling in self.ports.behandlinger.hent_iverksatte_uten_journalpost().await? {
            behandlet.insert(behandling.id());
            let resultat = self.ferdigstill_iverksetting_for_behandling(&mut behandling).await;
            batch.legg_til(resultat);
        }

        for mut behandling in self.ports.behandlinger.hent_iverksatte_uten_brevbestilling().await? {
            if !behandlet.insert(behandling.id()) {
                continue;
            }
            let resultat = self.ferdigstill_iverksetting_for_behandling(&mut behandling).await;
            batch.legg_til(resultat);
        }

        let feilet = batch.journalposter.iter().filter(|r| r.is_err()).count()
            + batch.brevbestillinger.iter().filter(|r| r.is_err()).count();
        info!(
            journalposter = batch.journalposter.len(),
            brevbestillinger = batch.brevbestillinger.len(),
            feilet,
            "ferdigstill batch done"
        );
        Ok(batch)
    }

    async fn journalfor(
        &self,
        behandling: &mut Soknadsbehandling,
    ) -> Result<OpprettetJournalpost, KunneIkkeOppretteJournalpost> {
        let sak_id = behandling.sak_id();
        let behandling_id = behandling.id();
        let utfall = behandling.status().utfall().unwrap_or(Utfall::Innvilget);
        let attestant = behandling.attesteringer().siste().map(|a| a.attestant().clone());

        let request = lag_brev_request(
            &self.ports,
            behandling,
            utfall,
            behandling.saksbehandler(),
            attestant.as_ref(),
        )
        .await
        .map_err(|e| {
            error!(%sak_id, %behandling_id, "could not build vedtaksbrev");
            match e {
                BrevgrunnlagFeil::FantIkkePerson => KunneIkkeOppretteJournalpost::FantIkkePerson { sak_id, behandling_id },
                BrevgrunnlagFeil::FikkIkkeHentetSaksbehandlerEllerAttestant => {
                    KunneIkkeOppretteJournalpost::FikkIkkeHentetSaksbehandlerEllerAttestant { sak_id, behandling_id }
                }
            }
        })?;

        let journalpost_id = self
            .ports
            .brev
            .journalfor_brev(request, behandling.saksnummer())
            .await
            .map_err(|e| {
                error!(%sak_id, %behandling_id, error = %e, "journaling of vedtaksbrev failed");
                KunneIkkeOppretteJournalpost::FeilVedJournalforing { sak_id, behandling_id }
            })?;

        let feil_ved_lagring = |kilde: String| {
            error!(%sak_id, %behandling_id, %journalpost_id, %kilde, "journalpost created but not stored");
            KunneIkkeOppretteJournalpost::FeilVedLagring {
                sak_id,
                behandling_id,
                journalpost_id: journalpost_id.clone(),
                kilde,
            }
        };
        behandling
            .journalfor(journalpost_id.clone())
            .map_err(|e| feil_ved_lagring(e.to_string()))?;
        lagre_behandling(self.ports.behandlinger.as_ref(), behandling)
            .await
            .map_err(|e| feil_ved_lagring(e.to_string()))?;

        info!(%sak_id, %behandling_id, %journalpost_id, "vedtaksbrev journaled");
        Ok(OpprettetJournalpost {
            sak_id,
            behandling_id,
            journalpost_id,
        })
    }

    async fn distribuer(&self, behandling: &mut Soknadsbehandling) -> Result<BestiltBrev, KunneIkkeBestilleBrev> {
        let sak_id = behandling.sak_id();
        let behandling_id = behandling.id();
        let journalpost_id = behandling
            .journalpost_id()
            .cloned()
            .ok_or(KunneIkkeBestilleBrev::MaaJournalforesForst { sak_id, behandling_id })?;

        let brevbestilling_id = self
            .ports
            .brev
            .distribuer_brev(&journalpost_id)
            .await
            .map_err(|e| {
                error!(%sak_id, %behandling_id, %journalpost_id, error = %e, "distribution of vedtaksbrev failed");
                KunneIkkeBestilleBrev::FeilVedDistribusjon {
                    sak_id,
                    behandling_id,
                    journalpost_id: journalpost_id.clone(),
                }
            })?;

        let feil_ved_lagring = |kilde: String| {
            error!(%sak_id, %behandling_id, %brevbestilling_id, %kilde, "brevbestilling done but not stored");
            KunneIkkeBestilleBrev::FeilVedLagring {
                sak_id,
                behandling_id,
                journalpost_id: journalpost_id.clone(),
                kilde,
            }
        };
        behandling
            .distribuer(brevbestilling_id.clone())
            .map_err(|e| feil_ved_lagring(e.to_string()))?;
        lagre_behandling(self.ports.behandlinger.as_ref(), behandling)
            .await
            .map_err(|e| feil_ved_lagring(e.to_string()))?;

        info!(%sak_id, %behandling_id, %journalpost_id, %brevbestilling_id, "vedtaksbrev distributed");
        Ok(BestiltBrev {
            sak_id,
            behandling_id,
            journalpost_id,
            brevbestilling_id,
        })
    }

    async fn lukk_oppgave(&self, behandling: &Soknadsbehandling) {
        let oppgave_id = behandling.oppgave_id();
        match self.ports.oppgave.lukk_oppgave_med_systembruker(oppgave_id).await {
            Ok(()) => info!(behandling_id = %behandling.id(), %oppgave_id, "oppgave closed"),
            Err(e) => error!(
                behandling_id = %behandling.id(),
                %oppgave_id,
                error = %e,
                "could not close oppgave after iverksetting"
            ),
        }
    }
}
