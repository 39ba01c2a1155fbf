//! Ferdigstill Iverksetting Tests
//!
//! Journaling, distribution and oppgave closing after iverksetting, through
//! the kvittering hook and the periodic batch.
//!
//! # Test Organization
//!
//! - `kvittering_tests` - Finishing the case paid by one utbetaling
//! - `batch_tests` - Sweeping up cases left without journalpost or brev
//! - `rekkefolge_tests` - Property test on what the steps leave behind

use core_kernel::{JournalpostId, UtbetalingId};
use domain_soknadsbehandling::ports::mock::{MockBrevPort, MockDirectoryPort, MockOppgavePort, MockPersonPort};
use domain_soknadsbehandling::*;
use proptest::prelude::*;
use test_utils::{
    assert_ingen_kall, assert_kall_i_rekkefolge, assert_steg, SoknadFixtures, SoknadsbehandlingBuilder, TestPorts,
};

// ============================================================================
// TEST FIXTURES
// ============================================================================

/// A builder for a case on its own søknad and sak
fn ny_builder() -> SoknadsbehandlingBuilder {
    SoknadsbehandlingBuilder::new().with_soknad(SoknadFixtures::soknad())
}

async fn lagre(tp: &TestPorts, mut behandling: Soknadsbehandling) -> Soknadsbehandling {
    tp.lagre(&mut behandling).await;
    behandling
}

fn journalfort(journalpost_id: &str) -> EksterneIverksettingssteg {
    EksterneIverksettingssteg::Journalfort {
        journalpost_id: JournalpostId::new(journalpost_id),
    }
}

// ============================================================================
// KVITTERING
// ============================================================================

mod kvittering_tests {
    use super::*;

    #[tokio::test]
    async fn test_distribution_success_finishes_case_and_closes_oppgave() {
        let tp = TestPorts::new();
        let utbetaling_id = UtbetalingId::new_v7();
        let behandling = lagre(&tp, ny_builder().iverksatt_innvilget(utbetaling_id)).await;
        let service = FerdigstillIverksettingService::new(tp.ports());

        let ferdig = service.ferdigstill_iverksetting(utbetaling_id).await.unwrap();

        assert_steg(
            &ferdig,
            Some(&EksterneIverksettingssteg::JournalfortOgDistribuertBrev {
                journalpost_id: JournalpostId::new("jp-1"),
                brevbestilling_id: core_kernel::BrevbestillingId::new("bb-2"),
            }),
        );
        assert_eq!(tp.hent(&behandling).await, ferdig);
        assert_kall_i_rekkefolge(
            &tp.logg,
            &[
                "brev.journalfor",
                "brev.distribuer:jp-1",
                "oppgave.lukk_systembruker:oppgave-attestering",
            ],
        )
        .await;
        assert_eq!(tp.logg.antall("oppgave.lukk_systembruker").await, 1);
    }

    #[tokio::test]
    async fn test_distribution_failure_keeps_journalfort_and_still_closes() {
        let mut tp = TestPorts::new();
        tp.brev = MockBrevPort::new(tp.logg.clone()).with_distribusjon_feil();
        let utbetaling_id = UtbetalingId::new_v7();
        let behandling = lagre(&tp, ny_builder().iverksatt_innvilget(utbetaling_id)).await;
        let service = FerdigstillIverksettingService::new(tp.ports());

        let err = service.ferdigstill_iverksetting(utbetaling_id).await.unwrap_err();

        match err {
            KunneIkkeFerdigstilleIverksetting::Brev(KunneIkkeBestilleBrev::FeilVedDistribusjon {
                behandling_id,
                journalpost_id,
                ..
            }) => {
                assert_eq!(behandling_id, behandling.id());
                assert_eq!(journalpost_id, JournalpostId::new("jp-1"));
            }
            other => panic!("expected distribution failure, got {:?}", other),
        }
        assert_steg(&tp.hent(&behandling).await, Some(&journalfort("jp-1")));
        assert_eq!(tp.logg.antall("oppgave.lukk_systembruker").await, 1);
    }

    #[tokio::test]
    async fn test_journaling_failure_skips_distribution_but_closes() {
        let mut tp = TestPorts::new();
        tp.brev = MockBrevPort::new(tp.logg.clone()).with_journalforing_feil();
        let utbetaling_id = UtbetalingId::new_v7();
        let behandling = lagre(&tp, ny_builder().iverksatt_innvilget(utbetaling_id)).await;
        let service = FerdigstillIverksettingService::new(tp.ports());

        let err = service.ferdigstill_iverksetting(utbetaling_id).await.unwrap_err();

        assert!(matches!(
            err,
            KunneIkkeFerdigstilleIverksetting::Journalpost(KunneIkkeOppretteJournalpost::FeilVedJournalforing { .. })
        ));
        assert_ingen_kall(&tp.logg, "brev.distribuer").await;
        assert_steg(
            &tp.hent(&behandling).await,
            Some(&EksterneIverksettingssteg::VenterPaKvittering),
        );
        assert_eq!(tp.logg.antall("oppgave.lukk_systembruker").await, 1);
    }

    #[tokio::test]
    async fn test_failing_oppgave_close_does_not_fail_finalization() {
        let mut tp = TestPorts::new();
        tp.oppgave = MockOppgavePort::new(tp.logg.clone()).with_lukk_feil();
        let utbetaling_id = UtbetalingId::new_v7();
        lagre(&tp, ny_builder().iverksatt_innvilget(utbetaling_id)).await;
        let service = FerdigstillIverksettingService::new(tp.ports());

        let ferdig = service.ferdigstill_iverksetting(utbetaling_id).await.unwrap();

        assert!(ferdig.brevbestilling_id().is_some());
        assert_eq!(tp.logg.antall("oppgave.lukk_systembruker").await, 1);
    }

    #[tokio::test]
    async fn test_unknown_utbetaling() {
        let tp = TestPorts::new();
        let service = FerdigstillIverksettingService::new(tp.ports());

        let err = service
            .ferdigstill_iverksetting(UtbetalingId::new_v7())
            .await
            .unwrap_err();

        assert!(matches!(err, KunneIkkeFerdigstilleIverksetting::FantIkkeBehandling));
        assert!(tp.logg.er_tom().await);
    }

    #[tokio::test]
    async fn test_two_cases_on_one_utbetaling() {
        let tp = TestPorts::new();
        let utbetaling_id = UtbetalingId::new_v7();
        lagre(&tp, ny_builder().iverksatt_innvilget(utbetaling_id)).await;
        lagre(&tp, ny_builder().iverksatt_innvilget(utbetaling_id)).await;
        let service = FerdigstillIverksettingService::new(tp.ports());

        let err = service.ferdigstill_iverksetting(utbetaling_id).await.unwrap_err();

        assert!(matches!(err, KunneIkkeFerdigstilleIverksetting::FlereBehandlingerForUtbetaling));
        assert!(tp.logg.er_tom().await);
    }

    #[tokio::test]
    async fn test_case_awaiting_attestering_is_left_alone() {
        let tp = TestPorts::new();
        let mut behandling = lagre(&tp, ny_builder().til_attestering_innvilget()).await;
        let service = FerdigstillIverksettingService::new(tp.ports());

        let resultat = service.ferdigstill_iverksetting_for_behandling(&mut behandling).await;

        assert!(resultat.er_tom());
        assert!(tp.logg.er_tom().await);
        assert_steg(&tp.hent(&behandling).await, None);
    }

    #[tokio::test]
    async fn test_already_distributed_case_is_left_alone() {
        let tp = TestPorts::new();
        let mut behandling = lagre(&tp, ny_builder().ferdigstilt()).await;
        let service = FerdigstillIverksettingService::new(tp.ports());

        let resultat = service.ferdigstill_iverksetting_for_behandling(&mut behandling).await;

        assert!(resultat.er_tom());
        assert!(tp.logg.er_tom().await);
    }
}

// ============================================================================
// BATCH
// ============================================================================

mod batch_tests {
    use super::*;

    #[tokio::test]
    async fn test_failing_staff_lookup_is_typed_and_brev_never_called() {
        let mut tp = TestPorts::new();
        tp.directory = MockDirectoryPort::new(tp.logg.clone()).with_feil(DirectoryFeil::FantIkkeBruker);
        let behandling = lagre(&tp, ny_builder().iverksatt_innvilget(UtbetalingId::new_v7())).await;
        let service = FerdigstillIverksettingService::new(tp.ports());

        let batch = service
            .opprett_manglende_journalpost_og_brevdistribusjon()
            .await
            .unwrap();

        assert_eq!(batch.journalposter.len(), 1);
        match &batch.journalposter[0] {
            Err(KunneIkkeOppretteJournalpost::FikkIkkeHentetSaksbehandlerEllerAttestant { sak_id, behandling_id }) => {
                assert_eq!(*sak_id, behandling.sak_id());
                assert_eq!(*behandling_id, behandling.id());
            }
            other => panic!("expected staff lookup failure, got {:?}", other),
        }
        assert!(batch.brevbestillinger.is_empty());
        assert_eq!(tp.logg.antall("brev.").await, 0);
        assert_steg(
            &tp.hent(&behandling).await,
            Some(&EksterneIverksettingssteg::VenterPaKvittering),
        );
    }

    #[tokio::test]
    async fn test_missing_person_is_typed() {
        let mut tp = TestPorts::new();
        tp.person = MockPersonPort::new(tp.logg.clone()).with_feil(PersonFeil::FantIkkePerson);
        let behandling = lagre(&tp, ny_builder().iverksatt_innvilget(UtbetalingId::new_v7())).await;
        let service = FerdigstillIverksettingService::new(tp.ports());

        let batch = service
            .opprett_manglende_journalpost_og_brevdistribusjon()
            .await
            .unwrap();

        assert!(matches!(
            batch.journalposter.as_slice(),
            [Err(KunneIkkeOppretteJournalpost::FantIkkePerson { .. })]
        ));
        assert_eq!(batch.journalposter[0].as_ref().unwrap_err().behandling_id(), behandling.id());
        assert_ingen_kall(&tp.logg, "brev.").await;
        assert_ingen_kall(&tp.logg, "directory.").await;
    }

    #[tokio::test]
    async fn test_batch_handles_each_case_once() {
        let tp = TestPorts::new();
        let uten_journalpost = lagre(&tp, ny_builder().iverksatt_innvilget(UtbetalingId::new_v7())).await;
        let journalfort_avslag = lagre(&tp, ny_builder().iverksatt_avslag(JournalpostId::new("jp-avslag"))).await;
        let service = FerdigstillIverksettingService::new(tp.ports());

        let batch = service
            .opprett_manglende_journalpost_og_brevdistribusjon()
            .await
            .unwrap();

        assert_eq!(batch.journalposter.len(), 1);
        assert_eq!(batch.brevbestillinger.len(), 2);
        assert!(batch.journalposter.iter().all(|r| r.is_ok()));
        assert!(batch.brevbestillinger.iter().all(|r| r.is_ok()));
        assert_eq!(tp.logg.antall("brev.journalfor").await, 1);
        assert_eq!(tp.logg.antall("brev.distribuer").await, 2);
        assert_eq!(tp.logg.antall("brev.distribuer:jp-avslag").await, 1);
        assert_eq!(tp.logg.antall("oppgave.lukk_systembruker").await, 2);

        for behandling in [uten_journalpost, journalfort_avslag] {
            assert!(tp.hent(&behandling).await.brevbestilling_id().is_some());
        }
    }

    #[tokio::test]
    async fn test_one_failing_case_does_not_stop_the_batch() {
        let mut tp = TestPorts::new();
        tp.brev = MockBrevPort::new(tp.logg.clone()).with_distribusjon_feil();
        lagre(&tp, ny_builder().iverksatt_avslag(JournalpostId::new("jp-a"))).await;
        lagre(&tp, ny_builder().iverksatt_avslag(JournalpostId::new("jp-b"))).await;
        let service = FerdigstillIverksettingService::new(tp.ports());

        let batch = service
            .opprett_manglende_journalpost_og_brevdistribusjon()
            .await
            .unwrap();

        assert!(batch.journalposter.is_empty());
        assert_eq!(batch.brevbestillinger.len(), 2);
        assert!(batch.brevbestillinger.iter().all(|r| r.is_err()));
        assert_eq!(tp.logg.antall("oppgave.lukk_systembruker").await, 2);
    }

    #[tokio::test]
    async fn test_rerun_over_finished_cases_does_nothing() {
        let tp = TestPorts::new();
        lagre(&tp, ny_builder().ferdigstilt()).await;
        lagre(&tp, ny_builder().ferdigstilt()).await;
        let service = FerdigstillIverksettingService::new(tp.ports());

        let batch = service
            .opprett_manglende_journalpost_og_brevdistribusjon()
            .await
            .unwrap();

        assert!(batch.er_tom());
        assert!(tp.logg.er_tom().await);
    }

    #[tokio::test]
    async fn test_second_run_after_successful_batch_is_empty() {
        let tp = TestPorts::new();
        lagre(&tp, ny_builder().iverksatt_innvilget(UtbetalingId::new_v7())).await;
        let service = FerdigstillIverksettingService::new(tp.ports());

        let forste = service
            .opprett_manglende_journalpost_og_brevdistribusjon()
            .await
            .unwrap();
        assert!(!forste.er_tom());
        let kall_etter_forste = tp.logg.kall().await.len();

        let andre = service
            .opprett_manglende_journalpost_og_brevdistribusjon()
            .await
            .unwrap();

        assert!(andre.er_tom());
        assert_eq!(tp.logg.kall().await.len(), kall_etter_forste);
    }

    #[tokio::test]
    async fn test_cases_not_iverksatt_are_ignored() {
        let tp = TestPorts::new();
        let builder = ny_builder();
        tp.lagre_soknad(builder.soknad()).await;
        lagre(&tp, builder.til_attestering_innvilget()).await;
        let service = FerdigstillIverksettingService::new(tp.ports());

        let batch = service
            .opprett_manglende_journalpost_og_brevdistribusjon()
            .await
            .unwrap();

        assert!(batch.er_tom());
        assert!(tp.logg.er_tom().await);
    }
}

// ============================================================================
// STEP ORDER PROPERTIES
// ============================================================================

mod rekkefolge_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Distribution is never recorded without a journalpost, whatever fails
        #[test]
        fn prop_brev_never_without_journalpost(
            journal_feiler in any::<bool>(),
            distribusjon_feiler in any::<bool>(),
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            runtime.block_on(async {
                let mut tp = TestPorts::new();
                let mut brev = MockBrevPort::new(tp.logg.clone());
                if journal_feiler {
                    brev = brev.with_journalforing_feil();
                }
                if distribusjon_feiler {
                    brev = brev.with_distribusjon_feil();
                }
                tp.brev = brev;
                let utbetaling_id = UtbetalingId::new_v7();
                let behandling = lagre(&tp, ny_builder().iverksatt_innvilget(utbetaling_id)).await;
                let service = FerdigstillIverksettingService::new(tp.ports());

                let _ = service.ferdigstill_iverksetting(utbetaling_id).await;

                let lagret = tp.hent(&behandling).await;
                assert!(lagret.brevbestilling_id().is_none() || lagret.journalpost_id().is_some());
                assert_eq!(lagret.brevbestilling_id().is_some(), !journal_feiler && !distribusjon_feiler);
                assert_eq!(tp.logg.antall("brev.distribuer").await, usize::from(!journal_feiler));
                assert_eq!(tp.logg.antall("oppgave.lukk_systembruker").await, 1);
            });
        }
    }
}
