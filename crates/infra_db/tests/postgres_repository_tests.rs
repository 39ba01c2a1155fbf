//! PostgreSQL Repository Tests
//!
//! Runs the repositories against a real Postgres started in a container (or
//! the database named by `TEST_DATABASE_URL`). Ignored by default since they
//! need Docker; run with `cargo test -p infra_db -- --ignored`.
//!
//! # Test Organization
//!
//! - `soknad_tests` - Storing and reading søknader
//! - `lagring_tests` - Snapshot writes and the versjon guard
//! - `oppslag_tests` - The lookups used by ferdigstilling
//! - `service_tests` - The søknadsbehandling service on top of Postgres

use std::sync::Arc;

use core_kernel::{HealthCheckable, JournalpostId, PortError, UtbetalingId};
use domain_soknadsbehandling::*;
use infra_db::{PostgresSoknadRepo, PostgresSoknadsbehandlingRepo};
use test_utils::{
    IdentFixtures, PeriodeFixtures, SoknadFixtures, SoknadsbehandlingBuilder, TestDatabase, TestPorts,
    VilkarFixtures,
};

// ============================================================================
// TEST FIXTURES
// ============================================================================

struct Repos {
    db: TestDatabase,
    soknader: PostgresSoknadRepo,
    behandlinger: PostgresSoknadsbehandlingRepo,
}

async fn repos() -> Repos {
    let db = TestDatabase::start().await.expect("test database");
    db.clear().await.expect("clear tables");
    Repos {
        soknader: PostgresSoknadRepo::new(db.pool().clone()),
        behandlinger: PostgresSoknadsbehandlingRepo::new(db.pool().clone()),
        db,
    }
}

/// Stores the builder's søknad and the case, bumping its versjon
async fn lagre(repos: &Repos, builder: &SoknadsbehandlingBuilder, mut behandling: Soknadsbehandling) -> Soknadsbehandling {
    repos.soknader.lagre_soknad(builder.soknad()).await.unwrap();
    behandling.oppdater_versjon();
    repos.behandlinger.lagre(&behandling).await.unwrap();
    behandling
}

fn ny_builder() -> SoknadsbehandlingBuilder {
    SoknadsbehandlingBuilder::new().with_soknad(SoknadFixtures::soknad())
}

// ============================================================================
// SØKNADER
// ============================================================================

mod soknad_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_soknad_round_trip() {
        let repos = repos().await;
        let soknad = SoknadFixtures::soknad();

        repos.soknader.lagre_soknad(&soknad).await.unwrap();

        let hentet = repos.soknader.hent_soknad(soknad.id).await.unwrap();
        assert_eq!(hentet, Some(soknad));
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_lukking_is_stored_on_second_write() {
        let repos = repos().await;
        let mut soknad = SoknadFixtures::soknad();
        repos.soknader.lagre_soknad(&soknad).await.unwrap();

        soknad.lukket = Some(Lukket {
            tidspunkt: PeriodeFixtures::januar_2021().fra_og_med().and_hms_opt(12, 0, 0).unwrap().and_utc(),
            saksbehandler: IdentFixtures::saksbehandler().0,
        });
        repos.soknader.lagre_soknad(&soknad).await.unwrap();

        let hentet = repos.soknader.hent_soknad(soknad.id).await.unwrap().unwrap();
        assert!(hentet.er_lukket());
        assert_eq!(hentet, soknad);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_unknown_soknad_is_none() {
        let repos = repos().await;
        let hentet = repos.soknader.hent_soknad(SoknadFixtures::soknad().id).await.unwrap();
        assert!(hentet.is_none());
    }
}

// ============================================================================
// LAGRING
// ============================================================================

mod lagring_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_snapshot_round_trip_by_every_key() {
        let repos = repos().await;
        let builder = ny_builder();
        let behandling = lagre(&repos, &builder, builder.til_attestering_innvilget()).await;

        let ved_id = repos.behandlinger.hent(behandling.id()).await.unwrap();
        let ved_soknad = repos.behandlinger.hent_for_soknad(behandling.soknad_id()).await.unwrap();
        let ved_sak = repos.behandlinger.hent_for_sak(behandling.sak_id()).await.unwrap();

        assert_eq!(ved_id.as_ref(), Some(&behandling));
        assert_eq!(ved_soknad.as_ref(), Some(&behandling));
        assert_eq!(ved_sak, vec![behandling]);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_next_versjon_replaces_the_row() {
        let repos = repos().await;
        let builder = ny_builder();
        let mut behandling = lagre(&repos, &builder, builder.simulert()).await;

        behandling
            .send_til_attestering(IdentFixtures::saksbehandler(), "", core_kernel::OppgaveId::new("oppgave-2"))
            .unwrap();
        behandling.oppdater_versjon();
        repos.behandlinger.lagre(&behandling).await.unwrap();

        let hentet = repos.behandlinger.hent(behandling.id()).await.unwrap().unwrap();
        assert_eq!(hentet.versjon(), 2);
        assert_eq!(hentet.status(), SoknadsbehandlingStatus::TilAttestering(Utfall::Innvilget));
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_stale_write_is_a_conflict() {
        let repos = repos().await;
        let builder = ny_builder();
        let lagret = lagre(&repos, &builder, builder.simulert()).await;

        let mut forste = lagret.clone();
        forste.oppdater_versjon();
        repos.behandlinger.lagre(&forste).await.unwrap();

        let mut andre = lagret;
        andre.oppdater_versjon();
        let err = repos.behandlinger.lagre(&andre).await.unwrap_err();

        assert!(matches!(err, PortError::Conflict { .. }));
        let hentet = repos.behandlinger.hent(forste.id()).await.unwrap();
        assert_eq!(hentet, Some(forste));
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_second_insert_of_same_case_is_a_conflict() {
        let repos = repos().await;
        let builder = ny_builder();
        let behandling = lagre(&repos, &builder, builder.uavklart()).await;

        let err = repos.behandlinger.lagre(&behandling).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_case_for_unknown_soknad_is_rejected() {
        let repos = repos().await;
        let mut behandling = ny_builder().uavklart();
        behandling.oppdater_versjon();

        let err = repos.behandlinger.lagre(&behandling).await.unwrap_err();
        assert!(matches!(err, PortError::Validation { .. }));
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_health_check() {
        let repos = repos().await;
        assert!(repos.behandlinger.health_check().await.is_healthy());
        drop(repos.db);
    }
}

// ============================================================================
// OPPSLAG
// ============================================================================

mod oppslag_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_iverksatte_uten_journalpost_and_brevbestilling() {
        let repos = repos().await;

        let utbetaling_id = UtbetalingId::new_v7();
        let b1 = ny_builder();
        let venter_kvittering = lagre(&repos, &b1, b1.iverksatt_innvilget(utbetaling_id)).await;

        let b2 = ny_builder();
        let journalfort = lagre(&repos, &b2, b2.iverksatt_avslag(JournalpostId::new("jp-avslag"))).await;

        let b3 = ny_builder();
        lagre(&repos, &b3, b3.ferdigstilt()).await;

        let b4 = ny_builder();
        lagre(&repos, &b4, b4.til_attestering_innvilget()).await;

        let uten_journalpost = repos.behandlinger.hent_iverksatte_uten_journalpost().await.unwrap();
        let uten_brev = repos.behandlinger.hent_iverksatte_uten_brevbestilling().await.unwrap();
        let for_utbetaling = repos.behandlinger.hent_for_utbetaling(utbetaling_id).await.unwrap();

        assert_eq!(uten_journalpost, vec![venter_kvittering.clone()]);
        assert_eq!(uten_brev, vec![journalfort]);
        assert_eq!(for_utbetaling, vec![venter_kvittering]);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_unknown_utbetaling_finds_nothing() {
        let repos = repos().await;
        let funnet = repos.behandlinger.hent_for_utbetaling(UtbetalingId::new_v7()).await.unwrap();
        assert!(funnet.is_empty());
    }
}

// ============================================================================
// SERVICE
// ============================================================================

mod service_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_full_flow_persists_ferdigstilt_case() {
        let repos = repos().await;
        let tp = TestPorts::new();
        let mut ports = tp.ports();
        ports.soknader = Arc::new(repos.soknader.clone());
        ports.behandlinger = Arc::new(repos.behandlinger.clone());
        let service = SoknadsbehandlingService::new(ports);

        let soknad = SoknadFixtures::soknad();
        repos.soknader.lagre_soknad(&soknad).await.unwrap();
        let januar = PeriodeFixtures::januar_2021();

        let id = service.opprett(soknad.id).await.unwrap().id();
        service.oppdater_stonadsperiode(id, januar).await.unwrap();
        service
            .leggtil_bosituasjon(id, domain_beregning::Bosituasjon::Enslig)
            .await
            .unwrap();
        service.vilkarsvurder(id, VilkarFixtures::alle_innvilget(januar)).await.unwrap();
        service.beregn(id, None).await.unwrap();
        service.simuler(id, IdentFixtures::saksbehandler()).await.unwrap();
        service
            .send_til_attestering(id, IdentFixtures::saksbehandler(), String::new())
            .await
            .unwrap();
        let iverksatt = service.iverksett(id, IdentFixtures::attestant()).await.unwrap();

        let ferdig = service
            .ferdigstill()
            .ferdigstill_iverksetting(iverksatt.utbetaling_id().unwrap())
            .await
            .unwrap();

        let lagret = repos.behandlinger.hent(id).await.unwrap().unwrap();
        assert_eq!(lagret, ferdig);
        assert_eq!(lagret.journalpost_id(), Some(&JournalpostId::new("jp-1")));
        assert!(lagret.brevbestilling_id().is_some());
        assert!(repos.behandlinger.hent_iverksatte_uten_journalpost().await.unwrap().is_empty());
        assert!(repos.behandlinger.hent_iverksatte_uten_brevbestilling().await.unwrap().is_empty());
    }
}
