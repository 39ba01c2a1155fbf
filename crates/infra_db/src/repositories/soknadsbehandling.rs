//! Søknadsbehandling repository
//!
//! Stores the aggregate as a JSONB snapshot with lookup columns copied out of
//! it. Writes are optimistic: a row is only replaced when its stored
//! `versjon` is exactly one below the incoming aggregate's.

use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use core_kernel::{
    BehandlingId, DomainPort, HealthCheckResult, HealthCheckable, PortError, SakId, SoknadId,
    UtbetalingId,
};
use domain_soknadsbehandling::{Soknadsbehandling, SoknadsbehandlingRepo};

use super::IVERKSATT_PREFIX;
use crate::error::DatabaseError;

const ADAPTER_ID: &str = "postgres-soknadsbehandling-repo";

const SELECT_SNAPSHOT: &str = "SELECT id, versjon, data FROM soknadsbehandlinger";

/// Raw row as read back for mapping
#[derive(Debug, sqlx::FromRow)]
struct SnapshotRow {
    id: Uuid,
    versjon: i64,
    data: serde_json::Value,
}

impl SnapshotRow {
    fn into_domain(self) -> Result<Soknadsbehandling, DatabaseError> {
        let behandling: Soknadsbehandling = serde_json::from_value(self.data)?;
        if behandling.versjon() != self.versjon || *behandling.id().as_uuid() != self.id {
            return Err(DatabaseError::SerializationError(format!(
                "snapshot for soknadsbehandling '{}' disagrees with its columns (versjon {} vs {})",
                self.id,
                behandling.versjon(),
                self.versjon
            )));
        }
        Ok(behandling)
    }
}

/// Column values copied out of the aggregate on write
struct Kolonner {
    id: Uuid,
    sak_id: Uuid,
    soknad_id: Uuid,
    saksnummer: i64,
    status: &'static str,
    fnr: String,
    utbetaling_id: Option<Uuid>,
    journalpost_id: Option<String>,
    brevbestilling_id: Option<String>,
    versjon: i64,
    data: serde_json::Value,
    opprettet: DateTime<Utc>,
    endret: DateTime<Utc>,
}

impl Kolonner {
    fn fra(behandling: &Soknadsbehandling) -> Result<Self, DatabaseError> {
        Ok(Self {
            id: *behandling.id().as_uuid(),
            sak_id: *behandling.sak_id().as_uuid(),
            soknad_id: *behandling.soknad_id().as_uuid(),
            saksnummer: behandling.saksnummer().value(),
            status: behandling.status().navn(),
            fnr: behandling.fnr().as_str().to_string(),
            utbetaling_id: behandling.utbetaling_id().map(|id| *id.as_uuid()),
            journalpost_id: behandling.journalpost_id().map(|id| id.as_str().to_string()),
            brevbestilling_id: behandling.brevbestilling_id().map(|id| id.as_str().to_string()),
            versjon: behandling.versjon(),
            data: serde_json::to_value(behandling)?,
            opprettet: behandling.opprettet(),
            endret: behandling.endret(),
        })
    }
}

/// PostgreSQL implementation of [`SoknadsbehandlingRepo`]
#[derive(Debug, Clone)]
pub struct PostgresSoknadsbehandlingRepo {
    pool: PgPool,
}

impl PostgresSoknadsbehandlingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn hent_mange(
        &self,
        sql: &str,
        bind: Option<Uuid>,
    ) -> Result<Vec<Soknadsbehandling>, DatabaseError> {
        let mut query = sqlx::query_as::<_, SnapshotRow>(sql);
        if let Some(verdi) = bind {
            query = query.bind(verdi);
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(SnapshotRow::into_domain).collect()
    }

    async fn hent_en(
        &self,
        sql: &str,
        verdi: Uuid,
    ) -> Result<Option<Soknadsbehandling>, DatabaseError> {
        let row = sqlx::query_as::<_, SnapshotRow>(sql)
            .bind(verdi)
            .fetch_optional(&self.pool)
            .await?;
        row.map(SnapshotRow::into_domain).transpose()
    }

    async fn sett_inn(&self, k: &Kolonner) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            r#"
            INSERT INTO soknadsbehandlinger (
                id, sak_id, soknad_id, saksnummer, status, fnr, utbetaling_id,
                journalpost_id, brevbestilling_id, versjon, data, opprettet, endret
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(k.id)
        .bind(k.sak_id)
        .bind(k.soknad_id)
        .bind(k.saksnummer)
        .bind(k.status)
        .bind(&k.fnr)
        .bind(k.utbetaling_id)
        .bind(&k.journalpost_id)
        .bind(&k.brevbestilling_id)
        .bind(k.versjon)
        .bind(&k.data)
        .bind(k.opprettet)
        .bind(k.endret)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from(&e))?;
        Ok(result.rows_affected())
    }

    async fn oppdater(&self, k: &Kolonner) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE soknadsbehandlinger
            SET status = $2,
                utbetaling_id = $3,
                journalpost_id = $4,
                brevbestilling_id = $5,
                versjon = $6,
                data = $7,
                endret = $8
            WHERE id = $1 AND versjon = $6 - 1
            "#,
        )
        .bind(k.id)
        .bind(k.status)
        .bind(k.utbetaling_id)
        .bind(&k.journalpost_id)
        .bind(&k.brevbestilling_id)
        .bind(k.versjon)
        .bind(&k.data)
        .bind(k.endret)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from(&e))?;
        Ok(result.rows_affected())
    }
}

impl DomainPort for PostgresSoknadsbehandlingRepo {}

#[async_trait]
impl HealthCheckable for PostgresSoknadsbehandlingRepo {
    async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();
        match sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&self.pool).await {
            Ok(_) => HealthCheckResult::healthy(ADAPTER_ID, start),
            Err(e) => HealthCheckResult::unhealthy(ADAPTER_ID, start, format!("Database error: {}", e)),
        }
    }
}

#[async_trait]
impl SoknadsbehandlingRepo for PostgresSoknadsbehandlingRepo {
    #[instrument(skip(self), fields(behandling_id = %id))]
    async fn hent(&self, id: BehandlingId) -> Result<Option<Soknadsbehandling>, PortError> {
        let sql = format!("{SELECT_SNAPSHOT} WHERE id = $1");
        Ok(self.hent_en(&sql, *id.as_uuid()).await?)
    }

    #[instrument(skip(self), fields(soknad_id = %soknad_id))]
    async fn hent_for_soknad(&self, soknad_id: SoknadId) -> Result<Option<Soknadsbehandling>, PortError> {
        let sql = format!("{SELECT_SNAPSHOT} WHERE soknad_id = $1");
        Ok(self.hent_en(&sql, *soknad_id.as_uuid()).await?)
    }

    #[instrument(skip(self), fields(sak_id = %sak_id))]
    async fn hent_for_sak(&self, sak_id: SakId) -> Result<Vec<Soknadsbehandling>, PortError> {
        let sql = format!("{SELECT_SNAPSHOT} WHERE sak_id = $1 ORDER BY opprettet, id");
        Ok(self.hent_mange(&sql, Some(*sak_id.as_uuid())).await?)
    }

    #[instrument(skip(self, behandling), fields(
        behandling_id = %behandling.id(),
        status = %behandling.status(),
        versjon = behandling.versjon(),
    ))]
    async fn lagre(&self, behandling: &Soknadsbehandling) -> Result<(), PortError> {
        let kolonner = Kolonner::fra(behandling)?;

        let rader = if kolonner.versjon == 1 {
            self.sett_inn(&kolonner).await?
        } else {
            self.oppdater(&kolonner).await?
        };

        if rader == 0 {
            warn!("Stale write rejected");
            return Err(DatabaseError::VersionConflict {
                entity: "Soknadsbehandling",
                id: behandling.id().to_string(),
                expected: kolonner.versjon - 1,
            }
            .into());
        }

        debug!("Soknadsbehandling stored");
        Ok(())
    }

    #[instrument(skip(self), fields(utbetaling_id = %utbetaling_id))]
    async fn hent_for_utbetaling(&self, utbetaling_id: UtbetalingId) -> Result<Vec<Soknadsbehandling>, PortError> {
        let sql = format!(
            "{SELECT_SNAPSHOT} WHERE utbetaling_id = $1 AND status LIKE '{IVERKSATT_PREFIX}' ORDER BY opprettet, id"
        );
        Ok(self.hent_mange(&sql, Some(*utbetaling_id.as_uuid())).await?)
    }

    #[instrument(skip(self))]
    async fn hent_iverksatte_uten_journalpost(&self) -> Result<Vec<Soknadsbehandling>, PortError> {
        let sql = format!(
            "{SELECT_SNAPSHOT} WHERE status LIKE '{IVERKSATT_PREFIX}' AND journalpost_id IS NULL ORDER BY opprettet, id"
        );
        let behandlinger = self.hent_mange(&sql, None).await?;
        debug!(antall = behandlinger.len(), "Found iverksatte without journalpost");
        Ok(behandlinger)
    }

    #[instrument(skip(self))]
    async fn hent_iverksatte_uten_brevbestilling(&self) -> Result<Vec<Soknadsbehandling>, PortError> {
        let sql = format!(
            "{SELECT_SNAPSHOT} WHERE status LIKE '{IVERKSATT_PREFIX}' \
             AND journalpost_id IS NOT NULL AND brevbestilling_id IS NULL ORDER BY opprettet, id"
        );
        let behandlinger = self.hent_mange(&sql, None).await?;
        debug!(antall = behandlinger.len(), "Found iverksatte without brevbestilling");
        Ok(behandlinger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::SoknadsbehandlingBuilder;

    #[test]
    fn test_kolonner_copy_lookup_fields() {
        let mut behandling = SoknadsbehandlingBuilder::new().ferdigstilt();
        behandling.oppdater_versjon();
        let kolonner = Kolonner::fra(&behandling).unwrap();

        assert_eq!(kolonner.status, "IVERKSATT_INNVILGET");
        assert_eq!(kolonner.journalpost_id.as_deref(), Some("jp-ferdig"));
        assert_eq!(kolonner.brevbestilling_id.as_deref(), Some("bb-ferdig"));
        assert_eq!(kolonner.utbetaling_id, behandling.utbetaling_id().map(|id| *id.as_uuid()));
        assert_eq!(kolonner.versjon, 1);
    }

    #[test]
    fn test_snapshot_round_trips_through_row() {
        let mut behandling = SoknadsbehandlingBuilder::new().til_attestering_innvilget();
        behandling.oppdater_versjon();
        let kolonner = Kolonner::fra(&behandling).unwrap();

        let row = SnapshotRow {
            id: kolonner.id,
            versjon: kolonner.versjon,
            data: kolonner.data,
        };
        assert_eq!(row.into_domain().unwrap(), behandling);
    }

    #[test]
    fn test_snapshot_with_mismatched_versjon_is_rejected() {
        let mut behandling = SoknadsbehandlingBuilder::new().uavklart();
        behandling.oppdater_versjon();
        let kolonner = Kolonner::fra(&behandling).unwrap();

        let row = SnapshotRow {
            id: kolonner.id,
            versjon: 7,
            data: kolonner.data,
        };
        assert!(matches!(row.into_domain(), Err(DatabaseError::SerializationError(_))));
    }
}
