//! Søknad repository
//!
//! Søknader are written once when received and later updated with their
//! oppgave, journalpost and lukking.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{
    DomainPort, Fnr, JournalpostId, NavIdent, OppgaveId, PortError, Saksnummer, SakId, SoknadId,
};
use domain_beregning::Sakstype;
use domain_soknadsbehandling::{Lukket, Soknad, SoknadRepo};

use crate::error::DatabaseError;

#[derive(Debug, sqlx::FromRow)]
struct SoknadRow {
    id: Uuid,
    sak_id: Uuid,
    saksnummer: i64,
    fnr: String,
    sakstype: String,
    oppgave_id: Option<String>,
    journalpost_id: Option<String>,
    lukket: Option<DateTime<Utc>>,
    lukket_av: Option<String>,
    opprettet: DateTime<Utc>,
}

fn sakstype_kolonne(sakstype: Sakstype) -> &'static str {
    match sakstype {
        Sakstype::Ufore => "UFORE",
        Sakstype::Alder => "ALDER",
    }
}

fn ugyldig(kolonne: &str, verdi: impl std::fmt::Display) -> DatabaseError {
    DatabaseError::SerializationError(format!("invalid {} column value '{}'", kolonne, verdi))
}

impl TryFrom<SoknadRow> for Soknad {
    type Error = DatabaseError;

    fn try_from(row: SoknadRow) -> Result<Self, Self::Error> {
        let sakstype = match row.sakstype.as_str() {
            "UFORE" => Sakstype::Ufore,
            "ALDER" => Sakstype::Alder,
            other => return Err(ugyldig("sakstype", other)),
        };
        let lukket = match (row.lukket, row.lukket_av) {
            (Some(tidspunkt), Some(av)) => Some(Lukket {
                tidspunkt,
                saksbehandler: NavIdent::new(av.clone()).map_err(|_| ugyldig("lukket_av", av))?,
            }),
            (None, None) => None,
            _ => return Err(ugyldig("lukket", "half-set")),
        };

        Ok(Soknad {
            id: SoknadId::from_uuid(row.id),
            sak_id: SakId::from_uuid(row.sak_id),
            saksnummer: Saksnummer::new(row.saksnummer)
                .map_err(|_| ugyldig("saksnummer", row.saksnummer))?,
            fnr: Fnr::from_str(&row.fnr).map_err(|_| ugyldig("fnr", "<redacted>"))?,
            sakstype,
            opprettet: row.opprettet,
            oppgave_id: row.oppgave_id.map(OppgaveId::new),
            journalpost_id: row.journalpost_id.map(JournalpostId::new),
            lukket,
        })
    }
}

/// PostgreSQL implementation of [`SoknadRepo`]
#[derive(Debug, Clone)]
pub struct PostgresSoknadRepo {
    pool: PgPool,
}

impl PostgresSoknadRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PostgresSoknadRepo {}

#[async_trait]
impl SoknadRepo for PostgresSoknadRepo {
    #[instrument(skip(self), fields(soknad_id = %id))]
    async fn hent_soknad(&self, id: SoknadId) -> Result<Option<Soknad>, PortError> {
        let row = sqlx::query_as::<_, SoknadRow>(
            r#"
            SELECT id, sak_id, saksnummer, fnr, sakstype, oppgave_id,
                   journalpost_id, lukket, lukket_av, opprettet
            FROM soknader
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(row.map(Soknad::try_from).transpose()?)
    }

    #[instrument(skip(self, soknad), fields(soknad_id = %soknad.id, sak_id = %soknad.sak_id))]
    async fn lagre_soknad(&self, soknad: &Soknad) -> Result<(), PortError> {
        sqlx::query(
            r#"
            INSERT INTO soknader (
                id, sak_id, saksnummer, fnr, sakstype, oppgave_id,
                journalpost_id, lukket, lukket_av, opprettet
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE
            SET oppgave_id = EXCLUDED.oppgave_id,
                journalpost_id = EXCLUDED.journalpost_id,
                lukket = EXCLUDED.lukket,
                lukket_av = EXCLUDED.lukket_av
            "#,
        )
        .bind(soknad.id.as_uuid())
        .bind(soknad.sak_id.as_uuid())
        .bind(soknad.saksnummer.value())
        .bind(soknad.fnr.as_str())
        .bind(sakstype_kolonne(soknad.sakstype))
        .bind(soknad.oppgave_id.as_ref().map(|id| id.as_str()))
        .bind(soknad.journalpost_id.as_ref().map(|id| id.as_str()))
        .bind(soknad.lukket.as_ref().map(|l| l.tidspunkt))
        .bind(soknad.lukket.as_ref().map(|l| l.saksbehandler.as_str()))
        .bind(soknad.opprettet)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        debug!("Soknad stored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::SoknadFixtures;

    fn row_for(soknad: &Soknad) -> SoknadRow {
        SoknadRow {
            id: *soknad.id.as_uuid(),
            sak_id: *soknad.sak_id.as_uuid(),
            saksnummer: soknad.saksnummer.value(),
            fnr: soknad.fnr.as_str().to_string(),
            sakstype: sakstype_kolonne(soknad.sakstype).to_string(),
            oppgave_id: soknad.oppgave_id.as_ref().map(|id| id.as_str().to_string()),
            journalpost_id: None,
            lukket: None,
            lukket_av: None,
            opprettet: soknad.opprettet,
        }
    }

    #[test]
    fn test_row_maps_to_soknad() {
        let soknad = SoknadFixtures::soknad();
        let mapped = Soknad::try_from(row_for(&soknad)).unwrap();
        assert_eq!(mapped, soknad);
    }

    #[test]
    fn test_unknown_sakstype_is_rejected() {
        let mut row = row_for(&SoknadFixtures::soknad());
        row.sakstype = "BARN".to_string();
        assert!(matches!(Soknad::try_from(row), Err(DatabaseError::SerializationError(_))));
    }

    #[test]
    fn test_half_set_lukking_is_rejected() {
        let mut row = row_for(&SoknadFixtures::soknad());
        row.lukket = Some(Utc::now());
        assert!(Soknad::try_from(row).is_err());
    }
}
