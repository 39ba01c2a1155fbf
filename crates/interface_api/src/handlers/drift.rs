//! Drift handlers

use axum::{extract::State, Json};
use tracing::info;

use crate::auth::Innlogget;
use crate::dto::drift::BatchResultatResponse;
use crate::{error::ApiError, AppState};

/// Journals and distributes vedtaksbrev for every iverksatt case missing them
pub async fn ferdigstill_iverksettinger(
    State(state): State<AppState>,
    innlogget: Innlogget,
) -> Result<Json<BatchResultatResponse>, ApiError> {
    innlogget.drift()?;

    let resultat = state
        .service
        .ferdigstill()
        .opprett_manglende_journalpost_og_brevdistribusjon()
        .await?;

    info!(
        nav_ident = %innlogget.nav_ident,
        journalposter = resultat.journalposter.len(),
        brevbestillinger = resultat.brevbestillinger.len(),
        "Ferdigstilling batch finished"
    );
    Ok(Json(BatchResultatResponse::from(&resultat)))
}
