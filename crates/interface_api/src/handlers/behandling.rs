//! Søknadsbehandling handlers
//!
//! Every route is scoped to a sak; a behandling on another sak is reported
//! as not found.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;
use uuid::Uuid;

use core_kernel::{BehandlingId, Periode, SakId, SoknadId};
use domain_soknadsbehandling::{KunneIkkeHente, KunneIkkeOpprette, Soknadsbehandling};

use crate::auth::Innlogget;
use crate::dto::behandling::*;
use crate::extract::{ApiPath, ValidertJson};
use crate::{error::ApiError, AppState};

type BehandlingSti = ApiPath<(Uuid, Uuid)>;
type Svar = Result<Json<BehandlingResponse>, ApiError>;

fn svar(behandling: &Soknadsbehandling) -> Json<BehandlingResponse> {
    Json(BehandlingResponse::from(behandling))
}

/// Loads the behandling and checks that it belongs to the sak in the path
async fn hent_i_sak(state: &AppState, sak_id: Uuid, behandling_id: Uuid) -> Result<BehandlingId, ApiError> {
    let id = BehandlingId::from_uuid(behandling_id);
    let behandling = state.service.hent(id).await?;
    if behandling.sak_id() != SakId::from_uuid(sak_id) {
        return Err(KunneIkkeHente::FantIkkeBehandling.into());
    }
    Ok(id)
}

/// Starts a behandling for a søknad on the sak
pub async fn opprett(
    State(state): State<AppState>,
    innlogget: Innlogget,
    ApiPath(sak_id): ApiPath<Uuid>,
    ValidertJson(request): ValidertJson<OpprettBehandlingRequest>,
) -> Result<(StatusCode, Json<BehandlingResponse>), ApiError> {
    innlogget.saksbehandler()?;

    let soknad_id = SoknadId::from_uuid(request.soknad_id);
    match state.soknader.hent_soknad(soknad_id).await? {
        Some(soknad) if soknad.sak_id == SakId::from_uuid(sak_id) => {}
        _ => return Err(KunneIkkeOpprette::FantIkkeSoknad.into()),
    }

    let behandling = state.service.opprett(soknad_id).await?;
    info!(behandling_id = %behandling.id(), nav_ident = %innlogget.nav_ident, "Behandling opprettet");
    Ok((StatusCode::CREATED, svar(&behandling)))
}

pub async fn hent(
    State(state): State<AppState>,
    _innlogget: Innlogget,
    ApiPath((sak_id, behandling_id)): BehandlingSti,
) -> Svar {
    let id = hent_i_sak(&state, sak_id, behandling_id).await?;
    Ok(svar(&state.service.hent(id).await?))
}

pub async fn oppdater_stonadsperiode(
    State(state): State<AppState>,
    innlogget: Innlogget,
    ApiPath((sak_id, behandling_id)): BehandlingSti,
    ValidertJson(request): ValidertJson<StonadsperiodeRequest>,
) -> Svar {
    innlogget.saksbehandler()?;
    let periode = Periode::new(request.fra_og_med, request.til_og_med)
        .map_err(|e| ApiError::bad_request("ugyldig_periode", e))?;

    let id = hent_i_sak(&state, sak_id, behandling_id).await?;
    Ok(svar(&state.service.oppdater_stonadsperiode(id, periode).await?))
}

pub async fn leggtil_bosituasjon(
    State(state): State<AppState>,
    innlogget: Innlogget,
    ApiPath((sak_id, behandling_id)): BehandlingSti,
    ValidertJson(request): ValidertJson<BosituasjonRequest>,
) -> Svar {
    innlogget.saksbehandler()?;
    let id = hent_i_sak(&state, sak_id, behandling_id).await?;
    Ok(svar(&state.service.leggtil_bosituasjon(id, request.bosituasjon).await?))
}

pub async fn leggtil_fradrag(
    State(state): State<AppState>,
    innlogget: Innlogget,
    ApiPath((sak_id, behandling_id)): BehandlingSti,
    ValidertJson(request): ValidertJson<FradragRequest>,
) -> Svar {
    innlogget.saksbehandler()?;
    let id = hent_i_sak(&state, sak_id, behandling_id).await?;
    Ok(svar(&state.service.leggtil_fradrag(id, request.fradrag).await?))
}

pub async fn vilkarsvurder(
    State(state): State<AppState>,
    innlogget: Innlogget,
    ApiPath((sak_id, behandling_id)): BehandlingSti,
    ValidertJson(request): ValidertJson<VilkarsvurderRequest>,
) -> Svar {
    innlogget.saksbehandler()?;
    let id = hent_i_sak(&state, sak_id, behandling_id).await?;
    Ok(svar(&state.service.vilkarsvurder(id, request.vilkarsvurderinger).await?))
}

pub async fn beregn(
    State(state): State<AppState>,
    innlogget: Innlogget,
    ApiPath((sak_id, behandling_id)): BehandlingSti,
    ValidertJson(request): ValidertJson<BeregnRequest>,
) -> Svar {
    innlogget.saksbehandler()?;
    let id = hent_i_sak(&state, sak_id, behandling_id).await?;
    Ok(svar(&state.service.beregn(id, request.begrunnelse).await?))
}

pub async fn simuler(
    State(state): State<AppState>,
    innlogget: Innlogget,
    ApiPath((sak_id, behandling_id)): BehandlingSti,
) -> Svar {
    let saksbehandler = innlogget.saksbehandler()?;
    let id = hent_i_sak(&state, sak_id, behandling_id).await?;
    Ok(svar(&state.service.simuler(id, saksbehandler).await?))
}

pub async fn send_til_attestering(
    State(state): State<AppState>,
    innlogget: Innlogget,
    ApiPath((sak_id, behandling_id)): BehandlingSti,
    ValidertJson(request): ValidertJson<TilAttesteringRequest>,
) -> Svar {
    let saksbehandler = innlogget.saksbehandler()?;
    let id = hent_i_sak(&state, sak_id, behandling_id).await?;
    let behandling = state
        .service
        .send_til_attestering(id, saksbehandler, request.fritekst)
        .await?;
    Ok(svar(&behandling))
}

pub async fn underkjenn(
    State(state): State<AppState>,
    innlogget: Innlogget,
    ApiPath((sak_id, behandling_id)): BehandlingSti,
    ValidertJson(request): ValidertJson<UnderkjennRequest>,
) -> Svar {
    let attestant = innlogget.attestant()?;
    let id = hent_i_sak(&state, sak_id, behandling_id).await?;
    let behandling = state
        .service
        .underkjenn(id, attestant, request.grunn, request.kommentar)
        .await?;
    Ok(svar(&behandling))
}

pub async fn iverksett(
    State(state): State<AppState>,
    innlogget: Innlogget,
    ApiPath((sak_id, behandling_id)): BehandlingSti,
) -> Svar {
    let attestant = innlogget.attestant()?;
    let id = hent_i_sak(&state, sak_id, behandling_id).await?;
    Ok(svar(&state.service.iverksett(id, attestant).await?))
}

/// Renders the vedtaksbrev as it would be sent
pub async fn vedtaksutkast(
    State(state): State<AppState>,
    innlogget: Innlogget,
    ApiPath((sak_id, behandling_id)): BehandlingSti,
) -> Result<Response, ApiError> {
    let saksbehandler = innlogget.saksbehandler()?;
    let id = hent_i_sak(&state, sak_id, behandling_id).await?;
    let pdf = state.service.lag_brevutkast(id, saksbehandler).await?;
    Ok(([(header::CONTENT_TYPE, "application/pdf")], pdf).into_response())
}
