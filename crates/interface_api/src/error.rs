//! API error handling
//!
//! Every domain error is turned into an [`ApiError`] here, carrying the
//! domain's stable `kode()` as the `error` field of the response body.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use core_kernel::PortError;
use domain_soknadsbehandling::{
    KunneIkkeBeregne, KunneIkkeHente, KunneIkkeIverksette, KunneIkkeLageBrevutkast, KunneIkkeOppdatere,
    KunneIkkeOpprette, KunneIkkeSendeTilAttestering, KunneIkkeSimulere, KunneIkkeUnderkjenne,
    KunneIkkeVilkarsvurdere, SoknadsbehandlingError,
};

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    NotFound { kode: &'static str, message: String },

    #[error("{message}")]
    BadRequest { kode: &'static str, message: String },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{message}")]
    Forbidden { kode: &'static str, message: String },

    #[error("{message}")]
    Conflict { kode: &'static str, message: String },

    #[error("{message}")]
    Internal { kode: &'static str, message: String },
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ApiError {
    pub fn not_found(kode: &'static str, message: impl ToString) -> Self {
        ApiError::NotFound { kode, message: message.to_string() }
    }

    pub fn bad_request(kode: &'static str, message: impl ToString) -> Self {
        ApiError::BadRequest { kode, message: message.to_string() }
    }

    pub fn forbidden(kode: &'static str, message: impl ToString) -> Self {
        ApiError::Forbidden { kode, message: message.to_string() }
    }

    pub fn internal(kode: &'static str, message: impl ToString) -> Self {
        ApiError::Internal { kode, message: message.to_string() }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kode(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::NotFound { kode, .. }
            | ApiError::BadRequest { kode, .. }
            | ApiError::Forbidden { kode, .. }
            | ApiError::Conflict { kode, .. }
            | ApiError::Internal { kode, .. } => kode,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(kode = self.kode(), error = %self, "Request failed");
        }

        let body = ErrorResponse {
            error: self.kode().to_string(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

// ============================================================================
// Extractor rejections
// ============================================================================

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request("ugyldig_body", rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bad_request("ugyldig_sti", rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::bad_request("validation_error", errors)
    }
}

// ============================================================================
// Domain errors
// ============================================================================

impl From<PortError> for ApiError {
    fn from(error: PortError) -> Self {
        if error.is_conflict() {
            ApiError::Conflict { kode: "samtidig_endring", message: error.to_string() }
        } else {
            ApiError::internal("repository_feil", error)
        }
    }
}

impl From<SoknadsbehandlingError> for ApiError {
    fn from(error: SoknadsbehandlingError) -> Self {
        let kode = error.kode();
        match error {
            SoknadsbehandlingError::AttestantOgSaksbehandlerKanIkkeVaereSammePerson => {
                ApiError::forbidden(kode, error)
            }
            SoknadsbehandlingError::UgyldigStatusovergang { .. }
            | SoknadsbehandlingError::IkkeIverksatt
            | SoknadsbehandlingError::Steg(_) => ApiError::internal(kode, error),
            _ => ApiError::bad_request(kode, error),
        }
    }
}

impl From<KunneIkkeOpprette> for ApiError {
    fn from(error: KunneIkkeOpprette) -> Self {
        let kode = error.kode();
        match error {
            KunneIkkeOpprette::FantIkkeSoknad => ApiError::not_found(kode, error),
            KunneIkkeOpprette::Repo(e) => e.into(),
            _ => ApiError::bad_request(kode, error),
        }
    }
}

impl From<KunneIkkeHente> for ApiError {
    fn from(error: KunneIkkeHente) -> Self {
        match error {
            KunneIkkeHente::FantIkkeBehandling => ApiError::not_found(error.kode(), error),
            KunneIkkeHente::Repo(e) => e.into(),
        }
    }
}

impl From<KunneIkkeOppdatere> for ApiError {
    fn from(error: KunneIkkeOppdatere) -> Self {
        match error {
            KunneIkkeOppdatere::FantIkkeBehandling => ApiError::not_found(error.kode(), error),
            KunneIkkeOppdatere::Behandling(e) => e.into(),
            KunneIkkeOppdatere::Repo(e) => e.into(),
        }
    }
}

impl From<KunneIkkeVilkarsvurdere> for ApiError {
    fn from(error: KunneIkkeVilkarsvurdere) -> Self {
        match error {
            KunneIkkeVilkarsvurdere::FantIkkeBehandling => ApiError::not_found(error.kode(), error),
            KunneIkkeVilkarsvurdere::Behandling(e) => e.into(),
            KunneIkkeVilkarsvurdere::Repo(e) => e.into(),
        }
    }
}

impl From<KunneIkkeBeregne> for ApiError {
    fn from(error: KunneIkkeBeregne) -> Self {
        let kode = error.kode();
        match error {
            KunneIkkeBeregne::FantIkkeBehandling => ApiError::not_found(kode, error),
            KunneIkkeBeregne::Behandling(e) => e.into(),
            KunneIkkeBeregne::Repo(e) => e.into(),
            KunneIkkeBeregne::ManglerStonadsperiode
            | KunneIkkeBeregne::ManglerBosituasjon
            | KunneIkkeBeregne::Beregning(_) => ApiError::bad_request(kode, error),
        }
    }
}

impl From<KunneIkkeSimulere> for ApiError {
    fn from(error: KunneIkkeSimulere) -> Self {
        let kode = error.kode();
        match error {
            KunneIkkeSimulere::FantIkkeBehandling => ApiError::not_found(kode, error),
            KunneIkkeSimulere::Behandling(e) => e.into(),
            KunneIkkeSimulere::Repo(e) => e.into(),
            KunneIkkeSimulere::SimuleringFeilet(_) | KunneIkkeSimulere::SimuleringStemmerIkkeMedBeregning => {
                ApiError::internal(kode, error)
            }
        }
    }
}

impl From<KunneIkkeSendeTilAttestering> for ApiError {
    fn from(error: KunneIkkeSendeTilAttestering) -> Self {
        let kode = error.kode();
        match error {
            KunneIkkeSendeTilAttestering::FantIkkeBehandling => ApiError::not_found(kode, error),
            KunneIkkeSendeTilAttestering::Behandling(e) => e.into(),
            KunneIkkeSendeTilAttestering::Repo(e) => e.into(),
            KunneIkkeSendeTilAttestering::KunneIkkeFinneAktorId
            | KunneIkkeSendeTilAttestering::KunneIkkeOppretteOppgave => ApiError::internal(kode, error),
        }
    }
}

impl From<KunneIkkeUnderkjenne> for ApiError {
    fn from(error: KunneIkkeUnderkjenne) -> Self {
        let kode = error.kode();
        match error {
            KunneIkkeUnderkjenne::FantIkkeBehandling => ApiError::not_found(kode, error),
            KunneIkkeUnderkjenne::Behandling(e) => e.into(),
            KunneIkkeUnderkjenne::Repo(e) => e.into(),
            KunneIkkeUnderkjenne::KunneIkkeFinneAktorId | KunneIkkeUnderkjenne::KunneIkkeOppretteOppgave => {
                ApiError::internal(kode, error)
            }
        }
    }
}

impl From<KunneIkkeIverksette> for ApiError {
    fn from(error: KunneIkkeIverksette) -> Self {
        let kode = error.kode();
        match error {
            KunneIkkeIverksette::FantIkkeBehandling | KunneIkkeIverksette::FantIkkePerson => {
                ApiError::not_found(kode, error)
            }
            KunneIkkeIverksette::Behandling(e) => e.into(),
            KunneIkkeIverksette::Repo(e) => e.into(),
            _ => ApiError::internal(kode, error),
        }
    }
}

impl From<KunneIkkeLageBrevutkast> for ApiError {
    fn from(error: KunneIkkeLageBrevutkast) -> Self {
        let kode = error.kode();
        match error {
            KunneIkkeLageBrevutkast::FantIkkeBehandling | KunneIkkeLageBrevutkast::FantIkkePerson => {
                ApiError::not_found(kode, error)
            }
            KunneIkkeLageBrevutkast::ManglerUtfall => ApiError::bad_request(kode, error),
            KunneIkkeLageBrevutkast::Repo(e) => e.into(),
            _ => ApiError::internal(kode, error),
        }
    }
}
