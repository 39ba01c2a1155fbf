//! HTTP API Layer
//!
//! REST API for søknadsbehandling using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: one per service operation, scoped under `/api/v1/saker/:sak_id/behandlinger`
//! - **Middleware**: bearer JWT authentication, request tracing, audit logging
//! - **DTOs**: request bodies validated with `validator`, responses flattened from the aggregate
//! - **Error Handling**: `{ "error": <kode>, "message": <text> }` with the domain's stable codes
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, stub_ports, AppState};
//!
//! let state = AppState::new(stub_ports(pool), config);
//! axum::serve(listener, create_router(state)).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_soknadsbehandling::ports::mock::{
    KallLogg, MockBrevPort, MockDirectoryPort, MockOppgavePort, MockPersonPort, MockUtbetalingPort,
};
use domain_soknadsbehandling::{
    LoggingStatistikkObserver, Ports, SoknadRepo, SoknadsbehandlingRepo, SoknadsbehandlingService,
    StatistikkObserver,
};
use infra_db::{PostgresSoknadRepo, PostgresSoknadsbehandlingRepo};

use crate::config::ApiConfig;
use crate::handlers::{behandling, drift, health};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SoknadsbehandlingService>,
    pub soknader: Arc<dyn SoknadRepo>,
    pub behandlinger: Arc<dyn SoknadsbehandlingRepo>,
    pub config: ApiConfig,
}

impl AppState {
    /// Builds the service over `ports` with statistikk events logged
    pub fn new(ports: Ports, config: ApiConfig) -> Self {
        Self::with_observers(ports, config, vec![Arc::new(LoggingStatistikkObserver)])
    }

    pub fn with_observers(
        ports: Ports,
        config: ApiConfig,
        observers: Vec<Arc<dyn StatistikkObserver>>,
    ) -> Self {
        let soknader = ports.soknader.clone();
        let behandlinger = ports.behandlinger.clone();
        let service = observers
            .into_iter()
            .fold(SoknadsbehandlingService::new(ports), |service, observer| {
                service.with_observer(observer)
            });

        Self {
            service: Arc::new(service),
            soknader,
            behandlinger,
            config,
        }
    }
}

/// Postgres repositories with in-memory stand-ins for every external system
pub fn stub_ports(pool: PgPool) -> Ports {
    let logg = KallLogg::new();
    Ports {
        behandlinger: Arc::new(PostgresSoknadsbehandlingRepo::new(pool.clone())),
        soknader: Arc::new(PostgresSoknadRepo::new(pool)),
        person: Arc::new(MockPersonPort::new(logg.clone())),
        directory: Arc::new(MockDirectoryPort::new(logg.clone())),
        brev: Arc::new(MockBrevPort::new(logg.clone())),
        oppgave: Arc::new(MockOppgavePort::new(logg.clone())),
        utbetaling: Arc::new(MockUtbetalingPort::new(logg)),
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let behandling_routes = Router::new()
        .route("/", post(behandling::opprett))
        .route("/:behandling_id", get(behandling::hent))
        .route("/:behandling_id/stonadsperiode", patch(behandling::oppdater_stonadsperiode))
        .route("/:behandling_id/grunnlag/bosituasjon", post(behandling::leggtil_bosituasjon))
        .route("/:behandling_id/grunnlag/fradrag", post(behandling::leggtil_fradrag))
        .route("/:behandling_id/vilkarsvurder", patch(behandling::vilkarsvurder))
        .route("/:behandling_id/beregn", post(behandling::beregn))
        .route("/:behandling_id/simuler", post(behandling::simuler))
        .route("/:behandling_id/tilAttestering", post(behandling::send_til_attestering))
        .route("/:behandling_id/underkjenn", patch(behandling::underkjenn))
        .route("/:behandling_id/iverksett", patch(behandling::iverksett))
        .route("/:behandling_id/vedtaksutkast", post(behandling::vedtaksutkast));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/saker/:sak_id/behandlinger", behandling_routes)
        .route("/drift/iverksettinger/ferdigstill", post(drift::ferdigstill_iverksettinger))
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
