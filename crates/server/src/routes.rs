use axum::{extract::State, routing::{get, post}, Json, Router};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, Level};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use axum::http::StatusCode;
use common::types::{Health, RunningMessage};

use crate::errors::ApiError;
use crate::openapi::ApiDoc;

pub mod auth;

use auth::ServerState;

pub const RUNNING_MESSAGE: &str = "Accounts API is up and running";

/// Liveness only; does not touch the store.
#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Store probe. Any failure is a hard 500, never a degraded 200.
#[utoipa::path(get, path = "/", tag = "health", responses((status = 200, description = "Store reachable", body = crate::openapi::RunningResponse), (status = 500, description = "Store probe failed")))]
pub async fn root(State(state): State<ServerState>) -> Result<Json<RunningMessage>, ApiError> {
    if let Err(e) = state.auth.check_store().await {
        error!(error = %e, "store health check failed");
        return Err(ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.code(), format!("Error: {e}")));
    }
    Ok(Json(RunningMessage { msg: RUNNING_MESSAGE.to_string() }))
}

/// Build the full application router
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/signup", post(auth::signup))
        .route("/signin", post(auth::signin))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
