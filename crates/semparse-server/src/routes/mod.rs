//! HTTP route handlers.

pub mod session;

use crate::state::AppState;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use semparse_core::SemparseError;
use semparse_types::ErrorKind;
use serde::Serialize;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// API routes, to be nested under `/api`.
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/session", get(session::get))
        .route("/session/paste", post(session::paste))
        .route("/session/lines", post(session::lines))
        .route("/session/csv", post(session::csv))
        .route("/session/submit", post(session::submit))
        .route("/session/export", post(session::export))
        .route("/session/reset", post(session::reset))
        .route("/session/abandon", post(session::abandon))
        .route("/health", get(health))
}

/// Full application: API under `/api`, the front end's static build everywhere else.
pub fn router(state: Arc<AppState>) -> Router {
    let static_dir = state.config.static_dir.clone();

    Router::new()
        .nest("/api", api_router())
        .fallback_service(ServeDir::new(static_dir))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

/// Controller failure rendered as a JSON error response.
#[derive(Debug)]
pub struct ApiError(pub SemparseError);

impl From<SemparseError> for ApiError {
    fn from(err: SemparseError) -> Self {
        Self(err)
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Busy | ErrorKind::InvalidStage | ErrorKind::Superseded => StatusCode::CONFLICT,
        ErrorKind::ClipboardUnavailable
        | ErrorKind::FileNotSelected
        | ErrorKind::FileUnreadable
        | ErrorKind::CsvParse => StatusCode::BAD_REQUEST,
        ErrorKind::ClusteringEngine | ErrorKind::Export => StatusCode::BAD_GATEWAY,
        ErrorKind::HungOperation => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let body = ErrorBody {
            kind,
            message: self.0.to_string(),
        };
        (status_for(kind), Json(body)).into_response()
    }
}
