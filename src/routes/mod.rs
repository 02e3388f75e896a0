//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the JSON API for both panels (template search and
//! blueprint generation) plus the shared selection state, and serves the
//! bundled template images from the asset directory under `/assets`.

pub mod generate;
pub mod templates;
pub mod ui;

use std::path::Path;

use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::{ErrorBody, ErrorCode};
use crate::state::AppState;

/// Full application router.
pub fn app(state: AppState, assets_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/ui", get(ui::get_ui))
        .route("/api/ui/section", put(ui::put_section))
        .route("/api/ui/query", put(ui::put_query))
        .route("/api/view", get(ui::get_view))
        .route("/api/templates", get(templates::list_templates))
        .route("/api/projections", get(generate::list_projections))
        .route("/api/generate", get(generate::get_generator).post(generate::post_generate))
        .route("/healthz", get(healthz))
        .nest_service("/assets", ServeDir::new(assets_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Render a service error as `{ code, message }` with the given status.
pub(crate) fn error_response(status: StatusCode, err: &impl ErrorCode) -> Response {
    (status, Json(ErrorBody::from_error(err))).into_response()
}

async fn healthz() -> &'static str {
    "ok"
}
