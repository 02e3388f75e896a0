//! Blueprint generator routes.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{Json, Response};
use serde::Serialize;

use super::error_response;
use crate::services::generate::{self, GenerateError, GenerateRequest, Projection};
use crate::state::{AppState, GeneratorView};

#[derive(Debug, Serialize)]
pub struct ProjectionResponse {
    pub id: Projection,
    pub label: &'static str,
}

fn generate_error_to_status(err: &GenerateError) -> StatusCode {
    match err {
        GenerateError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        GenerateError::Busy => StatusCode::CONFLICT,
        GenerateError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
        GenerateError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `GET /api/projections` — selectable projections in display order.
pub async fn list_projections() -> Json<Vec<ProjectionResponse>> {
    Json(
        Projection::ALL
            .iter()
            .map(|&id| ProjectionResponse { id, label: id.label() })
            .collect(),
    )
}

/// `GET /api/generate` — busy flag, latest images, and error text.
pub async fn get_generator(State(state): State<AppState>) -> Json<GeneratorView> {
    Json(state.generator.read().await.clone())
}

/// `POST /api/generate` — run one batch and return the settled view.
///
/// An undecodable body is answered with the same JSON error shape as a
/// rejected form.
pub async fn post_generate(
    State(state): State<AppState>,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GeneratorView>, Response> {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            let e = generate::reject_malformed(&state, rejection.body_text()).await;
            tracing::info!(error = %e, "generate: malformed body");
            return Err(error_response(generate_error_to_status(&e), &e));
        }
    };
    match generate::submit(&state, body).await {
        Ok(view) => Ok(Json(view)),
        Err(e) => {
            tracing::info!(error = %e, "generate: submission rejected");
            Err(error_response(generate_error_to_status(&e), &e))
        }
    }
}

#[cfg(test)]
#[path = "generate_test.rs"]
mod tests;
