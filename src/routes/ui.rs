//! Panel selection routes and the active-panel view.
//!
//! DESIGN
//! ======
//! `section` and `query` are independent: switching panels never resets the
//! search query, and the generator keeps its own view state regardless of
//! which panel is showing.

use axum::extract::State;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use super::templates::{self, TemplateResponse};
use crate::state::{AppState, GeneratorView, Section, UiState};

#[derive(Debug, Deserialize)]
pub struct SectionBody {
    pub section: Section,
}

#[derive(Debug, Deserialize)]
pub struct QueryBody {
    pub query: String,
}

/// Content of whichever panel is active, tagged by `section`.
#[derive(Debug, Serialize)]
#[serde(tag = "section", rename_all = "lowercase")]
pub enum ViewResponse {
    Search { query: String, templates: Vec<TemplateResponse>, nothing_found: bool },
    Generate(GeneratorView),
}

/// `GET /api/ui` — current panel and query.
pub async fn get_ui(State(state): State<AppState>) -> Json<UiState> {
    Json(state.ui.read().await.clone())
}

/// `PUT /api/ui/section` — switch panels.
pub async fn put_section(State(state): State<AppState>, Json(body): Json<SectionBody>) -> Json<UiState> {
    let mut ui = state.ui.write().await;
    ui.set_section(body.section);
    tracing::debug!(section = ?body.section, "ui: section changed");
    Json(ui.clone())
}

/// `PUT /api/ui/query` — update the shared search query.
pub async fn put_query(State(state): State<AppState>, Json(body): Json<QueryBody>) -> Json<UiState> {
    let mut ui = state.ui.write().await;
    ui.set_query(body.query);
    Json(ui.clone())
}

/// `GET /api/view` — render the active panel.
pub async fn get_view(State(state): State<AppState>) -> Json<ViewResponse> {
    let ui = state.ui.read().await.clone();
    let view = match ui.section {
        Section::Search => {
            let list = templates::search(&state, ui.query);
            ViewResponse::Search { query: list.query, templates: list.templates, nothing_found: list.nothing_found }
        }
        Section::Generate => ViewResponse::Generate(state.generator.read().await.clone()),
    };
    Json(view)
}

#[cfg(test)]
#[path = "ui_test.rs"]
mod tests;
