//! Template browser routes.

use axum::extract::{Query, State};
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::services::catalog::{self, Template};
use crate::state::AppState;

/// URL prefix under which template image files are served.
pub const TEMPLATE_ASSET_PREFIX: &str = "/assets/templates";

#[derive(Debug, Serialize)]
pub struct TemplateResponse {
    pub id: u32,
    pub name: String,
    pub images: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    pub query: String,
    pub templates: Vec<TemplateResponse>,
    /// `true` when the filter matched nothing.
    pub nothing_found: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct TemplateQuery {
    pub q: Option<String>,
}

pub(crate) fn to_response(template: &Template) -> TemplateResponse {
    TemplateResponse {
        id: template.id,
        name: template.name.to_owned(),
        images: template
            .images
            .iter()
            .map(|file| format!("{TEMPLATE_ASSET_PREFIX}/{file}"))
            .collect(),
    }
}

pub(crate) fn search(state: &AppState, query: String) -> TemplateListResponse {
    let templates: Vec<TemplateResponse> = catalog::filter_templates(state.catalog, &query)
        .into_iter()
        .map(to_response)
        .collect();
    let nothing_found = templates.is_empty();
    TemplateListResponse { query, templates, nothing_found }
}

/// `GET /api/templates` — filter by `?q=`, or by the shared query when absent.
pub async fn list_templates(
    State(state): State<AppState>,
    Query(params): Query<TemplateQuery>,
) -> Json<TemplateListResponse> {
    let query = match params.q {
        Some(q) => q,
        None => state.ui.read().await.query.clone(),
    };
    Json(search(&state, query))
}

#[cfg(test)]
#[path = "templates_test.rs"]
mod tests;
