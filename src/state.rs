//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It owns the panel selection + search query, the generator panel view,
//! the static template catalog, and the optional image generation client.
//! There is no process-wide singleton: whoever builds the router owns the
//! state and passes it in.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::imagegen::ImageGen;
use crate::services::catalog::{self, Template};
use crate::services::generate::{BatchOutcome, GeneratedBlueprint};

// =============================================================================
// SECTION
// =============================================================================

/// Which panel is active. Rendering dispatches on this tag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    /// Template browser.
    #[default]
    Search,
    /// Blueprint generator.
    Generate,
}

// =============================================================================
// UI STATE
// =============================================================================

/// Panel selection and search query. Every setter is visible to all readers
/// as soon as the write lock is released.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiState {
    pub section: Section,
    pub query: String,
}

impl UiState {
    pub fn set_section(&mut self, section: Section) {
        self.section = section;
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }
}

// =============================================================================
// GENERATOR VIEW
// =============================================================================

/// What the generator panel shows: the busy indicator, the latest images,
/// and the combined error text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GeneratorView {
    pub busy: bool,
    pub images: Vec<GeneratedBlueprint>,
    pub error: Option<String>,
}

impl GeneratorView {
    /// Enter the busy state and clear the previous batch's output.
    pub fn begin(&mut self) {
        self.busy = true;
        self.images.clear();
        self.error = None;
    }

    /// Leave the busy state with the settled batch.
    pub fn finish(&mut self, outcome: &BatchOutcome) {
        self.busy = false;
        self.images.clone_from(&outcome.images);
        self.error = outcome.error_message();
    }

    /// Leave (or stay out of) the busy state with a single message.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.busy = false;
        self.error = Some(message.into());
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Copy.
#[derive(Clone)]
pub struct AppState {
    pub ui: Arc<RwLock<UiState>>,
    pub generator: Arc<RwLock<GeneratorView>>,
    pub catalog: &'static [Template],
    pub imagegen: Option<Arc<dyn ImageGen>>,
}

impl AppState {
    #[must_use]
    pub fn new(imagegen: Option<Arc<dyn ImageGen>>) -> Self {
        Self::with_catalog(catalog::TEMPLATES, imagegen)
    }

    #[must_use]
    pub fn with_catalog(catalog: &'static [Template], imagegen: Option<Arc<dyn ImageGen>>) -> Self {
        Self {
            ui: Arc::new(RwLock::new(UiState::default())),
            generator: Arc::new(RwLock::new(GeneratorView::default())),
            catalog,
            imagegen,
        }
    }
}


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
