//! Generate service — blueprint form → prompts → parallel image requests.
//!
//! DESIGN
//! ======
//! A submission is validated locally first; nothing touches the network
//! unless the item name and projection set are acceptable. Each projection
//! then becomes one prompt and one spawned request. The batch waits for every
//! task to settle, turning failures (including panics) into labeled messages,
//! and partitions the results into images and failures.
//!
//! Only one batch runs at a time. The busy flag is checked and set under the
//! generator view's write lock, and the batch itself runs in a detached task
//! so it finishes (and clears the flag) even if the submitting request goes
//! away.

use std::fmt::Write;
use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::imagegen::{ImageGen, ImageGenError};
use crate::state::{AppState, GeneratorView};

pub const MIN_ITEM_NAME_CHARS: usize = 2;

// =============================================================================
// PROJECTIONS
// =============================================================================

/// A drawing view. Each selected projection becomes one request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    Top,
    Front,
    Side,
    Back,
    Isometric,
}

impl Projection {
    pub const ALL: [Projection; 5] = [Self::Top, Self::Front, Self::Side, Self::Back, Self::Isometric];

    /// Human-readable label shown next to results and in error lines.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Top => "Вид сверху",
            Self::Front => "Вид спереди",
            Self::Side => "Вид сбоку",
            Self::Back => "Вид сзади",
            Self::Isometric => "аксонометрия",
        }
    }

    /// Prompt fragment substituted into the blueprint template.
    #[must_use]
    pub fn view(self) -> &'static str {
        match self {
            Self::Top => "top-down orthographic view",
            Self::Front => "front orthographic view",
            Self::Side => "side orthographic view",
            Self::Back => "back orthographic view",
            Self::Isometric => "isometric view",
        }
    }
}

fn default_projections() -> Vec<Projection> {
    vec![Projection::Top]
}

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("{0}")]
    Validation(String),
    #[error("generation already in progress")]
    Busy,
    #[error("image generation is not configured")]
    NotConfigured,
    #[error("unexpected error while generating: {0}")]
    Unexpected(String),
}

impl crate::error::ErrorCode for GenerateError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E_VALIDATION",
            Self::Busy => "E_BUSY",
            Self::NotConfigured => "E_NOT_CONFIGURED",
            Self::Unexpected(_) => "E_UNEXPECTED",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Busy)
    }
}

/// Raw form submission.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub item_name: String,
    #[serde(default = "default_projections")]
    pub projections: Vec<Projection>,
    #[serde(default)]
    pub width_mm: Option<u32>,
    #[serde(default)]
    pub height_mm: Option<u32>,
    #[serde(default)]
    pub additional: Option<String>,
}

/// A submission that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlueprintSpec {
    pub item_name: String,
    pub projections: Vec<Projection>,
    pub width_mm: Option<u32>,
    pub height_mm: Option<u32>,
    pub additional: Option<String>,
}

/// One successful variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedBlueprint {
    pub projection: Projection,
    pub label: String,
    pub url: String,
}

/// One failed variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantFailure {
    pub projection: Projection,
    pub label: String,
    pub message: String,
}

/// Settled batch. `images.len() + failures.len()` equals the number of
/// projections requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub images: Vec<GeneratedBlueprint>,
    pub failures: Vec<VariantFailure>,
}

impl BatchOutcome {
    /// One line per failed variant, or `None` when everything succeeded.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        if self.failures.is_empty() {
            return None;
        }
        let lines: Vec<&str> = self.failures.iter().map(|f| f.message.as_str()).collect();
        Some(lines.join("\n"))
    }
}

// =============================================================================
// VALIDATION + PROMPT
// =============================================================================

/// Check a submission without touching the network.
///
/// # Errors
///
/// Returns [`GenerateError::Validation`] for a missing or short item name,
/// an empty projection set, or a zero dimension.
pub fn validate(request: GenerateRequest) -> Result<BlueprintSpec, GenerateError> {
    let item_name = request.item_name.trim();
    if item_name.is_empty() {
        return Err(GenerateError::Validation("item name is required".into()));
    }
    if item_name.chars().count() < MIN_ITEM_NAME_CHARS {
        return Err(GenerateError::Validation(format!(
            "item name must be at least {MIN_ITEM_NAME_CHARS} characters"
        )));
    }

    let mut projections = Vec::with_capacity(request.projections.len());
    for projection in request.projections {
        if !projections.contains(&projection) {
            projections.push(projection);
        }
    }
    if projections.is_empty() {
        return Err(GenerateError::Validation("select at least one projection".into()));
    }

    if request.width_mm == Some(0) || request.height_mm == Some(0) {
        return Err(GenerateError::Validation("dimensions must be greater than zero".into()));
    }

    let additional = request
        .additional
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty());

    Ok(BlueprintSpec {
        item_name: item_name.to_string(),
        projections,
        width_mm: request.width_mm,
        height_mm: request.height_mm,
        additional,
    })
}

/// Fill the blueprint template for one projection.
#[must_use]
pub fn build_prompt(spec: &BlueprintSpec, projection: Projection) -> String {
    let mut prompt = format!(
        "Technical drawing, blueprint style, of a {} in {}. The drawing should be monochrome, clean, and precise, \
         showing detailed stitching lines, compartments, and edges. No background, isolated on white. Include \
         measurement markers and a minimalist, professional aesthetic, resembling an industrial design draft.",
        spec.item_name,
        projection.view()
    );

    match (spec.width_mm, spec.height_mm) {
        (Some(w), Some(h)) => {
            let _ = write!(prompt, " Overall dimensions: {w} mm wide by {h} mm high.");
        }
        (Some(w), None) => {
            let _ = write!(prompt, " Overall dimensions: {w} mm wide.");
        }
        (None, Some(h)) => {
            let _ = write!(prompt, " Overall dimensions: {h} mm high.");
        }
        (None, None) => {}
    }

    if let Some(additional) = &spec.additional {
        let _ = write!(prompt, " Additional details: {additional}.");
    }

    prompt
}

fn failure_message(projection: Projection, err: &ImageGenError) -> String {
    let label = projection.label();
    match err {
        ImageGenError::ApiResponse { status, body } => {
            format!("projection {label} failed: {status} - {}", body.trim())
        }
        ImageGenError::EmptyResult => format!("projection {label} returned an empty result"),
        other => format!("projection {label} failed: {other}"),
    }
}

// =============================================================================
// BATCH
// =============================================================================

/// Fire one request per projection and wait for all of them to settle.
pub async fn run_batch(imagegen: Arc<dyn ImageGen>, spec: &BlueprintSpec, batch_id: Uuid) -> BatchOutcome {
    let tasks = spec.projections.iter().map(|&projection| {
        let imagegen = Arc::clone(&imagegen);
        let prompt = build_prompt(spec, projection);
        let handle = tokio::spawn(async move { imagegen.generate(&prompt).await });
        async move { (projection, handle.await) }
    });
    let settled = join_all(tasks).await;

    let mut outcome = BatchOutcome::default();
    for (projection, result) in settled {
        let label = projection.label().to_string();
        match result {
            Ok(Ok(image)) => {
                info!(%batch_id, ?projection, "generate: variant ok");
                outcome.images.push(GeneratedBlueprint { projection, label, url: image.data_url() });
            }
            Ok(Err(e)) => {
                warn!(%batch_id, ?projection, error = %e, "generate: variant failed");
                outcome.failures.push(VariantFailure { projection, label, message: failure_message(projection, &e) });
            }
            Err(e) => {
                error!(%batch_id, ?projection, error = %e, "generate: variant task aborted");
                let message = format!("unexpected error while generating projection {label}");
                outcome.failures.push(VariantFailure { projection, label, message });
            }
        }
    }
    outcome
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Record a submission whose body could not be decoded. The message lands
/// in the generator view unless a batch is running.
pub async fn reject_malformed(state: &AppState, message: impl Into<String>) -> GenerateError {
    let err = GenerateError::Validation(format!("invalid request body: {}", message.into()));
    let mut view = state.generator.write().await;
    if !view.busy {
        view.error = Some(err.to_string());
    }
    err
}

/// Validate, mark the generator busy, run the batch, and publish the result.
///
/// # Errors
///
/// - [`GenerateError::Busy`] while another batch is running.
/// - [`GenerateError::Validation`] when the form is rejected locally; the
///   message is also stored as the generator view's error.
/// - [`GenerateError::NotConfigured`] when no image client is available.
/// - [`GenerateError::Unexpected`] if the batch task itself dies.
pub async fn submit(state: &AppState, request: GenerateRequest) -> Result<GeneratorView, GenerateError> {
    let (spec, imagegen) = {
        let mut view = state.generator.write().await;
        if view.busy {
            return Err(GenerateError::Busy);
        }
        let spec = match validate(request) {
            Ok(spec) => spec,
            Err(e) => {
                view.error = Some(e.to_string());
                return Err(e);
            }
        };
        let Some(imagegen) = state.imagegen.clone() else {
            return Err(GenerateError::NotConfigured);
        };
        view.begin();
        (spec, imagegen)
    };

    let batch_id = Uuid::new_v4();
    info!(%batch_id, item = %spec.item_name, variants = spec.projections.len(), "generate: batch submitted");

    let task_state = state.clone();
    let batch = tokio::spawn(async move {
        let outcome = run_batch(imagegen, &spec, batch_id).await;
        info!(
            %batch_id,
            images = outcome.images.len(),
            failures = outcome.failures.len(),
            "generate: batch settled"
        );
        let mut view = task_state.generator.write().await;
        view.finish(&outcome);
        view.clone()
    });

    match batch.await {
        Ok(view) => Ok(view),
        Err(e) => {
            error!(%batch_id, error = %e, "generate: batch task aborted");
            let err = GenerateError::Unexpected(e.to_string());
            state.generator.write().await.fail(err.to_string());
            Err(err)
        }
    }
}

#[cfg(test)]
#[path = "generate_test.rs"]
mod tests;
