//! Stability AI text-to-image client.
//!
//! Supports both the v1 `generation/{engine}/text-to-image` endpoint (JSON
//! request, base64 artifacts in a JSON response) and the v2beta
//! `stable-image/generate/{model}` endpoint (multipart request, raw image or
//! JSON response). Pure parsing lives in `parse_v1_response` and
//! `parse_v2_response` for testability.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use super::config::{ImageGenConfig, SamplingParams, StabilityApiMode};
use super::types::{GeneratedImage, ImageGenError};

const V2_OUTPUT_FORMAT: &str = "png";
const V2_ASPECT_RATIO: &str = "1:1";

// =============================================================================
// CLIENT
// =============================================================================

pub struct StabilityClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    mode: StabilityApiMode,
    sampling: SamplingParams,
}

impl StabilityClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ImageGenConfig) -> Result<Self, ImageGenError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ImageGenError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            endpoint: config.endpoint(),
            mode: config.mode,
            sampling: config.sampling.clone(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// # Errors
    ///
    /// See [`ImageGenError`]: transport failures, non-2xx statuses, malformed
    /// bodies and empty results are all reported.
    pub async fn text_to_image(&self, prompt: &str) -> Result<GeneratedImage, ImageGenError> {
        match self.mode {
            StabilityApiMode::V1 => self.v1(prompt).await,
            StabilityApiMode::V2Beta => self.v2beta(prompt).await,
        }
    }

    async fn v1(&self, prompt: &str) -> Result<GeneratedImage, ImageGenError> {
        let body = V1Request {
            text_prompts: [V1TextPrompt { text: prompt }],
            height: self.sampling.height,
            width: self.sampling.width,
            samples: self.sampling.samples,
            steps: self.sampling.steps,
            cfg_scale: self.sampling.cfg_scale,
            sampler: &self.sampling.sampler,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header(ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ImageGenError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ImageGenError::ApiRequest(e.to_string()))?;
        if !is_success(status) {
            return Err(ImageGenError::ApiResponse { status, body: text });
        }

        parse_v1_response(&text)
    }

    async fn v2beta(&self, prompt: &str) -> Result<GeneratedImage, ImageGenError> {
        let form = reqwest::multipart::Form::new()
            .text("prompt", prompt.to_string())
            .text("output_format", V2_OUTPUT_FORMAT)
            .text("aspect_ratio", V2_ASPECT_RATIO);

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header(ACCEPT, "image/*")
            .multipart(form)
            .send()
            .await
            .map_err(|e| ImageGenError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ImageGenError::ApiRequest(e.to_string()))?;
        if !is_success(status) {
            return Err(ImageGenError::ApiResponse { status, body: String::from_utf8_lossy(&bytes).into_owned() });
        }

        parse_v2_response(&content_type, &bytes)
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct V1Request<'a> {
    text_prompts: [V1TextPrompt<'a>; 1],
    height: u32,
    width: u32,
    samples: u32,
    steps: u32,
    cfg_scale: f32,
    sampler: &'a str,
}

#[derive(Serialize)]
struct V1TextPrompt<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct V1Response {
    #[serde(default)]
    artifacts: Vec<V1Artifact>,
}

#[derive(Deserialize)]
struct V1Artifact {
    #[serde(default)]
    base64: Option<String>,
}

#[derive(Deserialize)]
struct V2JsonResponse {
    #[serde(default)]
    image: Option<String>,
}

// =============================================================================
// PARSING
// =============================================================================

pub(crate) fn parse_v1_response(json: &str) -> Result<GeneratedImage, ImageGenError> {
    let api: V1Response = serde_json::from_str(json).map_err(|e| ImageGenError::ApiParse(e.to_string()))?;
    api.artifacts
        .into_iter()
        .next()
        .and_then(|artifact| artifact.base64)
        .filter(|b64| !b64.is_empty())
        .map(GeneratedImage::png_base64)
        .ok_or(ImageGenError::EmptyResult)
}

pub(crate) fn parse_v2_response(content_type: &str, body: &[u8]) -> Result<GeneratedImage, ImageGenError> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim();

    if mime.starts_with("image/") {
        if body.is_empty() {
            return Err(ImageGenError::EmptyResult);
        }
        return Ok(GeneratedImage::from_bytes(mime, body));
    }

    if mime == "application/json" {
        let api: V2JsonResponse = serde_json::from_slice(body).map_err(|e| ImageGenError::ApiParse(e.to_string()))?;
        return api
            .image
            .filter(|b64| !b64.is_empty())
            .map(GeneratedImage::png_base64)
            .ok_or(ImageGenError::EmptyResult);
    }

    Err(ImageGenError::ApiParse(format!("unexpected content type '{content_type}'")))
}

#[cfg(test)]
#[path = "stability_test.rs"]
mod tests;
