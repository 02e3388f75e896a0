//! Image generation configuration parsed from environment variables.

use super::types::ImageGenError;

pub const API_KEY_VAR: &str = "STABILITY_API_KEY";
pub const DEFAULT_BASE_URL: &str = "https://api.stability.ai";
pub const DEFAULT_ENGINE_ID: &str = "stable-diffusion-xl-1024-v1-0";
pub const DEFAULT_V2_MODEL: &str = "core";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_IMAGE_SIDE: u32 = 1024;
pub const DEFAULT_SAMPLES: u32 = 1;
pub const DEFAULT_STEPS: u32 = 30;
pub const DEFAULT_CFG_SCALE: f32 = 14.0;
pub const DEFAULT_SAMPLER: &str = "K_DPMPP_2M";

/// Which Stability endpoint generation the client speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StabilityApiMode {
    /// `/v1/generation/{engine}/text-to-image`, JSON in, JSON artifacts out.
    V1,
    /// `/v2beta/stable-image/generate/{model}`, multipart in, JSON or bytes out.
    V2Beta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

/// Sampling parameters sent with every v1 request.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingParams {
    pub width: u32,
    pub height: u32,
    pub samples: u32,
    pub steps: u32,
    pub cfg_scale: f32,
    pub sampler: String,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            width: DEFAULT_IMAGE_SIDE,
            height: DEFAULT_IMAGE_SIDE,
            samples: DEFAULT_SAMPLES,
            steps: DEFAULT_STEPS,
            cfg_scale: DEFAULT_CFG_SCALE,
            sampler: DEFAULT_SAMPLER.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageGenConfig {
    pub api_key: String,
    pub mode: StabilityApiMode,
    pub base_url: String,
    pub engine_id: String,
    pub v2_model: String,
    pub sampling: SamplingParams,
    pub timeouts: Timeouts,
}

impl ImageGenConfig {
    /// Build typed image generation config from environment variables.
    ///
    /// Required:
    /// - `STABILITY_API_KEY`
    ///
    /// Optional:
    /// - `STABILITY_API_MODE`: `v1` (default) or `v2beta`
    /// - `STABILITY_AI_ENGINE_ID`: v1 engine, default `stable-diffusion-xl-1024-v1-0`
    /// - `STABILITY_V2_MODEL`: v2beta model path segment, default `core`
    /// - `STABILITY_BASE_URL`: default `https://api.stability.ai`
    /// - `IMAGEGEN_REQUEST_TIMEOUT_SECS`: default 120
    /// - `IMAGEGEN_CONNECT_TIMEOUT_SECS`: default 10
    /// - `IMAGEGEN_STEPS`: default 30
    /// - `IMAGEGEN_CFG_SCALE`: default 14
    ///
    /// # Errors
    ///
    /// Returns an error if the key is missing or the mode is unknown.
    pub fn from_env() -> Result<Self, ImageGenError> {
        let api_key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ImageGenError::MissingApiKey { var: API_KEY_VAR.into() })?;

        let mode = parse_mode(std::env::var("STABILITY_API_MODE").ok().as_deref())?;
        let base_url = std::env::var("STABILITY_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let engine_id = std::env::var("STABILITY_AI_ENGINE_ID").unwrap_or_else(|_| DEFAULT_ENGINE_ID.to_string());
        let v2_model = std::env::var("STABILITY_V2_MODEL").unwrap_or_else(|_| DEFAULT_V2_MODEL.to_string());

        let sampling = SamplingParams {
            steps: env_parse("IMAGEGEN_STEPS", DEFAULT_STEPS),
            cfg_scale: env_parse("IMAGEGEN_CFG_SCALE", DEFAULT_CFG_SCALE),
            ..SamplingParams::default()
        };
        let timeouts = Timeouts {
            request_secs: env_parse("IMAGEGEN_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse("IMAGEGEN_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { api_key, mode, base_url, engine_id, v2_model, sampling, timeouts })
    }

    /// Full endpoint URL for the configured mode.
    #[must_use]
    pub fn endpoint(&self) -> String {
        match self.mode {
            StabilityApiMode::V1 => format!("{}/v1/generation/{}/text-to-image", self.base_url, self.engine_id),
            StabilityApiMode::V2Beta => format!("{}/v2beta/stable-image/generate/{}", self.base_url, self.v2_model),
        }
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_mode(raw: Option<&str>) -> Result<StabilityApiMode, ImageGenError> {
    match raw.unwrap_or("v1") {
        "v1" => Ok(StabilityApiMode::V1),
        "v2beta" => Ok(StabilityApiMode::V2Beta),
        other => Err(ImageGenError::ConfigParse(format!(
            "unknown STABILITY_API_MODE '{other}' (expected 'v1' or 'v2beta')"
        ))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
