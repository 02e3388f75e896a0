//! Image generation types — provider-neutral image payloads and errors.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by image generation client operations.
#[derive(Debug, thiserror::Error)]
pub enum ImageGenError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The API credential is not set.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// The HTTP request never produced a response.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The provider returned a non-success HTTP status.
    #[error("API response error: status {status} - {body}")]
    ApiResponse { status: u16, body: String },

    /// The response body had an unexpected shape.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The response parsed but carried no image.
    #[error("API response contained no image")]
    EmptyResult,

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl crate::error::ErrorCode for ImageGenError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigParse(_) => "E_CONFIG_PARSE",
            Self::MissingApiKey { .. } => "E_MISSING_API_KEY",
            Self::ApiRequest(_) => "E_API_REQUEST",
            Self::ApiResponse { .. } => "E_API_RESPONSE",
            Self::ApiParse(_) => "E_API_PARSE",
            Self::EmptyResult => "E_EMPTY_RESULT",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::ApiRequest(_) | Self::ApiResponse { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// IMAGE PAYLOAD
// =============================================================================

/// A generated image, held as base64 so it can be inlined as a data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub mime: String,
    pub base64: String,
}

impl GeneratedImage {
    /// Wrap an already base64-encoded PNG (the shape JSON endpoints return).
    #[must_use]
    pub fn png_base64(base64: String) -> Self {
        Self { mime: "image/png".into(), base64 }
    }

    /// Encode raw image bytes returned by binary endpoints.
    #[must_use]
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Self {
        Self { mime: mime.to_string(), base64: STANDARD.encode(bytes) }
    }

    /// `data:` URL a browser can render directly.
    #[must_use]
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.base64)
    }
}

// =============================================================================
// IMAGE GEN TRAIT
// =============================================================================

/// Provider-neutral async trait for text-to-image. Enables mocking in tests.
#[async_trait::async_trait]
pub trait ImageGen: Send + Sync {
    /// Generate one image for `prompt`.
    ///
    /// # Errors
    ///
    /// Returns an [`ImageGenError`] if the request fails, the provider answers
    /// with a non-success status, or the body carries no image.
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, ImageGenError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
