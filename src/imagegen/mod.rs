//! Image generation — text-to-image adapter for blueprint rendering.
//!
//! DESIGN
//! ======
//! Uses environment variables instead of config files. `ImageGenClient`
//! wraps the Stability client and picks the endpoint generation (v1 JSON or
//! v2beta multipart) from `STABILITY_API_MODE`. Callers only see the
//! `ImageGen` trait, so tests swap in a mock.

pub mod config;
pub mod stability;
pub mod types;

use config::ImageGenConfig;
pub use types::{GeneratedImage, ImageGen, ImageGenError};

// =============================================================================
// CLIENT
// =============================================================================

/// Concrete image generation client configured by [`ImageGenClient::from_env`].
pub struct ImageGenClient {
    inner: stability::StabilityClient,
}

impl ImageGenClient {
    /// Build a client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing, the mode is unknown, or
    /// the HTTP client fails to build.
    pub fn from_env() -> Result<Self, ImageGenError> {
        let config = ImageGenConfig::from_env()?;
        Self::from_config(&config)
    }

    /// Build a client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: &ImageGenConfig) -> Result<Self, ImageGenError> {
        Ok(Self { inner: stability::StabilityClient::new(config)? })
    }

    /// Endpoint the client posts to. Contains no credentials.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.inner.endpoint()
    }
}

#[async_trait::async_trait]
impl ImageGen for ImageGenClient {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, ImageGenError> {
        self.inner.text_to_image(prompt).await
    }
}
