mod config;
mod error;
mod imagegen;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use crate::imagegen::{ImageGen, ImageGenError};

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("failed to load .env: {e}");
        }
    }
    tracing_subscriber::fmt::init();

    let config = match config::ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid server configuration");
            std::process::exit(1);
        }
    };

    // A missing credential disables generation; any other setup error is fatal.
    let imagegen: Option<Arc<dyn ImageGen>> = match imagegen::ImageGenClient::from_env() {
        Ok(client) => {
            tracing::info!(endpoint = client.endpoint(), "image generation client initialized");
            let client: Arc<dyn ImageGen> = Arc::new(client);
            Some(client)
        }
        Err(e @ ImageGenError::MissingApiKey { .. }) => {
            tracing::warn!(error = %e, "image generation not configured; generate panel disabled");
            None
        }
        Err(e) => {
            tracing::error!(error = %e, "invalid image generation configuration");
            std::process::exit(1);
        }
    };

    let state = state::AppState::new(imagegen);
    let app = routes::app(state, &config.assets_dir);

    let port = config.port;
    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %port, "failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!(%port, assets = %config.assets_dir.display(), "leathercraft listening");
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server failed");
    }
}
