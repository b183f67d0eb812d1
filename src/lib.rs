pub mod api;
pub mod completion;
pub mod config;

use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    Router,
};
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

pub use completion::{CompletionClient, CompletionError};
pub use config::{AppConfig, ConfigError, ServiceConfig};

pub const ALLOWED_ORIGINS: [&str; 3] = [
    "http://localhost:3000",
    "https://ai-assistant-6yceqcyen-projective-staffings-projects.vercel.app",
    "https://ai-assistant-one-liard.vercel.app",
];

#[derive(Clone)]
pub struct AppState {
    pub completions: Arc<CompletionClient>,
}

impl AppState {
    pub fn new(completions: CompletionClient) -> Self {
        Self {
            completions: Arc::new(completions),
        }
    }
}

fn cors_layer() -> CorsLayer {
    let origins = ALLOWED_ORIGINS.map(HeaderValue::from_static);

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
        ])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(false)
}

pub fn build_app(state: AppState) -> Router {
    api::router(state)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(app: Router, port: u16) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received, draining connections");
}
