use std::process::ExitCode;

use task_assistant::{
    build_app, config::load_dotenv, run_server, AppConfig, AppState, CompletionClient,
    ServiceConfig,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    // Loaded before tracing so RUST_LOG may come from .env.
    let dotenv = load_dotenv();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(err) = dotenv {
        tracing::warn!(error = %err, "failed to load .env file");
    }

    let service = match ServiceConfig::from_env() {
        Ok(service) => service,
        Err(err) => {
            tracing::error!("{err}. Check your environment or .env file.");
            return ExitCode::FAILURE;
        }
    };
    let app_config = AppConfig::from_env();

    let state = AppState::new(CompletionClient::new(service, app_config.request_timeout));
    let app = build_app(state);

    if let Err(err) = run_server(app, app_config.port).await {
        tracing::error!(error = %err, "server failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
