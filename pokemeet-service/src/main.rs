use std::sync::Arc;

use dialogue_flow::{FlowRunner, InMemorySessionStorage};
use pokemeet_service::gateway::{GenerationBackend, OpenAiBackend};
use pokemeet_service::http::{self, AppState};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured JSON tracing based on environment variables
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pokemeet_service=debug,dialogue_flow=debug,tower_http=debug".into());

    match log_format.as_str() {
        "pretty" => {
            // Human-readable logging for development
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        _ => {
            // Structured JSON logging for production
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true),
                )
                .init();
        }
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    // The generation gateway cannot run without API credentials
    let backend: Arc<dyn GenerationBackend> = match OpenAiBackend::from_env() {
        Ok(backend) => Arc::new(backend),
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let storage = Arc::new(InMemorySessionStorage::new());
    let runner = FlowRunner::new(storage);

    let app = http::app(AppState { backend, runner });

    let port = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(3000);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await.unwrap();

    info!("Server running on http://0.0.0.0:{port}");

    axum::serve(listener, app).await.unwrap();
}
