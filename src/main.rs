mod handlers;

use axum::{Router, routing};
use handlers::{handle_webhook, health};
use github_diff_notifier::{AppState, NotifierConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match NotifierConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let bind_address = format!("0.0.0.0:{}", config.listen_port);
    let state = Arc::new(AppState {
        http: reqwest::Client::new(),
        config,
    });

    let app = Router::new()
        .route("/webhook", routing::post(handle_webhook))
        .route("/health", routing::get(health))
        .with_state(state);

    info!("Listening on {}", bind_address);
    let listener = tokio::net::TcpListener::bind(&bind_address).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
