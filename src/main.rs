//! Process wiring for the unicorn service: configuration from the
//! environment, system startup, the HTTP listener and graceful shutdown
//! on SIGINT.

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use unicorn_factory::http::{self, HttpConfig};
use unicorn_factory::lifecycle::{setup_tracing, SystemConfig, UnicornSystem};
use unicorn_factory::service::UnicornService;

const DEFAULT_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_RATE_MS: u64 = 500;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing();

    let rate = Duration::from_millis(env_u64("UNICORN_RATE_MS", DEFAULT_RATE_MS));
    let addr = std::env::var("UNICORN_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());

    info!(rate_ms = rate.as_millis() as u64, %addr, "setting up service");

    let system = UnicornSystem::start(SystemConfig {
        rate,
        ..SystemConfig::default()
    })?;

    let service: Arc<dyn UnicornService> = system.service.clone();
    let app = http::router(service, HttpConfig::default());

    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "unicorn service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("interrupt received, shutting down");
        })
        .await?;

    system.shutdown().await;
    Ok(())
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
