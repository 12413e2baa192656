use std::net::SocketAddr;

use env_service::{default_registry, make_app};

const DEFAULT_ADDR: &str = "127.0.0.1:8080";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let registry = default_registry();
    tracing::info!(envs = ?registry.names(), "environments available");
    let app = make_app(registry);

    let addr: SocketAddr = std::env::var("ENV_SERVICE_ADDR")
        .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
        .parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "environment service listening");
    axum::serve(listener, app).await?;
    Ok(())
}
