//! Nemascreen Web Server
//!
//! Run with: cargo run -p nemascreen-web

use std::net::SocketAddr;
use std::path::PathBuf;

use nemascreen_common::config::AppConfig;
use nemascreen_db::Database;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config_path = std::env::var("NEMASCREEN_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("nemascreen.toml"));
    let config = AppConfig::load(&config_path)?;

    info!("Starting Nemascreen Web Server...");

    let db = Database::connect(&config.database).await?;
    db.initialize().await?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let state = nemascreen_web::state::AppState::new(db, config);
    let app = nemascreen_web::router::build_router(state);

    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
