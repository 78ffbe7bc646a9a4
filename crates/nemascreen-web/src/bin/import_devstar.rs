//! Import DevStaR raw counts from a CSV export.
//!
//! Run with: cargo run -p nemascreen-web --bin import_devstar -- <counts.csv>

use std::path::PathBuf;

use nemascreen_common::config::AppConfig;
use nemascreen_db::import::import_devstar_counts;
use nemascreen_db::Database;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let path: PathBuf = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: import_devstar <counts.csv>"))?
        .into();

    let config_path = std::env::var("NEMASCREEN_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("nemascreen.toml"));
    let config = AppConfig::load(&config_path)?;

    let db = Database::connect(&config.database).await?;
    db.initialize().await?;

    let imported = import_devstar_counts(&db, &path).await?;
    println!("Imported {imported} DevStaR score rows from {}", path.display());

    Ok(())
}
