//! `labelforge-profilesd` — dev-time mirror for device profiles and label
//! presets, backed by a single JSON file.
//!
//! Usage:
//!   labelforge-profilesd [--listen <addr>] [--data-dir <dir>]

mod routes;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use routes::AppState;

/// Profiles mirror server.
#[derive(Parser, Debug)]
#[command(name = "labelforge-profilesd", about = "LabelForge profiles mirror")]
struct Cli {
    /// Listen address.
    #[arg(long = "listen", default_value = "127.0.0.1:5175")]
    listen: String,

    /// Directory holding profiles.json. Created on first write.
    #[arg(long = "data-dir", default_value = "data")]
    data_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let profiles_path = cli.data_dir.join("profiles.json");
    info!("profiles stored at {}", profiles_path.display());

    let state = AppState {
        profiles_path: Arc::new(profiles_path),
    };
    let app = routes::build_router(state);

    let listener = tokio::net::TcpListener::bind(&cli.listen).await?;
    info!("profiles mirror listening on {}", cli.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
