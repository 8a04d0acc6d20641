//! Collaboration API server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p collab-api
//! ```
//!
//! Configuration is loaded from environment variables (a `.env` file is
//! honoured) or from the file named by `COLLAB_CONFIG`.

use anyhow::Context;
use collab_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, "Server failed to start");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let config = match std::env::var("COLLAB_CONFIG") {
        Ok(path) => AppConfig::load(&path).with_context(|| format!("loading {path}"))?,
        Err(_) => AppConfig::from_env().context("loading configuration from environment")?,
    };

    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        env = ?config.app.env,
        storage = ?config.storage,
        address = %config.server.address(),
        "Configuration loaded"
    );

    collab_api::run(config).await?;
    Ok(())
}
