//! Typing API server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p typing-api
//! ```
//!
//! Configuration is loaded from environment variables (and `.env` if present).

use tracing::{error, info};
use typing_common::{try_init_tracing_with_config, AppConfig, TracingConfig};

#[tokio::main]
async fn main() {
    // Configuration decides the log format, so it is loaded first
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run(config).await {
        error!(error = %e, "Server failed to start");
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    info!(
        app = %config.app.name,
        env = ?config.app.env,
        port = config.api.port,
        seeded_tokens = config.seed.tokens.len(),
        seeded_rooms = config.seed.rooms.len(),
        "Starting Typing API Server..."
    );

    typing_api::run(config).await?;

    Ok(())
}
