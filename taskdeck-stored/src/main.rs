//! TaskDeck document store server -- hosted database stand-in.
//!
//! An axum WebSocket server holding per-user task collections in memory,
//! with a credential directory backing the identity-exchange endpoint.
//!
//! # Usage
//!
//! ```bash
//! # Run on default address 0.0.0.0:9400
//! cargo run --bin taskdeck-stored
//!
//! # Demo mode: accept any sign-in code
//! cargo run --bin taskdeck-stored -- --bind 127.0.0.1:9400 --allow-any-credential
//! ```

use std::sync::Arc;

use clap::Parser;

use taskdeck_stored::config::{StoredCliArgs, StoredConfig};
use taskdeck_stored::server::{self, StoreState};

#[tokio::main]
async fn main() {
    let cli = StoredCliArgs::parse();

    let config = match StoredConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(addr = %config.bind_addr, "starting taskdeck store server");

    let state = if config.allow_any_credential {
        tracing::warn!("credential directory accepts any code (demo mode)");
        Arc::new(StoreState::with_open_credentials())
    } else {
        Arc::new(StoreState::new())
    };

    match server::start_server_with_state(&config.bind_addr, state).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "store server listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "store server task failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start store server");
            std::process::exit(1);
        }
    }
}
