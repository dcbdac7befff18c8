// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use clap::Parser;
use tracing::error;

use pjlink_core::{PjlinkClient, PjlinkConfig, StaticMetadataProvider};

#[tokio::main]
async fn main() {
    let config = PjlinkConfig::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let metadata = Arc::new(StaticMetadataProvider::new(env!("CARGO_PKG_VERSION"), "unknown"));
    let client = PjlinkClient::new(config, metadata);

    match client.poll().await {
        Ok(snapshot) => match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!("failed to serialize snapshot: {e:#}");
                std::process::exit(1);
            }
        },
        Err(e) => {
            error!("poll failed: {e:#}");
            std::process::exit(1);
        }
    }
}
