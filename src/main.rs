// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 telemetry-stats contributors. All rights reserved.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use telemetry_stats::{api, dataset, LoadPolicy};
use tokio::net::TcpListener;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "telemetry-stats", version, about = "Region latency/uptime statistics service")]
struct Args {
    /// HTTP listen port
    #[arg(long, env = "PORT", default_value_t = 8000)]
    port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0")]
    bind: std::net::IpAddr,

    /// Telemetry JSON file, read once at startup
    #[arg(long, env = "TELEMETRY_PATH", default_value = "telemetry.json")]
    data: PathBuf,

    /// Refuse to start if any telemetry record is malformed.
    /// By default malformed records are skipped with a warning.
    #[arg(long)]
    strict: bool,
}

impl Args {
    fn load_policy(&self) -> LoadPolicy {
        if self.strict {
            LoadPolicy::Strict
        } else {
            LoadPolicy::Lenient
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "telemetry_stats=info,tower_http=warn".into()),
        )
        .init();

    let args = Args::parse();
    let telemetry = dataset::load_or_empty(&args.data, args.load_policy())?;
    let state = Arc::new(api::ServerState::new(telemetry));

    let addr = SocketAddr::new(args.bind, args.port);
    info!(
        %addr,
        data = %args.data.display(),
        strict = args.strict,
        "telemetry-stats starting"
    );

    let listener = TcpListener::bind(addr).await?;
    api::serve(listener, state, shutdown_signal())
        .await
        .map_err(|e| {
            error!(error = %e, "HTTP server exited");
            e as Box<dyn std::error::Error>
        })?;

    info!("telemetry-stats stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
