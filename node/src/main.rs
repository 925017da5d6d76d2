// Copyright (c) 2026 OpenClaw Contributors. MIT License.
// See LICENSE for details.

//! # Claw Memory Node
//!
//! Entry point for the `claw-node` binary. Parses CLI arguments,
//! initializes logging and metrics, opens the storage engine, and serves
//! the HTTP API.
//!
//! The binary supports three subcommands:
//!
//! - `run`     — start the memory node
//! - `keygen`  — generate an agent identity offline
//! - `version` — print build version information

mod api;
mod cli;
mod logging;
mod metrics;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

use claw_protocol::service::{MemoryService, ServiceConfig};
use claw_protocol::storage::{ClawDb, MemoryBackend};

use cli::{ClawNodeCli, Commands};
use metrics::NodeMetrics;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = ClawNodeCli::parse();

    match cli.command {
        Commands::Run(args) => run_node(args).await,
        Commands::Keygen => {
            keygen();
            Ok(())
        }
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Starts the full memory node: API server and metrics endpoint.
async fn run_node(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(
        "claw_node=info,claw_protocol=info,tower_http=debug",
        args.log_format,
    );

    tracing::info!(
        api_port = args.api_port,
        metrics_port = args.metrics_port,
        freshness_window_secs = args.freshness_window_secs,
        ephemeral = args.ephemeral,
        data_dir = %args.data_dir.display(),
        "starting claw-node"
    );

    let config = ServiceConfig {
        freshness_window: Duration::from_secs(args.freshness_window_secs),
    };

    // --- Storage + protocol service ---
    let service = if args.ephemeral {
        tracing::warn!("running ephemeral: all state is lost on shutdown");
        let backend = Arc::new(MemoryBackend::new());
        MemoryService::new(backend.clone(), backend, config)
    } else {
        let db_path = args.data_dir.join("db");
        std::fs::create_dir_all(&db_path).with_context(|| {
            format!("failed to create database directory: {}", db_path.display())
        })?;

        let db = Arc::new(
            ClawDb::open(&db_path)
                .with_context(|| format!("failed to open database at {}", db_path.display()))?,
        );
        tracing::info!(path = %db_path.display(), "database opened");
        MemoryService::new(db.clone(), db, config)
    };

    // --- Metrics ---
    let node_metrics = Arc::new(NodeMetrics::new());

    // --- Application state ---
    let app_state = api::AppState {
        version: format!(
            "{} (protocol {})",
            env!("CARGO_PKG_VERSION"),
            claw_protocol::config::PROTOCOL_VERSION,
        ),
        service,
        metrics: Arc::clone(&node_metrics),
    };

    // --- API server ---
    let api_router = api::create_router(app_state);
    let api_addr = format!("0.0.0.0:{}", args.api_port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("failed to bind API listener on {}", api_addr))?;
    tracing::info!("API server listening on {}", api_addr);

    // --- Metrics server ---
    let metrics_router = axum::Router::new()
        .route("/metrics", axum::routing::get(metrics::metrics_handler))
        .with_state(Arc::clone(&node_metrics));
    let metrics_addr = format!("0.0.0.0:{}", args.metrics_port);
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {}", metrics_addr))?;
    tracing::info!("Metrics server listening on {}", metrics_addr);

    // --- Serve ---
    tokio::select! {
        res = axum::serve(api_listener, api_router) => {
            if let Err(e) = res {
                tracing::error!("API server error: {}", e);
            }
        }
        res = axum::serve(metrics_listener, metrics_router) => {
            if let Err(e) = res {
                tracing::error!("Metrics server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received, draining connections");
        }
    }

    tracing::info!("claw-node stopped");
    Ok(())
}

/// Generates an agent identity offline and prints it to stdout.
///
/// Nothing is written to disk and no service is contacted: the output is
/// the keypair, the derived agent ID, and the recovery phrase, exactly
/// what a registration response would contain. Useful for air-gapped key
/// generation and for demos.
fn keygen() {
    let keypair = claw_protocol::identity::AgentKeypair::generate();
    let seed = keypair.seed_bytes();
    let phrase = match claw_protocol::identity::encode_phrase(&seed) {
        Ok(p) => p,
        // 32-byte seeds are always encodable; this arm is unreachable in
        // practice but keygen is not worth a panic path.
        Err(e) => {
            eprintln!("failed to encode recovery phrase: {e}");
            std::process::exit(1);
        }
    };
    let agent_id = claw_protocol::identity::AgentId::derive(&keypair.public_key());

    println!("Agent identity generated.");
    println!("  Agent ID        : {}", agent_id);
    println!("  Public key (b64): {}", keypair.public_key().to_base64());
    println!("  Recovery phrase : {}", phrase);
    println!();
    println!("Write the recovery phrase down. It is the only way to recover");
    println!("this identity and it will not be shown again.");
}

/// Prints version information to stdout.
fn print_version() {
    println!("claw-node {}", env!("CARGO_PKG_VERSION"));
    println!("protocol  {}", claw_protocol::config::PROTOCOL_VERSION);
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
