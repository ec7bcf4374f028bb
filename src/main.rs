use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use rexpro_filter::FilterGate;
use rexpro_server::{load_config, RexProServer, UnavailableExecution};
use rexpro_session::{SessionRegistry, StaticEngines, StaticGraphs};
use rexpro_telemetry::{init_telemetry, install_recorder, TelemetryConfig};

/// RexPro session gate server.
#[derive(Debug, Parser)]
#[command(name = "rexpro", version, about)]
struct Cli {
    /// JSON config file merged over the defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    let log_level = parse_log_level(&config.log_level);
    init_telemetry(&TelemetryConfig {
        log_level: log_level.unwrap_or(tracing::Level::INFO),
        module_levels: Vec::new(),
        json: config.json_logs,
    })?;
    if log_level.is_none() {
        tracing::warn!(log_level = %config.log_level, "unrecognised log level, using info");
    }
    let metrics = install_recorder()?;

    tracing::info!(
        graphs = ?config.graphs,
        languages = ?config.languages,
        policy = ?config.filter.metadata_policy,
        "starting rexpro server"
    );

    let registry = Arc::new(SessionRegistry::new());
    let gate = FilterGate::new(
        Arc::clone(&registry),
        Arc::new(StaticGraphs::from_names(config.graphs.iter().map(String::as_str))),
        Arc::new(StaticEngines::new(config.languages.iter().map(String::as_str))),
        config.filter.clone(),
    );

    let server = RexProServer::new(
        config,
        Arc::new(gate),
        Arc::new(UnavailableExecution),
        Some(metrics),
    );
    let (addr, handle) = server.listen().await?;
    tracing::info!(
        %addr,
        max_message_size = server.config().max_message_size,
        "rexpro server ready"
    );

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl+c")?;

    tracing::info!(connections = server.connection_count(), "shutting down");
    let destroyed = server
        .shutdown()
        .graceful_shutdown(vec![handle], &registry, None)
        .await;
    tracing::info!(destroyed, "shutdown complete");
    Ok(())
}

/// `None` when `raw` is not a tracing level name.
fn parse_log_level(raw: &str) -> Option<tracing::Level> {
    raw.trim().parse().ok()
}
