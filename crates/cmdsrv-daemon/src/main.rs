// SPDX-License-Identifier: MIT OR Apache-2.0
use anyhow::{Context, Result};
use clap::Parser;
use cmdsrv_config::{CmdsrvConfig, config_schema, load_config, validate_config};
use cmdsrv_daemon::{AppState, build_app, telemetry};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG_FILE: &str = "cmdsrv.toml";

#[derive(Parser, Debug)]
#[command(name = "cmdsrv", version, about = "HTTP command execution server")]
struct Args {
    /// Configuration file (TOML). Defaults to ./cmdsrv.toml when it exists.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bind address, overriding the configuration.
    #[arg(long)]
    bind: Option<String>,

    /// Bind port, overriding the configuration.
    #[arg(long)]
    port: Option<u16>,

    /// Log at debug level, including request bodies.
    #[arg(long)]
    debug: bool,

    /// Print the configuration JSON schema and exit.
    #[arg(long)]
    print_config_schema: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config_schema {
        println!("{}", serde_json::to_string_pretty(&config_schema())?);
        return Ok(());
    }

    let config = resolve_config(&args)?;
    let warnings = validate_config(&config).context("invalid configuration")?;

    telemetry::init_tracing(&config.logging, args.debug)?;
    for w in &warnings {
        warn!(target: "cmdsrv.daemon", "{w}");
    }

    let app = build_app(Arc::new(AppState::new(&config)));

    let addr = config.server.socket_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!(
        target: "cmdsrv.daemon",
        bind = %addr,
        version = %config.cmdsrv.version,
        "cmdsrv listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve")
}

fn resolve_config(args: &Args) -> Result<CmdsrvConfig> {
    let path = args.config.clone().or_else(|| {
        let default = Path::new(DEFAULT_CONFIG_FILE);
        default.is_file().then(|| default.to_path_buf())
    });
    let mut config = load_config(path.as_deref())
        .with_context(|| format!("load configuration from {path:?}"))?;

    if let Some(bind) = &args.bind {
        config.server.bind_address = bind.clone();
    }
    if let Some(port) = args.port {
        config.server.bind_port = port;
    }
    Ok(config)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(target: "cmdsrv.daemon", error = %err, "cannot listen for ctrl-c; running until killed");
        std::future::pending::<()>().await;
    }
    // Graceful shutdown still waits for in-flight requests, and so for
    // their children.
    info!(target: "cmdsrv.daemon", "shutdown requested");
}
