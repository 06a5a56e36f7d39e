//! ledgate service - HTTP gateway for a Bluetooth LED controller.
//!
//! Run with: `cargo run -p ledgate-service -- --device AA:BB:CC:DD:EE:FF`

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use ledgate_core::BleLight;
use ledgate_service::{Config, Lifecycle, shutdown_signal};

/// ledgate service - HTTP gateway for a Bluetooth LED controller.
#[derive(Parser, Debug)]
#[command(name = "ledgate-service")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Bind address (overrides config).
    #[arg(short, long, global = true)]
    bind: Option<String>,

    /// Device address (overrides config and LED_DEVICE_ADDRESS).
    #[arg(short, long, global = true)]
    device: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the service in the foreground (default behavior).
    Run,

    /// Load and validate the configuration, then exit.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.command {
        Some(Command::CheckConfig) => check_config(&args),
        Some(Command::Run) | None => run_server(&args).await,
    }
}

/// Load the file, then apply environment and command-line overrides.
fn resolve_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };

    config.apply_env();

    if let Some(bind) = &args.bind {
        config.server.bind = bind.clone();
    }
    if let Some(device) = &args.device {
        config.device.address = device.clone();
    }

    config.validate()?;
    Ok(config)
}

fn check_config(args: &Args) -> anyhow::Result<()> {
    let config = resolve_config(args)?;

    println!("Configuration OK");
    println!("  bind:            {}", config.server.bind);
    println!("  device:          {}", config.device.address);
    println!("  queue capacity:  {}", config.session.queue_capacity);
    println!("  drain timeout:   {}s", config.session.drain_timeout_secs);
    println!("  reconnect:       {}", config.session.reconnect_on_demand);
    Ok(())
}

async fn run_server(args: &Args) -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ledgate_service=info".parse()?)
                .add_directive("ledgate_core=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    let config = resolve_config(args)?;

    let listener = tokio::net::TcpListener::bind(config.server.bind.as_str())
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;

    let light = BleLight::with_config(
        config.device.address.clone(),
        config.device.connection_config(),
    );
    info!(device = %config.device.address, "Starting ledgate service");

    let report = Lifecycle::new(config)
        .run(light, listener, shutdown_signal())
        .await?;

    info!(
        drained = report.drained,
        abandoned = report.abandoned,
        "Shutdown complete"
    );
    Ok(())
}
