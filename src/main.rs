//! runway CLI
//!
//! Resolves target and port, logs one startup line, and execs the chosen
//! process. Exact selector semantics: `RUN_TARGET=frontend` starts the
//! dashboard; anything else starts the WSGI server.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use runway::config::{LauncherConfig, Overrides};
use runway::launch::LaunchPlan;

#[derive(Parser)]
#[command(name = "runway")]
#[command(about = "Selects and execs the web server or dashboard process")]
struct Cli {
    /// Path to config file (default: ~/.config/runway/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Launch target; overrides RUN_TARGET
    #[arg(long)]
    target: Option<String>,

    /// Bind port, forwarded verbatim; overrides PORT
    #[arg(long)]
    port: Option<String>,

    /// Extra backend server arguments; overrides GUNICORN_CMD_ARGS
    #[arg(long)]
    gunicorn_args: Option<String>,

    /// Fallback port when neither --port nor PORT is set
    #[arg(long)]
    default_port: Option<String>,

    /// Print the resolved command without launching it
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let overrides = Overrides {
        target: cli.target,
        port: cli.port,
        gunicorn_args: cli.gunicorn_args,
        default_port: cli.default_port,
    };

    let config = LauncherConfig::load(cli.config.as_ref(), &overrides)?;
    let plan = LaunchPlan::build(&config)?;

    info!(
        run_target = %config.target,
        port = %config.port,
        extra_args = %config.extra_args,
        command = %plan.rendered(),
        "launching"
    );

    if cli.dry_run {
        println!("{}", plan.rendered());
        return Ok(());
    }

    // Only returns if the exec failed.
    plan.exec()
}
