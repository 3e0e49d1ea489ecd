//! wpdeploy - inspect, resolve and scaffold WordPress deployment declarations

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "wpdeploy", version, about = "Deployment configuration for WordPress sites")]
struct Cli {
    /// Deployment declaration
    #[arg(short, long, global = true, env = "WPDEPLOY_CONFIG", default_value = "config.yaml")]
    config: PathBuf,

    /// Log output format
    #[arg(long, global = true, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Report every problem in the declaration
    Check {
        /// Only check this environment (dev, staging or live)
        #[arg(short, long)]
        env: Option<String>,
    },
    /// Print the resolved view of one environment
    Show {
        /// Target environment (dev, staging or live)
        #[arg(short, long)]
        env: String,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
        /// Print database passwords instead of masking them
        #[arg(long)]
        reveal_secrets: bool,
    },
    /// Write a blank declaration template
    Init {
        /// Destination, defaults to --config
        #[arg(short, long)]
        path: Option<PathBuf>,
        /// Include staging settings
        #[arg(long)]
        staging: bool,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

fn main() -> Result<ExitCode> {
    // .env may carry WPDEPLOY_* secrets, so it is read before anything else
    let dotenv_result = dotenv::dotenv();

    let cli = Cli::parse();

    init_logging(cli.log_format)?;

    match dotenv_result {
        Ok(path) => info!("Loaded environment variables from {}", path.display()),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => warn!("Could not load .env file: {}", e),
    }

    match cli.command {
        Command::Check { env } => {
            let valid = commands::check(&cli.config, env.as_deref())?;
            Ok(if valid { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Command::Show {
            env,
            format,
            reveal_secrets,
        } => {
            commands::show(&cli.config, &env, format, reveal_secrets)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Init {
            path,
            staging,
            force,
        } => {
            let path = path.unwrap_or(cli.config);
            commands::init(&path, staging, force)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Initialize logging on stderr, keeping stdout for command output
fn init_logging(format: LogFormat) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Pretty => {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to initialize pretty logging")?;
        }
        LogFormat::Json => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to initialize JSON logging")?;
        }
    }

    Ok(())
}
