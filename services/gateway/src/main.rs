//! MPI gateway operator CLI entry point

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::Gateway;
use mpi_config::{LoggingConfig, MpiConfig};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Environment overlay from config/environments/<name>.toml
    #[arg(short, long)]
    environment: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered message types and versions
    Registry {
        /// Protocol family (3DSecure, MPI_Interface) or ALL
        #[arg(short, long, default_value = "ALL")]
        family: String,

        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },

    /// Convert and validate a document, printing its canonical form
    Convert { file: PathBuf },

    /// Convert a document and transform it into another message type
    Transform {
        file: PathBuf,

        /// Destination message type
        #[arg(long)]
        to: String,

        /// Destination version
        #[arg(long)]
        version: String,
    },

    /// Print the effective configuration
    Config,
}

fn init_logging(logging: &LoggingConfig) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "warn,mpi_codec={0},mpi_config={0},mpi_gateway={0}",
                logging.level
            ))
        });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = MpiConfig::load(args.config.as_deref(), args.environment.as_deref())?;
    init_logging(&config.logging);
    info!("MPI gateway {}", env!("CARGO_PKG_VERSION"));
    debug!("Configuration loaded: {:?}", config);

    let gateway = || Gateway::from_config(&config);
    let output = match args.command {
        Command::Registry { family, json } => gateway()?.registry_listing(&family, json)?,
        Command::Convert { file } => gateway()?.convert_file(&file)?,
        Command::Transform { file, to, version } => {
            gateway()?.transform_file(&file, &to, &version)?
        }
        Command::Config => config.to_toml_string()?,
    };

    println!("{}", output.trim_end());
    Ok(())
}
