//! Risk Warden CLI
//!
//! Command-line interface for running MITRE ATT&CK risk assessments against
//! industrial control system assets.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::assess::{parse_score_spec, AssessArgs};
use config::AppConfig;
use rw_core::models::AssetType;

#[derive(Parser)]
#[command(name = "riskwarden")]
#[command(version)]
#[command(about = "MITRE ATT&CK risk assessment for ICS assets", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a technique dataset without loading it
    Validate {
        /// Dataset file (.csv, .tsv, or .json)
        file: PathBuf,
    },

    /// Import a dataset and write it back out as normalized JSON seed rows
    Import {
        /// Dataset file (.csv, .tsv, or .json)
        file: PathBuf,

        /// Destination for the normalized JSON rows
        #[arg(short, long, value_name = "FILE")]
        out: PathBuf,
    },

    /// List the tactics and techniques in a dataset
    Tactics {
        /// Dataset file (.csv, .tsv, or .json)
        file: PathBuf,
    },

    /// Run a scripted assessment and emit a JSON report
    Assess {
        /// Technique dataset (defaults to data_path from the config file)
        #[arg(short, long, value_name = "FILE")]
        data: Option<PathBuf>,

        /// Name of the asset under assessment
        #[arg(long)]
        asset: String,

        /// Asset category (hmi, plc, workstation, scada, historian, rtu)
        #[arg(long = "asset-type")]
        asset_type: AssetType,

        /// Technique to rate, as TECHNIQUE_ID=SCORE (repeatable)
        #[arg(long = "score", value_name = "TECHNIQUE_ID=SCORE", required = true)]
        scores: Vec<String>,

        /// Write the JSON report here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    init_tracing(cli.verbose, &config);

    match cli.command {
        Commands::Validate { file } => commands::dataset::validate(&file).await,
        Commands::Import { file, out } => commands::dataset::import(&file, &out).await,
        Commands::Tactics { file } => commands::dataset::tactics(&file).await,
        Commands::Assess {
            data,
            asset,
            asset_type,
            scores,
            output,
        } => {
            let scores = scores
                .iter()
                .map(|spec| parse_score_spec(spec))
                .collect::<Result<Vec<_>>>()?;
            let data = data.or_else(|| config.data_path.clone()).ok_or_else(|| {
                anyhow::anyhow!("No dataset specified: pass --data or set data_path in the config")
            })?;
            commands::assess::run(AssessArgs {
                data,
                asset,
                asset_type,
                scores,
                output,
                pretty: config.report.pretty,
            })
            .await
        }
    }
}

fn init_tracing(verbose: bool, config: &AppConfig) {
    let level = if verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
