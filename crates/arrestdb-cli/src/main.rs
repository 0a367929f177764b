mod normalize;
mod output;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use arrestdb_core::{AppConfig, NormalizerConfig, RECORD_COLUMNS, SHEET_COLUMNS};

use crate::output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "arrestdb-cli")]
#[command(about = "Normalize and score scraped arrest-booking records")]
struct Cli {
    /// Normalizer config file; overrides `ARRESTDB_NORMALIZER_CONFIG`
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Normalize raw booking pairs, one JSON object per input line
    Normalize {
        /// County code stamped on every record (e.g. COLLIER)
        #[arg(long)]
        county: String,
        /// Page the bookings were scraped from
        #[arg(long, default_value = "")]
        source_url: String,
        /// Read from this file instead of stdin
        #[arg(long)]
        input: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        /// Only emit qualified leads
        #[arg(long)]
        qualified_only: bool,
    },
    /// Load and validate the normalizer config, then print a summary
    CheckConfig,
    /// Print the persisted record column order
    Columns {
        /// Print the 34-column lead sheet header instead
        #[arg(long)]
        sheet: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let app_config = arrestdb_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(app_config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(env = %app_config.env, "arrestdb-cli starting");

    match cli.command {
        Commands::Normalize {
            county,
            source_url,
            input,
            format,
            qualified_only,
        } => {
            let config = load_config(&config_path(cli.config, &app_config))?;
            let options = normalize::NormalizeOptions {
                county,
                source_url,
                format,
                qualified_only,
            };
            normalize::run_normalize(config, input.as_deref(), &options)?;
        }
        Commands::CheckConfig => {
            let path = config_path(cli.config, &app_config);
            let config = load_config(&path)?;
            print_config_summary(&path, &config);
        }
        Commands::Columns { sheet } => {
            let columns: &[&str] = if sheet { &SHEET_COLUMNS } else { &RECORD_COLUMNS };
            for column in columns {
                println!("{column}");
            }
        }
    }

    Ok(())
}

/// The `--config` flag wins over the environment-derived default.
fn config_path(flag: Option<PathBuf>, app_config: &AppConfig) -> PathBuf {
    flag.unwrap_or_else(|| app_config.normalizer_config_path.clone())
}

fn load_config(path: &Path) -> anyhow::Result<NormalizerConfig> {
    arrestdb_core::load_normalizer_config(path)
        .with_context(|| format!("loading normalizer config from {}", path.display()))
}

fn print_config_summary(path: &Path, config: &NormalizerConfig) {
    let aliases = config.aliases().entries();
    let alias_count: usize = aliases.iter().map(|e| e.aliases.len()).sum();
    let rules = config.rules();

    println!("config:          {}", path.display());
    println!("fingerprint:     {}", config.fingerprint());
    println!("default state:   {}", config.default_state());
    println!("fields:          {} ({alias_count} aliases)", aliases.len());
    println!("bond tiers:      {}", rules.bond_tiers.len());
    println!(
        "serious charges: {} keywords, {} points",
        rules.serious_charges.keywords.len(),
        rules.serious_charges.points
    );
    println!("recency tiers:   {}", rules.recency.len());
    println!("min score:       {}", rules.min_score);
}
