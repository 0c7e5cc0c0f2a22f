//! `ocs-config`: inspect, validate, diff and serve the charging engine configuration.
//!
//! ```text
//! check <path>            load + validate, list every problem
//! show <path>             print the resolved sections
//! diff <old> <new>        print the patch per changed section
//! serve --config <path>   run the config API (optional store and watcher)
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use ocs_config::config::loader::load_into;
use ocs_config::config::schema::resolve_sections;
use ocs_config::config::{validate_config, ChargingConfig, ConfigError};
use ocs_config::lifecycle::startup::{serve, ServeOptions};
use ocs_config::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "ocs-config")]
#[command(about = "Charging engine configuration tool", long_about = None)]
struct Cli {
    /// Debug logging unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate a configuration file or directory
    Check { path: PathBuf },
    /// Print the resolved configuration
    Show {
        path: PathBuf,
        #[arg(short, long = "section")]
        sections: Vec<String>,
    },
    /// Print what changes between two configurations
    Diff {
        old: PathBuf,
        new: PathBuf,
        #[arg(short, long = "section")]
        sections: Vec<String>,
    },
    /// Serve the config API
    Serve {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long, default_value = "127.0.0.1:2081")]
        bind: String,
        #[arg(short = 'k', long)]
        api_key: String,
        /// JSON file persisting API changes
        #[arg(short, long)]
        store: Option<PathBuf>,
        /// Reload when the configuration path changes
        #[arg(short, long)]
        watch: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Check { path } => {
            let config = load_unvalidated(&path)?;
            match validate_config(&config) {
                Ok(()) => println!("OK"),
                Err(errors) => {
                    for error in &errors {
                        eprintln!("{error}");
                    }
                    std::process::exit(1);
                }
            }
        }
        Commands::Show { path, sections } => {
            let config = load_unvalidated(&path)?;
            let mut out = serde_json::Map::new();
            for name in resolve_sections(&sections)? {
                out.insert(name.to_string(), config.section_as_map(name)?);
            }
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Commands::Diff { old, new, sections } => {
            let old = load_unvalidated(&old)?;
            let new = load_unvalidated(&new)?;
            let patch = old.diff(&new, &resolve_sections(&sections)?)?;
            println!("{}", serde_json::to_string_pretty(&patch)?);
        }
        Commands::Serve {
            config,
            bind,
            api_key,
            store,
            watch,
        } => {
            tracing::info!("ocs-config v{} starting", env!("CARGO_PKG_VERSION"));
            serve(ServeOptions {
                config,
                bind,
                api_key,
                store,
                watch,
            })
            .await?;
        }
    }
    Ok(())
}

fn load_unvalidated(path: &Path) -> Result<ChargingConfig, ConfigError> {
    let mut config = ChargingConfig::default();
    load_into(&mut config, path, None)?;
    Ok(config)
}
