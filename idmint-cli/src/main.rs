//! idmint: mint persistent identifiers for content entities.
//!
//! Usage:
//!   idmint mint --config configs.json --service datacite.json \
//!       --entity node-1.json --type doi
//!
//! On success the identifier is printed and written into the entity file.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use idmint_cli::{import_configs, run, MintJob};
use idmint_mint::Outcome;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "idmint")]
#[command(about = "Mint DOIs, ARKs and Handles for content entities")]
struct Args {
    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mint one identifier and record it on the entity
    Mint {
        /// Configuration records: a JSON object of name → record, or a
        /// `.sqlite` / `.db` store
        #[arg(short, long)]
        config: PathBuf,

        /// Identifier service definition
        #[arg(short, long)]
        service: PathBuf,

        /// Entity JSON file, updated in place on success
        #[arg(short, long)]
        entity: PathBuf,

        /// Identifier type to mint (e.g. `doi`)
        #[arg(short = 't', long = "type")]
        identifier_type: String,

        /// Namespace prefix of the configuration record names
        #[arg(long)]
        prefix: Option<String>,

        /// Fail instead of minting with an incomplete payload
        #[arg(long)]
        strict: bool,
    },

    /// Copy JSON configuration records into a SQLite config store
    ImportConfig {
        /// JSON object of name → record
        #[arg(short, long)]
        config: PathBuf,

        /// SQLite store to create or update
        #[arg(long)]
        db: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match args.command {
        Command::Mint {
            config,
            service,
            entity,
            identifier_type,
            prefix,
            strict,
        } => {
            let job = MintJob {
                configs: config,
                service,
                entity,
                identifier_type,
                prefix,
                strict,
            };
            match run(&job).await? {
                Outcome::Minted(identifier) => {
                    info!(entity = %job.entity.display(), "Entity updated");
                    println!("{identifier}");
                    Ok(())
                }
                Outcome::Failed(e) => Err(anyhow!(e).context(format!(
                    "Failed to mint {} for {}",
                    job.identifier_type,
                    job.entity.display()
                ))),
            }
        }
        Command::ImportConfig { config, db } => {
            let count = import_configs(&config, &db)?;
            info!(count, db = %db.display(), "Imported configuration records");
            Ok(())
        }
    }
}
