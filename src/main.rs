use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use docvault::cli::{handle_account_command, handle_document_command, AccountCommands, DocumentCommands};
use docvault::config::{paths::VaultPaths, settings::Settings};
use docvault::crypto::SystemCrypto;
use docvault::storage::Storage;
use docvault::VaultError;

#[derive(Parser)]
#[command(
    name = "docvault",
    version,
    about = "Client-side encrypted document vault",
    long_about = "docvault stores documents encrypted with a key derived from your \
                  master password. Names, subjects and contents are never written \
                  to disk in plaintext."
)]
struct Cli {
    /// Vault data directory
    #[arg(long, env = "DOCVAULT_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Log debug output to stderr (overrides the configured filter)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Account(AccountCommands),

    #[command(flatten)]
    Document(DocumentCommands),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = match cli.data_dir {
        Some(dir) => VaultPaths::with_base_dir(dir),
        None => VaultPaths::new()?,
    };
    let settings = Settings::load_or_create(&paths)?;

    init_logging(if cli.verbose { "docvault=debug" } else { settings.log_filter.as_str() });

    run(cli.command, paths, &settings).map_err(|e| {
        // Wrong password and tampered data are indistinguishable; say so and nothing more
        if e.is_opaque() {
            anyhow!("{}: wrong password or damaged vault data", e)
        } else {
            anyhow::Error::new(e)
        }
    })
}

fn run(command: Option<Commands>, paths: VaultPaths, settings: &Settings) -> Result<(), VaultError> {
    let Some(command) = command else {
        println!("docvault - client-side encrypted document vault");
        println!();
        println!("Run 'docvault init' to create a vault.");
        println!("Run 'docvault --help' for usage information.");
        return Ok(());
    };

    // Initialize storage
    let storage = Storage::open(paths)?;
    let crypto = SystemCrypto::new();

    match command {
        Commands::Account(cmd) => handle_account_command(&storage, settings, &crypto, cmd),
        Commands::Document(cmd) => handle_document_command(&storage, settings, &crypto, cmd),
    }
}

/// Install the stderr subscriber; `RUST_LOG` wins over `fallback`
fn init_logging(fallback: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
