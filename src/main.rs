//! midlc - CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use midlc::util::config::FrontendConfig;
use midlc::util::logger::{self, LogLevel};
use midlc::{bootstrap_json, tokenize_file, NAME, VERSION};
use std::path::PathBuf;

/// MIDL front end tools
#[derive(Parser, Debug)]
#[command(name = "midlc")]
#[command(version = VERSION)]
#[command(about = NAME, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the tokens of a source file
    Tokens {
        /// Source file to tokenize
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the built-in declarations as JSON
    Bootstrap,

    /// Print version information
    Version,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = FrontendConfig::load(args.config.as_deref()).context("Failed to load config")?;
    let level = if args.debug {
        LogLevel::Debug
    } else {
        config.log_level
    };
    logger::init_with_level(level);
    tracing::debug!("search path: {:?}", config.search_path);

    match args.command {
        Commands::Tokens { file } => {
            for token in tokenize_file(&file)? {
                println!("{}\t{:?}", token.span, token.kind);
            }
        }
        Commands::Bootstrap => {
            println!("{}", bootstrap_json()?);
        }
        Commands::Version => {
            println!("{} {}", NAME, VERSION);
        }
    }

    Ok(())
}
