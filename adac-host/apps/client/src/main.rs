// Licensed under the Apache-2.0 license

//! ADAC Host Client Binary
//!
//! Authenticates to a debug target listening on a Unix domain socket and
//! asks it to unlock debug access.

use adac_host::UnlockOutcome;
use adac_host_client::{run_unlock, ClientOptions, UnixSocketDriver};
use adac_host_config::HostConfig;
use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "adac-host-client")]
#[command(about = "ADAC debug host - unlocks debug access on a target over a Unix domain socket")]
#[command(version)]
struct Args {
    /// Private key (PEM) or MAC secret of the leaf certificate
    keyfile: PathBuf,

    /// Certificate chain as a sequence of TLV records
    chainfile: PathBuf,

    /// Unix domain socket of the target
    socket_path: PathBuf,

    /// Configuration file path
    #[arg(
        short,
        long,
        help = "Path to TOML configuration file with host parameters"
    )]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, help = "Log packet headers and challenge contents")]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => HostConfig::from_file(path)?,
        None => HostConfig::load_default()?,
    };

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        config
            .logging
            .level
            .parse()
            .with_context(|| format!("Invalid log level: {}", config.logging.level))?
    };
    SimpleLogger::new()
        .with_level(level)
        .init()
        .with_context(|| "Failed to initialize logger")?;

    let mut driver = UnixSocketDriver::new(&args.socket_path);
    log::info!("Connecting to {}", driver.socket_path().display());

    let options = ClientOptions {
        key_file: args.keyfile,
        chain_file: args.chainfile,
        config,
    };

    match run_unlock(&mut driver, &options)? {
        UnlockOutcome::Unlocked => {
            println!("Debug access unlocked");
            Ok(())
        }
        UnlockOutcome::Skipped { key_type } => {
            println!("Skipped: target does not support key type {}", key_type);
            Ok(())
        }
        UnlockOutcome::Refused { status } => {
            println!("Target refused the token (status 0x{:04x})", status);
            std::process::exit(1);
        }
    }
}
