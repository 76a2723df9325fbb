use clap::{crate_version, Parser, Subcommand};
use std::error::Error;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use shard_tss::config::EngineConfig;
use shard_tss::engine::TssEngine;
use shard_tss::protocol::{handle_protect, handle_recover, ProtectRequest, RecoverRequest};

#[derive(Debug, Subcommand)]
enum CliArgument {
    /// Encrypt a payload and split its key into shares. Prints the JSON response.
    Protect {
        /// Share threshold, defaults to the configured quorum.
        #[clap(long, short)]
        threshold: Option<usize>,

        /// Number of shares to generate, defaults to the configured quorum.
        #[clap(long, short)]
        shares: Option<usize>,

        /// File to read the payload from, stdin if omitted.
        #[clap(long, short)]
        input: Option<PathBuf>,
    },
    /// Rebuild the key from shares and decrypt. Reads a JSON recover request.
    Recover {
        /// File holding the recover request, stdin if omitted.
        #[clap(long, short)]
        input: Option<PathBuf>,

        /// Print the plaintext as hex instead of raw bytes.
        #[clap(long = "hex")]
        as_hex: bool,
    },
    /// Write a default configuration file.
    InitConfig {
        /// Destination of the TOML file.
        #[clap(long, short)]
        path: PathBuf,
    },
}

#[derive(Parser, Debug)]
#[command(name = "shard-tss")]
#[command(version = crate_version!())]
#[command(
    about = "SHARD-TSS - threshold-protected event payloads",
    long_about = "Encrypts a payload under a fresh key and splits that key among custodians with Shamir's Secret Sharing. The payload can only be recovered once a threshold of custodians hand their shares back. Shares and ciphertext bundles are exchanged as JSON with hex-encoded bytes; storing and distributing them is up to the caller."
)]
struct Opt {
    /// Path to a TOML configuration file.
    #[clap(long, short, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[clap(subcommand)]
    argument: CliArgument,
}

fn read_input(path: &Option<PathBuf>) -> io::Result<Vec<u8>> {
    match path {
        Some(path) => fs::read(path),
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();

    let opt = Opt::parse();

    match opt.argument {
        CliArgument::InitConfig { path } => {
            EngineConfig::default().write_default(&path)?;
            println!("📝 Wrote default config to {}", path.display());
        }
        CliArgument::Protect {
            threshold,
            shares,
            input,
        } => {
            let engine = engine(&opt.config)?;
            let config = engine.config();
            let request = ProtectRequest {
                plaintext: read_input(&input)?,
                threshold: threshold.unwrap_or(config.default_threshold),
                total_shares: shares.unwrap_or(config.default_shares),
            };
            let response = handle_protect(&engine, &request)?;
            debug!("Protected payload {}", response.payload_id);
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        CliArgument::Recover { input, as_hex } => {
            let engine = engine(&opt.config)?;
            let request: RecoverRequest = serde_json::from_slice(&read_input(&input)?)?;
            let response = handle_recover(&engine, &request)?;
            if as_hex {
                println!("{}", hex::encode(&response.plaintext));
            } else {
                io::stdout().write_all(&response.plaintext)?;
            }
        }
    }

    Ok(())
}

fn engine(config_path: &Option<PathBuf>) -> Result<TssEngine, Box<dyn Error>> {
    let config = EngineConfig::load(config_path.as_deref())?;
    debug!("Using config: {:?}", config);
    Ok(TssEngine::new(config)?)
}
