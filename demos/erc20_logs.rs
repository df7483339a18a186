//! Replay ERC-20 logs through a decoder and print the decoded events.
//!
//! ```text
//! cargo run --example erc20_logs -- --logs logs.json --abi events.json
//! ```

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use ethereum_log_decoder::{Decoded, EventDescriptor, LogDecoder, LogRecord};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const ERC20_EVENTS: &str = include_str!("erc20_events.json");
const SAMPLE_LOGS: &str = include_str!("erc20_logs.json");

#[derive(Debug, Parser)]
#[command(about = "Decode ERC-20 Transfer and Approval logs")]
struct Args {
    /// JSON array of `eth_getLogs` results. Defaults to a built-in sample.
    #[arg(long)]
    logs: Option<PathBuf>,

    /// JSON array of ABI event fragments. Defaults to ERC-20 Transfer/Approval.
    #[arg(long)]
    abi: Option<PathBuf>,

    /// Print decoded events as JSON lines.
    #[arg(long)]
    json: bool,
}

fn read_or(path: &Option<PathBuf>, default: &str) -> Result<String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
        }
        None => Ok(default.to_string()),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let events: Vec<EventDescriptor> = serde_json::from_str(&read_or(&args.abi, ERC20_EVENTS)?)
        .context("failed to parse ABI events")?;
    let logs: Vec<LogRecord> =
        serde_json::from_str(&read_or(&args.logs, SAMPLE_LOGS)?).context("failed to parse logs")?;

    let decoder = LogDecoder::new(events).context("failed to build decoder")?;
    info!(events = decoder.len(), logs = logs.len(), "decoding logs");

    for (log, decoded) in logs.iter().zip(decoder.decode_all(&logs)) {
        match decoded {
            Ok(Decoded::Event(event)) if args.json => {
                println!("{}", serde_json::to_string(&event)?);
            }
            Ok(Decoded::Event(event)) => {
                println!("Log Block Number: {}", event.block_number);
                println!("Log Index: {}", event.log_index);
                println!("Log Name: {}", event.name);
                for (name, value) in &event.params {
                    println!("{}: {}", name, value);
                }
                println!();
            }
            Ok(Decoded::Unrecognized { topic }) => {
                info!(
                    block = log.block_number,
                    log_index = log.log_index,
                    topic = ?topic,
                    "skipping unrecognized log"
                );
            }
            Err(err) => {
                warn!(block = log.block_number, log_index = log.log_index, "{}", err);
            }
        }
    }

    Ok(())
}
