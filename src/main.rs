// Copyright (C) 2015-2025 The Neo Project.
//
// main.rs file belongs to the neo project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Neo Monitor - command-line chain watcher
//!
//! Follows the block height of a Neo N3 node or neo-express instance and
//! looks up blocks, transactions and address balances through a pooled
//! [`BlockchainMonitor`](neo_blockchain_monitor::BlockchainMonitor).
//!
//! Usage:
//!   neo-monitor --url http://127.0.0.1:50012 watch
//!   neo-monitor block 1024
//!   neo-monitor address NXV7ZhHiyM1aHXwpVsRZC6BwNFP2jghXAq

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use neo_blockchain_monitor::{BlockchainMonitorPool, MonitorHandle, MonitorSettings};
use serde_json::{json, Value};
use std::path::PathBuf;
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "neo-monitor", about = "Neo N3 chain watcher", version)]
struct Cli {
    /// JSON-RPC endpoint of the node.
    #[arg(
        long,
        short = 'u',
        default_value = "http://127.0.0.1:50012",
        env = "NEO_RPC_URL",
        value_name = "URL"
    )]
    url: String,

    /// Path to a TOML file with monitor settings.
    #[arg(long, short = 'c', env = "NEO_MONITOR_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Overrides the configured poll interval.
    #[arg(long, value_name = "MS")]
    poll_interval_ms: Option<u64>,

    /// Fail on the first RPC error instead of retrying.
    #[arg(long)]
    no_retry: bool,

    /// Emit logs and results as JSON.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Print a line for every height change until Ctrl+C (default).
    Watch,
    /// Look up a block by index or hash.
    Block { index_or_hash: String },
    /// Look up a transaction by hash.
    Tx { hash: String },
    /// Show the NEO and GAS balances of an address or script hash.
    Address { address: String },
}

fn init_tracing(json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(env_filter).with_target(false);
    if json {
        let _ = builder.json().try_init();
    } else {
        let _ = builder.try_init();
    }
}

/// Settings from `--config` (or defaults) with command-line overrides.
fn load_settings(cli: &Cli) -> Result<MonitorSettings> {
    let mut settings = match &cli.config {
        Some(path) => MonitorSettings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => MonitorSettings::default(),
    };
    if let Some(poll_interval_ms) = cli.poll_interval_ms {
        settings.poll_interval_ms = poll_interval_ms;
    }
    settings.validate().context("invalid monitor settings")?;
    Ok(settings)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json);

    let settings = load_settings(&cli)?;
    let pool = BlockchainMonitorPool::new(settings);
    let monitor = pool
        .get_monitor(&cli.url)
        .with_context(|| format!("failed to open monitor for {}", cli.url))?;
    let retry = !cli.no_retry;

    let output = match cli.command.clone().unwrap_or(Command::Watch) {
        Command::Watch => {
            watch(&monitor, cli.json).await;
            None
        }
        Command::Block { index_or_hash } => {
            let block = monitor
                .get_block(index_or_hash.as_str(), retry)
                .await
                .with_context(|| format!("failed to fetch block {index_or_hash}"))?;
            Some(serde_json::to_value(block.as_ref())?)
        }
        Command::Tx { hash } => {
            let tx = monitor
                .get_transaction(&hash, retry)
                .await
                .with_context(|| format!("failed to fetch transaction {hash}"))?;
            Some(serde_json::to_value(tx.as_ref())?)
        }
        Command::Address { address } => {
            let balance = monitor
                .get_address(&address, retry)
                .await
                .with_context(|| format!("failed to fetch balances of {address}"))?;
            Some(json!({
                "address": balance.address,
                "neo": balance.neo_balance.to_string(),
                "gas": balance.gas_balance.to_string(),
            }))
        }
    };

    if let Some(value) = output {
        print_value(&value, cli.json)?;
    }

    monitor.release();
    pool.dispose_all();
    Ok(())
}

async fn watch(monitor: &MonitorHandle, json: bool) {
    info!(url = monitor.url(), "watching chain height");
    let mut changes = monitor.subscribe();
    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("received Ctrl+C, stopping");
                break;
            }
            change = changes.recv() => match change {
                Ok(change) => {
                    if json {
                        println!(
                            "{}",
                            json!({
                                "height": change.block_height,
                                "filterAvailable": change.filter_available,
                                "reset": change.reset,
                            })
                        );
                    } else {
                        let suffix = if change.reset { " (chain reset)" } else { "" };
                        println!("height {}{}", change.block_height, suffix);
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "change events dropped"),
                Err(RecvError::Closed) => break,
            }
        }
    }
}

fn print_value(value: &Value, compact: bool) -> Result<()> {
    let text = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{text}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_to_local_express_and_watch() {
        let cli = Cli::try_parse_from(["neo-monitor"]).unwrap();
        assert_eq!(cli.url, "http://127.0.0.1:50012");
        assert_eq!(cli.command, None);
        assert!(!cli.no_retry);
        assert!(!cli.json);
    }

    #[test]
    fn parses_lookup_subcommands() {
        let cli = Cli::try_parse_from(["neo-monitor", "-u", "http://seed1.neo.org:10332", "block", "12"])
            .unwrap();
        assert_eq!(cli.url, "http://seed1.neo.org:10332");
        assert_eq!(
            cli.command,
            Some(Command::Block {
                index_or_hash: "12".to_string()
            })
        );

        let cli = Cli::try_parse_from(["neo-monitor", "--no-retry", "tx", "0xab"]).unwrap();
        assert!(cli.no_retry);
        assert_eq!(
            cli.command,
            Some(Command::Tx {
                hash: "0xab".to_string()
            })
        );
    }

    #[test]
    fn poll_interval_flag_overrides_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "poll_interval_ms = 5000\nmax_attempts = 5").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = Cli::try_parse_from(["neo-monitor", "-c", &path]).unwrap();
        let settings = load_settings(&cli).unwrap();
        assert_eq!(settings.poll_interval_ms, 5000);
        assert_eq!(settings.max_attempts, 5);

        let cli =
            Cli::try_parse_from(["neo-monitor", "-c", &path, "--poll-interval-ms", "250"]).unwrap();
        let settings = load_settings(&cli).unwrap();
        assert_eq!(settings.poll_interval_ms, 250);
        assert_eq!(settings.max_attempts, 5);
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let cli = Cli::try_parse_from(["neo-monitor", "--poll-interval-ms", "0"]).unwrap();
        assert!(load_settings(&cli).is_err());
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let cli = Cli::try_parse_from(["neo-monitor", "-c", "/nonexistent/monitor.toml"]).unwrap();
        let err = load_settings(&cli).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/monitor.toml"));
    }
}
