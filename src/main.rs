//! `wallet-relay` command line.
//!
//! With no subcommand, prints the signer address and its balance.

use std::net::SocketAddr;
use std::path::PathBuf;

use alloy::primitives::{Address, TxHash, U256};
use clap::{Parser, Subcommand};

use wallet_relay::config::load_config;
use wallet_relay::observability::{logging, metrics};
use wallet_relay::{RelayConfig, TransactionRelay};

#[derive(Parser)]
#[command(name = "wallet-relay")]
#[command(about = "Wallet automation: balances, lookups, swaps and Lido staking", long_about = None)]
struct Cli {
    /// Optional TOML config file; environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the signer address
    Address,
    /// Show the ETH balance of an address (defaults to the signer)
    Balance { address: Option<Address> },
    /// Look up a transaction by hash
    Tx { hash: TxHash },
    /// Swap tokens through the aggregator
    Swap {
        /// Token to sell: address or symbol from the [tokens] table
        from: String,
        /// Token to buy: address or symbol from the [tokens] table
        to: String,
        /// Amount to sell in the token's smallest unit
        amount: U256,
        /// Slippage tolerance in percent
        #[arg(long)]
        slippage: Option<f64>,
    },
    /// Stake ETH with Lido
    Stake {
        /// Amount in ETH, e.g. 0.1
        amount: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    logging::init_logging(&config.observability.log_level);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics server");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let relay = TransactionRelay::from_config(&config).await?;

    tokio::select! {
        result = run(&relay, &config, cli.command) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted; a submitted transaction may still be mined");
            Err("interrupted".into())
        }
    }
}

async fn run(
    relay: &TransactionRelay,
    config: &RelayConfig,
    command: Option<Commands>,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        None => {
            let (address, balance) = relay.wallet_summary().await?;
            println!("Wallet: {} - Balance: {} ETH", address, balance);
        }
        Some(Commands::Address) => {
            println!("{}", relay.address());
        }
        Some(Commands::Balance { address }) => {
            let address = address.unwrap_or_else(|| relay.address());
            println!("{}", relay.get_balance(address).await?);
        }
        Some(Commands::Tx { hash }) => match relay.get_transaction(hash).await? {
            Some(tx) => println!("{}", serde_json::to_string_pretty(&tx)?),
            None => println!("Transaction {} not found", hash),
        },
        Some(Commands::Swap {
            from,
            to,
            amount,
            slippage,
        }) => {
            let from_token = config.tokens.resolve(&from)?;
            let to_token = config.tokens.resolve(&to)?;
            let slippage = slippage.unwrap_or(config.aggregator.default_slippage);
            let receipt = relay.swap_token(from_token, to_token, amount, slippage).await?;
            println!("{}", serde_json::to_string_pretty(&receipt)?);
        }
        Some(Commands::Stake { amount }) => {
            let receipt = relay.stake_eth_with_lido(&amount).await?;
            println!("{}", serde_json::to_string_pretty(&receipt)?);
        }
    }
    Ok(())
}
