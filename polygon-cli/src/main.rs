//! Polygon CLI
//!
//! Connects to the configured node and runs a single command. Settings come
//! from `.env`, the process environment, or `--config`; the signing key is
//! only ever read from `PRIVATE_KEY` or `--private-key`.

mod cli;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Command};
use polygon_sdk::{PolAmount, PolygonClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = cli.client_config()?;
    let client = PolygonClient::from_config(config)
        .log_dispatch(log_dispatch(cli.verbose))
        .connect()
        .await?;

    match cli.command {
        Command::Block { id } => {
            let block = client.get_block(id).await?;
            println!("{}", serde_json::to_string_pretty(&block)?);
        }
        Command::Tx { hash } => {
            let tx = client.get_transaction(&hash).await?;
            println!("{}", serde_json::to_string_pretty(&tx)?);
        }
        Command::Balance { address } => {
            let balance = PolAmount::from_wei(client.get_balance(&address).await?);
            println!("{} ({} wei)", balance, balance.wei());
        }
        Command::Send {
            to,
            amount,
            private_key,
        } => {
            let amount = PolAmount::from_pol(&amount)?;
            let tx_hash = client
                .send_transaction(&private_key, &to, amount.wei())
                .await?;
            println!("{tx_hash}");
        }
        Command::Call {
            contract,
            abi,
            function,
            args,
        } => {
            let abi = read_abi(&abi)?;
            let values = client
                .call_contract_function(&contract, &abi, &function, &args)
                .await?;
            for value in values {
                println!("{value:?}");
            }
        }
        Command::Invoke {
            contract,
            abi,
            function,
            args,
            private_key,
        } => {
            let abi = read_abi(&abi)?;
            let tx_hash = client
                .send_contract_transaction(&private_key, &contract, &abi, &function, &args)
                .await?;
            println!("{tx_hash}");
        }
        Command::Erc20Balance { token, wallet } => {
            let balance = client.get_erc20_balance(&token, &wallet).await?;
            println!("{balance}");
        }
    }

    Ok(())
}

fn read_abi(path: &std::path::Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading ABI from {}", path.display()))
}

/// Builds the log sink handed to the client. Logs go to stderr so command
/// output on stdout stays machine-readable.
fn log_dispatch(verbose: bool) -> tracing::Dispatch {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::Dispatch::new(subscriber)
}
