use std::path::PathBuf;

use alloy_primitives::U256;
use clap::Parser;
use eyre::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;

use config::EstimatorConfig;
use drips_account_sync::{AccountEstimator, SubgraphClient, SubgraphClientConfig};
use drips_common::error::DripsError;
use drips_common::network::{network_config, NetworkConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Drips user id (decimal or 0x-prefixed hex uint256)
    #[arg(long)]
    user_id: String,

    /// Chain id of the network to query
    #[arg(long, default_value_t = 1)]
    chain_id: u64,

    /// Path to configuration file
    #[arg(long, default_value = "./configs/estimator.json")]
    config_path: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let user_id = parse_user_id(&cli.user_id)?;
    let network = network_config(cli.chain_id)?;

    let config_path = PathBuf::from(&cli.config_path);
    let config = if config_path.exists() {
        EstimatorConfig::load_from_file(&config_path).await?
    } else {
        tracing::warn!(path = %config_path.display(), "Config not found, using defaults");
        EstimatorConfig::default()
    };

    let url = config
        .subgraph
        .url
        .clone()
        .unwrap_or_else(|| network.subgraph_url.to_string());
    tracing::info!(user = %user_id, network = network.name, subgraph = %url, "Starting estimation");

    let client = SubgraphClient::new(SubgraphClientConfig {
        url,
        timeout_secs: config.subgraph.timeout_secs,
        retry_attempts: config.subgraph.retry_attempts,
    });
    let estimator = AccountEstimator::new(client, user_id, cli.chain_id)?;

    estimator.refresh().await?;
    let estimate = estimator.estimate(&[])?;

    if let Some(when) = chrono::DateTime::from_timestamp(estimate.timestamp as i64, 0) {
        tracing::info!(at = %when, assets = estimate.assets.len(), "Estimate complete");
    }

    if estimate.assets.is_empty() {
        println!("No drips history found for user {}", estimate.user_id);
        return Ok(());
    }

    for asset in &estimate.assets {
        println!("Token {}", asset.token_address);
        println!(
            "  receivable: {} ({} active streams)",
            format_amount(asset.receivable_amount, network),
            asset.total_streams_count
        );
        if let Some(remaining) = asset.remaining_balance {
            println!("  outgoing balance left: {}", format_amount(remaining, network));
        }
        for stream in &asset.incoming_streams {
            println!(
                "  from {}: {} accrued at {}/s",
                stream.sender_user_id,
                format_amount(stream.estimated_amount, network),
                format_amount(stream.amount_per_sec, network),
            );
        }
    }

    Ok(())
}

fn parse_user_id(raw: &str) -> Result<U256> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DripsError::MissingArgument { name: "user_id" }.into());
    }
    let parsed = match trimmed.strip_prefix("0x") {
        Some(hex) => U256::from_str_radix(hex, 16),
        None => U256::from_str_radix(trimmed, 10),
    };
    parsed.map_err(|e| {
        DripsError::InvalidArgument {
            reason: format!("user id '{}' is not a valid uint256: {}", raw, e),
        }
        .into()
    })
}

/// Render a multiplier-scaled amount as a decimal token quantity.
fn format_amount(scaled: U256, network: &NetworkConfig) -> String {
    let multiplier = network.multiplier();
    let integral = scaled / multiplier;
    let fraction = scaled % multiplier;

    let decimals = network.amt_per_sec_multiplier.ilog10() as usize;
    let padded = format!("{:0>decimals$}", fraction.to_string());
    let trimmed = padded.trim_end_matches('0');
    if trimmed.is_empty() {
        format!("{}", integral)
    } else {
        format!("{}.{}", integral, trimmed)
    }
}
