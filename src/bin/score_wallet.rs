//! Score Wallet - score wallets from JSON snapshots
//!
//! Loads the weight table, wallet snapshots and price observations named by
//! `ScoringConfig`, scores every address given on the command line and prints
//! one JSON document per wallet on stdout.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin score_wallet -- <ADDRESS> [<ADDRESS> ...] [--variant full|basic]
//! ```
//!
//! ## Environment Variables
//!
//! - `WALLETSCORE_WEIGHTS_PATH` - Weight table (default: config/weights.json)
//! - `WALLETSCORE_WALLETS_PATH` - Wallet snapshots (default: data/wallets.json)
//! - `WALLETSCORE_PRICES_PATH` - Price observations (default: data/prices.json)
//! - `RUST_LOG` - Log level (default: info)
//!
//! Ctrl-C cancels scoring that is still in flight.

use dotenv::dotenv;
use log::{error, info, warn};
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use walletscore::pipeline::{JsonAccountSource, JsonPriceFeed, ScoringConfig, ScoringEngine};
use walletscore::scoring_core::{
    self, BasicWalletStatistics, StatsVariant, WalletStats, WeightTable,
};

struct CliArgs {
    addresses: Vec<String>,
    variant: StatsVariant,
}

impl CliArgs {
    fn parse() -> Result<Self, Box<dyn std::error::Error>> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut addresses = Vec::new();
        let mut variant = StatsVariant::Full;

        let mut iter = args.into_iter();
        while let Some(arg) = iter.next() {
            if arg == "--variant" {
                variant = match iter.next().as_deref() {
                    Some("full") => StatsVariant::Full,
                    Some("basic") => StatsVariant::Basic,
                    other => return Err(format!("Unknown variant {:?} (expected full|basic)", other).into()),
                };
            } else {
                addresses.push(arg);
            }
        }

        if addresses.is_empty() {
            return Err("Usage: score_wallet <ADDRESS> [<ADDRESS> ...] [--variant full|basic]".into());
        }

        Ok(Self { addresses, variant })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let args = CliArgs::parse()?;
    let config = ScoringConfig::from_env();

    info!("🚀 Score Wallet");
    info!("   ├─ Chain: {}", config.chain_prefix);
    info!("   ├─ Weights: {}", config.weights_path);
    info!("   ├─ Wallets: {}", config.wallets_path);
    info!("   ├─ Prices: {}", config.prices_path);
    info!("   └─ Variant: {:?}", args.variant);

    let weights = Arc::new(WeightTable::load(&config.weights_path)?);
    let source = JsonAccountSource::load(&config.wallets_path)?;
    let prices = JsonPriceFeed::load(&config.prices_path)?;
    let engine = Arc::new(ScoringEngine::new(source, prices, config));

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("⚠️  Interrupted, cancelling in-flight scoring");
            ctrl_c_cancel.cancel();
        }
    });

    let results = engine
        .score_many(&args.addresses, Arc::clone(&weights), cancel)
        .await;

    let mut failures = 0;
    for (address, result) in args.addresses.iter().zip(results) {
        let scored = match result {
            Ok(scored) => scored,
            Err(e) => {
                error!("❌ {}: {}", address, e);
                failures += 1;
                continue;
            }
        };

        let document = match args.variant {
            StatsVariant::Full => json!({
                "address": scored.address,
                "variant": "full",
                "stats": scored.stats,
                "score": scored.score,
                "statsDescriptions": scored.stats.descriptors(),
            }),
            StatsVariant::Basic => {
                let basic = BasicWalletStatistics::from(scored.stats);
                let score = scoring_core::score(&basic, &weights)?;
                json!({
                    "address": scored.address,
                    "variant": "basic",
                    "stats": basic,
                    "score": score,
                    "statsDescriptions": basic.descriptors(),
                })
            }
        };
        println!("{}", serde_json::to_string_pretty(&document)?);
    }

    info!(
        "✅ Scored {}/{} wallets",
        args.addresses.len() - failures,
        args.addresses.len()
    );

    if failures > 0 {
        return Err(format!("{} wallet(s) failed to score", failures).into());
    }
    Ok(())
}
