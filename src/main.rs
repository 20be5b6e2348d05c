use clap::{Parser, Subcommand};
use core_types::Account;
use engine::api::{CancelOrderResponse, ClosePositionResponse, PlaceOrderResponse};
use engine::{OrderRequest, TradeEngine};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Arc;
use store::MemoryStore;
use tracing_subscriber::EnvFilter;

/// The main entry point for the Meridian margin trading engine.
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Margin(args) => {
            if let Err(e) = handle_margin(args) {
                eprintln!("Error computing margin: {}", e);
            }
        }
        Commands::Demo => {
            if let Err(e) = handle_demo().await {
                eprintln!("Error running demo session: {}", e);
            }
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A margin-based order and position accounting engine.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Quote the margin requirement for a prospective trade.
    Margin(MarginArgs),
    /// Run a scripted trading session against the in-memory store.
    Demo,
}

#[derive(Parser)]
struct MarginArgs {
    /// The asset class (e.g. "FOREX"). Unknown classes are quoted under the
    /// conservative 10x fallback rule.
    #[arg(long)]
    asset_class: String,

    /// Number of units to trade.
    #[arg(long)]
    units: Decimal,

    /// Price per unit.
    #[arg(long)]
    price: Decimal,
}

// ==============================================================================
// Command Logic
// ==============================================================================

/// Computes and prints a margin breakdown without touching any state.
fn handle_margin(args: MarginArgs) -> anyhow::Result<()> {
    let breakdown = margin::calculate_margin_for_class_name(&args.asset_class, args.units, args.price)?;
    println!("{}", serde_json::to_string_pretty(&breakdown)?);
    Ok(())
}

/// Walks one account through the full order lifecycle: market open, entry
/// order and cancel, metrics, then close.
async fn handle_demo() -> anyhow::Result<()> {
    let config = configuration::load_config()?;

    let store = Arc::new(MemoryStore::new());
    store
        .seed_account(Account::new(
            "demo",
            config.account.initial_balance,
            config.account.margin_call_level,
        ))
        .await;
    let engine = TradeEngine::new(store);

    println!("--- Placing market order: buy 1000 EURUSD @ 1.1000 ---");
    let open = engine
        .place_order(
            "demo",
            OrderRequest {
                symbol: "EURUSD".to_string(),
                asset_class: core_types::AssetClass::Forex,
                order_type: core_types::OrderType::Market,
                side: core_types::OrderSide::Buy,
                units: dec!(1000),
                price: dec!(1.1000),
                stop_loss: Some(dec!(1.0800)),
                take_profit: None,
                expiration_date: None,
            },
        )
        .await;
    let opened_id = open.as_ref().ok().map(|receipt| receipt.order_id);
    println!(
        "{}",
        serde_json::to_string_pretty(&PlaceOrderResponse::from(open))?
    );

    println!("--- Placing limit order: buy 500 AAPL @ 180 ---");
    let entry = engine
        .place_order(
            "demo",
            OrderRequest {
                symbol: "AAPL".to_string(),
                asset_class: core_types::AssetClass::Stocks,
                order_type: core_types::OrderType::Limit,
                side: core_types::OrderSide::Buy,
                units: dec!(500),
                price: dec!(180),
                stop_loss: None,
                take_profit: None,
                expiration_date: None,
            },
        )
        .await;
    let entry_id = entry.as_ref().ok().map(|receipt| receipt.order_id);
    println!(
        "{}",
        serde_json::to_string_pretty(&PlaceOrderResponse::from(entry))?
    );

    if let Some(entry_id) = entry_id {
        println!("--- Cancelling the pending limit order ---");
        let cancel = engine.cancel_order("demo", entry_id).await;
        println!(
            "{}",
            serde_json::to_string_pretty(&CancelOrderResponse::from(cancel))?
        );
    }

    let prices = HashMap::from([("EURUSD".to_string(), dec!(1.1050))]);

    println!("--- Account metrics at EURUSD 1.1050 ---");
    let metrics = engine.account_metrics("demo", &prices).await?;
    println!("{}", serde_json::to_string_pretty(&metrics)?);

    println!("--- Open positions ---");
    let positions = engine.positions("demo", &prices).await?;
    println!("{}", serde_json::to_string_pretty(&positions)?);

    println!("--- Portfolio ledger ---");
    let ledger = engine.portfolio_ledger("demo", &prices).await?;
    println!("{}", serde_json::to_string_pretty(&ledger)?);

    if let Some(trade_id) = opened_id {
        println!("--- Closing the EURUSD position @ 1.1050 ---");
        let close = engine.close_position("demo", trade_id, dec!(1.1050)).await;
        println!(
            "{}",
            serde_json::to_string_pretty(&ClosePositionResponse::from(close))?
        );
    }

    println!("--- Final metrics ---");
    let metrics = engine.account_metrics("demo", &HashMap::new()).await?;
    println!("{}", serde_json::to_string_pretty(&metrics)?);

    println!("--- Trade history ---");
    for trade in engine.trade_history("demo").await? {
        println!(
            "{} {} {} {} @ {} (notional {}) [{}] pnl={}",
            trade.id,
            trade.side,
            trade.units,
            trade.symbol,
            trade.price_per_unit,
            trade.total_amount(),
            trade.status,
            trade
                .pnl
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string()),
        );
    }

    Ok(())
}
