//! Technical levels and DCF value for one ticker
//!
//! Uses Yahoo Finance for history, so no API key is needed.
//!
//! To run this example:
//! ```bash
//! cargo run --example analyze_ticker MSFT
//! ```

use stock_engine::{AnalysisParams, MarketData, PriceHistorySource, StockConfig, analyze};
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stock_utils::init_tracing();

    let symbol = env::args().nth(1).unwrap_or_else(|| "AAPL".to_string());

    println!("=== stockscope ===\n");
    println!("Analyzing: {symbol}\n");

    let config = StockConfig::builder().with_env_api_key().build()?;
    let market = MarketData::from_config(&config)?;

    let series = market.price_history(&symbol, 365).await.unwrap_or_empty();
    let Some(report) = analyze(&symbol, &series, &AnalysisParams::default()) else {
        println!("Price data unavailable. Check the ticker or your network.");
        return Ok(());
    };

    println!("Last price: {:.2} ({} bars)", report.last_price, series.len());
    if let Some(rsi) = report.rsi {
        println!("RSI(14): {rsi:.1} {}", report.rsi_zone().unwrap_or_default());
    }
    for level in report.fibonacci.iter() {
        println!("  Fib {:>6}: {:.2}", level.label, level.price);
    }
    println!(
        "Intrinsic value: {:.2} ({})\n",
        report.intrinsic_value(),
        report.verdict
    );

    for bullet in report.summary() {
        println!("- {bullet}");
    }

    Ok(())
}
