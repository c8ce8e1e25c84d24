//! One-shot market data commands: fetch, then print JSON or write CSV

use std::collections::BTreeMap;
use std::fs::File;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use poloniex_public::poloniex::{format_date, DateInput};
use tracing::info;

use super::{client, print_json};

pub fn ticker(config: Option<String>, pair: Option<String>) -> Result<()> {
    let client = client(config.as_deref())?;
    let tickers = client.tickers().context("Failed to fetch tickers")?;
    info!("Fetched {} tickers", tickers.len());

    match pair {
        Some(pair) => {
            let ticker = tickers
                .get(&pair)
                .with_context(|| format!("Unknown currency pair: {}", pair))?;
            print_json(ticker)
        }
        // BTreeMap for stable output order
        None => print_json(&tickers.into_iter().collect::<BTreeMap<_, _>>()),
    }
}

pub fn volume(config: Option<String>) -> Result<()> {
    let client = client(config.as_deref())?;
    let volume = client.volume_24h().context("Failed to fetch 24h volume")?;
    print_json(&volume.into_iter().collect::<BTreeMap<_, _>>())
}

pub fn currencies(config: Option<String>) -> Result<()> {
    let client = client(config.as_deref())?;
    let currencies = client.currencies().context("Failed to fetch currencies")?;
    info!("Fetched {} currencies", currencies.len());
    print_json(&currencies.into_iter().collect::<BTreeMap<_, _>>())
}

pub fn price(config: Option<String>, symbol: String) -> Result<()> {
    let client = client(config.as_deref())?;
    let price = client
        .price(&symbol)
        .with_context(|| format!("Failed to fetch price for {}", symbol))?;
    print_json(&price)
}

pub fn order_book(
    config: Option<String>,
    market: String,
    legacy: bool,
    depth: u32,
    scale: i32,
    limit: u32,
) -> Result<()> {
    let client = client(config.as_deref())?;
    let result = if legacy {
        client.order_book(&market, depth)
    } else {
        client.market_order_book(&market, scale, limit)
    };
    let book = result.with_context(|| format!("Failed to fetch order book for {}", market))?;

    println!("\n{}", "=".repeat(40));
    println!("ORDER BOOK {}", market);
    println!("{}", "=".repeat(40));
    println!("{:>18} {:>18}", "ASK", "QTY");
    for level in book.sorted_asks().iter().rev() {
        println!("{:>18} {:>18}", level.price, level.quantity);
    }
    println!("{}", "-".repeat(40));
    for level in book.sorted_bids() {
        println!("{:>18} {:>18}", level.price, level.quantity);
    }
    println!("{:>18} {:>18}", "BID", "QTY");
    if let Some(spread) = book.spread() {
        println!("Spread: {}", spread);
    }
    Ok(())
}

pub fn trades(config: Option<String>, symbol: String, limit: u32) -> Result<()> {
    let client = client(config.as_deref())?;
    let trades = client
        .trades(&symbol, limit)
        .with_context(|| format!("Failed to fetch trades for {}", symbol))?;
    info!("Fetched {} trades for {}", trades.len(), symbol);
    print_json(&trades)
}

pub fn chart(
    config: Option<String>,
    pair: String,
    period: u32,
    start: String,
    end: String,
) -> Result<()> {
    let client = client(config.as_deref())?;
    let bars = client
        .chart_data(&pair, period, parse_window_bound(start), parse_window_bound(end))
        .with_context(|| format!("Failed to fetch chart data for {}", pair))?;
    info!("Fetched {} bars for {}", bars.len(), pair);
    print_json(&bars)
}

pub fn candles(
    config: Option<String>,
    symbol: String,
    interval: String,
    limit: u32,
    start: Option<String>,
    end: Option<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    let client = client(config.as_deref())?;
    let table = client
        .candles(
            &symbol,
            &interval,
            limit,
            start.map(parse_window_bound),
            end.map(parse_window_bound),
        )
        .with_context(|| format!("Failed to fetch {} candles for {}", interval, symbol))?;

    if let Some((min, max)) = table.start_time_range() {
        info!(
            "{} candles from {} to {}",
            table.len(),
            format_date(min.div_euclid(1000)),
            format_date(max.div_euclid(1000))
        );
    }

    match output {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            table.write_csv(file).context("Failed to write candles CSV")?;
            info!("Saved {} rows to {}", table.len(), path.display());
        }
        None => table
            .write_csv(io::stdout().lock())
            .context("Failed to write candles CSV")?,
    }
    Ok(())
}

/// Numeric arguments are taken as epoch values, anything else as a date string
pub fn parse_window_bound(value: String) -> DateInput {
    match value.trim().parse::<i64>() {
        Ok(epoch) => DateInput::Epoch(epoch),
        Err(_) => DateInput::Text(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_bound_parsing() {
        assert_eq!(
            parse_window_bound("1609459200".to_string()),
            DateInput::Epoch(1_609_459_200)
        );
        assert_eq!(
            parse_window_bound("2021-01-01 00:00:00".to_string()),
            DateInput::Text("2021-01-01 00:00:00".to_string())
        );
    }
}
