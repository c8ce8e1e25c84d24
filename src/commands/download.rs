//! Trade history download: walks the window page by page into a CSV file

use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use poloniex_public::poloniex::format_date;
use tracing::info;

use super::client;
use super::market::parse_window_bound;

pub fn run(
    config: Option<String>,
    pair: String,
    start: String,
    end: String,
    output: Option<PathBuf>,
) -> Result<()> {
    let client = client(config.as_deref())?;
    let output = output.unwrap_or_else(|| PathBuf::from(format!("{}_trades.csv", pair)));

    let pages = client
        .trade_history_pages(&pair, parse_window_bound(start), parse_window_bound(end))
        .context("Invalid trade history window")?;
    info!(
        "Downloading {} trades from {} to {}",
        pair,
        format_date(pages.start()),
        format_date(pages.cursor())
    );

    let file = File::create(&output)
        .with_context(|| format!("Failed to create output file {}", output.display()))?;
    let mut writer = csv::Writer::from_writer(file);

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} [{elapsed}] {pos} trades {msg}")
            .context("Invalid progress template")?,
    );
    pb.enable_steady_tick(Duration::from_millis(120));

    let mut page_count = 0usize;
    let mut trade_count = 0u64;
    for page in pages {
        let page = page.with_context(|| {
            format!("Trade history for {} failed after {} pages", pair, page_count)
        })?;
        for trade in &page {
            writer.serialize(trade)?;
        }
        page_count += 1;
        trade_count += page.len() as u64;
        pb.set_position(trade_count);
        if let Some(oldest) = page.last() {
            pb.set_message(format!("back to {}", oldest.date));
        }
    }
    writer.flush()?;
    pb.finish_with_message(format!("{} pages", page_count));

    info!(
        "Saved {} trades ({} pages) to {}",
        trade_count,
        page_count,
        output.display()
    );
    Ok(())
}
