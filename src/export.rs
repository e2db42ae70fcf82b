use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::analysis::PriceStatistics;
use crate::config::CURRENCY;
use crate::models::{Listing, SearchResult};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// `¥1,234` with thousands separators, `-` when absent
pub fn format_price(price: Option<f64>) -> String {
    let Some(price) = price else {
        return "-".to_string();
    };

    let whole = price.trunc() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if whole < 0 { "-" } else { "" };
    format!("{}{}{}", sign, CURRENCY, grouped)
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    item_id: &'a str,
    name: &'a str,
    price: u64,
    status: &'static str,
    thumbnail: &'a str,
    url: &'a str,
    created_at: String,
}

impl<'a> From<&'a Listing> for CsvRow<'a> {
    fn from(listing: &'a Listing) -> Self {
        Self {
            item_id: listing.id(),
            name: listing.title(),
            price: listing.price(),
            status: listing.status().as_str(),
            thumbnail: listing.thumbnail_url().unwrap_or_default(),
            url: listing.detail_url(),
            created_at: listing
                .created_at()
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
        }
    }
}

/// Write listings as BOM-prefixed UTF-8 CSV
pub fn write_listings_csv<W: Write>(mut writer: W, listings: &[&Listing]) -> Result<()> {
    writer.write_all(UTF8_BOM).context("Failed to write CSV header")?;

    let mut csv_writer = csv::Writer::from_writer(writer);
    for listing in listings {
        csv_writer
            .serialize(CsvRow::from(*listing))
            .with_context(|| format!("Failed to write CSV row for {}", listing.id()))?;
    }
    csv_writer.flush().context("Failed to flush CSV output")?;

    Ok(())
}

/// `pokemon_<identifier>_<YYYYMMDD>.csv` with path-unsafe characters replaced
pub fn default_csv_filename(identifier: &str, date: DateTime<Utc>) -> String {
    let safe: String = identifier
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect();
    format!("pokemon_{}_{}.csv", safe, date.format("%Y%m%d"))
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    result: &'a SearchResult,
    statistics: &'a PriceStatistics,
}

pub async fn write_json_report(
    path: &Path,
    result: &SearchResult,
    statistics: &PriceStatistics,
) -> Result<()> {
    let json = serde_json::to_string_pretty(&JsonReport { result, statistics })?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
