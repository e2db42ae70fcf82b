use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::SearchError;
use crate::marketplace::types::{RawItem, RawItemDetail};
use crate::models::{item_url, ItemDetail, Listing, ListingStatus};

/// Maps raw provider records into listings. A bad record is skipped on its
/// own and the rest of the page survives.
pub struct Normalizer {
    item_base: String,
}

impl Normalizer {
    pub fn new(item_base: impl Into<String>) -> Self {
        Self {
            item_base: item_base.into(),
        }
    }

    pub fn normalize(&self, records: Vec<Value>) -> Vec<Listing> {
        let total = records.len();
        let mut listings = Vec::with_capacity(total);

        for (index, record) in records.into_iter().enumerate() {
            match self.normalize_record(record) {
                Ok(listing) => listings.push(listing),
                Err(err) => warn!("Record {} of {}: {}", index, total, err),
            }
        }

        let skipped = total - listings.len();
        if skipped > 0 {
            debug!("Normalized {} records, skipped {}", listings.len(), skipped);
        }

        listings
    }

    pub fn normalize_record(&self, record: Value) -> Result<Listing, SearchError> {
        let item: RawItem = serde_json::from_value(record)
            .map_err(|e| SearchError::RecordSkipped(format!("unreadable record: {}", e)))?;
        let (id, price) = id_and_price(&item)?;

        Listing::new(
            id,
            item.name(),
            price,
            ListingStatus::from_provider(item.status()),
            item.first_thumbnail(),
            &self.item_base,
            item.created.as_ref().and_then(parse_created),
        )
    }

    /// Same id and price rules as search records
    pub fn normalize_detail(&self, record: Value) -> Result<ItemDetail, SearchError> {
        let detail: RawItemDetail = serde_json::from_value(record)
            .map_err(|e| SearchError::RecordSkipped(format!("unreadable item: {}", e)))?;
        let (id, price) = id_and_price(&detail.item)?;

        Ok(ItemDetail {
            url: item_url(&self.item_base, &id),
            name: detail.item.name(),
            description: detail.description(),
            price,
            status: ListingStatus::from_provider(detail.item.status()),
            seller: detail.seller_name(),
            photos: detail.photo_urls(),
            id,
        })
    }
}

fn id_and_price(item: &RawItem) -> Result<(String, u64), SearchError> {
    let id = item
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| SearchError::RecordSkipped("missing id".to_string()))?
        .to_string();

    let price = match item.price.as_ref() {
        Some(raw) => coerce_price(raw)
            .map_err(|reason| SearchError::RecordSkipped(format!("item {}: {}", id, reason)))?,
        None => {
            return Err(SearchError::RecordSkipped(format!(
                "item {}: missing price",
                id
            )))
        }
    };

    Ok((id, price))
}

/// Accepts integers, integral floats and numeric strings. Negatives rejected.
fn coerce_price(raw: &Value) -> Result<u64, String> {
    match raw {
        Value::Number(n) => {
            if let Some(p) = n.as_u64() {
                Ok(p)
            } else if let Some(p) = n.as_i64() {
                Err(format!("negative price {}", p))
            } else {
                match n.as_f64() {
                    Some(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 => Ok(f as u64),
                    Some(f) if f < 0.0 => Err(format!("negative price {}", f)),
                    _ => Err(format!("non-integer price {}", n)),
                }
            }
        }
        Value::String(s) => match s.trim().parse::<i64>() {
            Ok(p) if p >= 0 => Ok(p as u64),
            Ok(p) => Err(format!("negative price {}", p)),
            Err(_) => Err(format!("non-numeric price {:?}", s)),
        },
        other => Err(format!("non-numeric price {}", other)),
    }
}

/// Unix seconds (number or numeric string) or an RFC 3339 string
fn parse_created(raw: &Value) -> Option<DateTime<Utc>> {
    let seconds = match raw {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => match s.trim().parse::<i64>() {
            Ok(secs) => Some(secs),
            Err(_) => {
                return DateTime::parse_from_rfc3339(s.trim())
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc))
            }
        },
        _ => None,
    }?;

    Utc.timestamp_opt(seconds, 0).single()
}
