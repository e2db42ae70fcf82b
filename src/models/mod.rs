use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::SearchError;

/// Availability of a listing on the marketplace
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Active,
    Sold,
}

impl ListingStatus {
    /// Map a provider status string. Anything not recognised as sold is active.
    pub fn from_provider(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()) {
            Some(s) if s == "sold_out" || s == "item_status_sold_out" => ListingStatus::Sold,
            _ => ListingStatus::Active,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Active => "on_sale",
            ListingStatus::Sold => "sold_out",
        }
    }
}

/// `<item_base>/<id>`
pub fn item_url(item_base: &str, id: &str) -> String {
    format!("{}/{}", item_base.trim_end_matches('/'), id)
}

/// Normalized marketplace item
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Listing {
    id: String,
    title: String,
    /// Smallest currency unit (yen)
    price: u64,
    status: ListingStatus,
    thumbnail_url: Option<String>,
    detail_url: String,
    created_at: Option<DateTime<Utc>>,
}

impl Listing {
    /// Build a listing. The detail URL is always `<item_base>/<id>`.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        price: u64,
        status: ListingStatus,
        thumbnail_url: Option<String>,
        item_base: &str,
        created_at: Option<DateTime<Utc>>,
    ) -> Result<Self, SearchError> {
        let id = id.into().trim().to_string();
        if id.is_empty() {
            return Err(SearchError::RecordSkipped("listing id is empty".to_string()));
        }

        let detail_url = item_url(item_base, &id);
        let thumbnail_url = thumbnail_url.filter(|url| !url.trim().is_empty());

        Ok(Self {
            id,
            title: title.into(),
            price,
            status,
            thumbnail_url,
            detail_url,
            created_at,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn price(&self) -> u64 {
        self.price
    }

    pub fn status(&self) -> ListingStatus {
        self.status
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnail_url.as_deref()
    }

    pub fn detail_url(&self) -> &str {
        &self.detail_url
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

/// Outcome of one search round trip
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub query: String,
    pub source: String,
    /// Provider return order, never re-sorted
    pub listings: Vec<Listing>,
    /// Hit count reported by the provider, falls back to the listing count
    pub total_found: u64,
    pub succeeded: bool,
    pub error: Option<String>,
}

impl SearchResult {
    pub fn success(
        query: impl Into<String>,
        source: impl Into<String>,
        listings: Vec<Listing>,
        total_found: Option<u64>,
    ) -> Self {
        let total_found = total_found.unwrap_or(listings.len() as u64);
        Self {
            query: query.into(),
            source: source.into(),
            listings,
            total_found,
            succeeded: true,
            error: None,
        }
    }

    pub fn failure(
        query: impl Into<String>,
        source: impl Into<String>,
        error: &SearchError,
    ) -> Self {
        Self {
            query: query.into(),
            source: source.into(),
            listings: Vec::new(),
            total_found: 0,
            succeeded: false,
            error: Some(error.to_string()),
        }
    }
}

/// Full record for a single item
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ItemDetail {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: u64,
    pub status: ListingStatus,
    pub seller: Option<String>,
    pub photos: Vec<String>,
    pub url: String,
}

/// Outcome of one item lookup, shaped like `SearchResult`
#[derive(Debug, Clone, Serialize)]
pub struct ItemDetailResult {
    pub item_id: String,
    pub source: String,
    pub detail: Option<ItemDetail>,
    pub succeeded: bool,
    pub error: Option<String>,
}

impl ItemDetailResult {
    pub fn success(source: impl Into<String>, detail: ItemDetail) -> Self {
        Self {
            item_id: detail.id.clone(),
            source: source.into(),
            detail: Some(detail),
            succeeded: true,
            error: None,
        }
    }

    pub fn failure(
        item_id: impl Into<String>,
        source: impl Into<String>,
        error: &SearchError,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            source: source.into(),
            detail: None,
            succeeded: false,
            error: Some(error.to_string()),
        }
    }
}
