use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

use crate::marketplace::types::{SortField, SortOrder};

/// Fixed keyword prefix scoping every search to trading cards
pub const SEARCH_KEYWORD_PREFIX: &str = "ポケモンカード";

pub const DEFAULT_API_BASE: &str = "https://api.mercari.jp";
pub const DEFAULT_ITEM_BASE: &str = "https://jp.mercari.com/item";
pub const DEFAULT_SEARCH_LIMIT: usize = 120;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const CURRENCY: &str = "¥";

/// Application configuration, defaults overridable from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base: String,
    pub item_base: String,
    pub default_limit: usize,
    pub timeout: Duration,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            item_base: DEFAULT_ITEM_BASE.to_string(),
            default_limit: DEFAULT_SEARCH_LIMIT,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            sort_field: SortField::CreatedTime,
            sort_order: SortOrder::Desc,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let defaults = Self::default();

        let default_limit = match env::var("PRICE_SCOUT_LIMIT") {
            Ok(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|limit| *limit > 0)
                .context("PRICE_SCOUT_LIMIT must be a positive number")?,
            Err(_) => defaults.default_limit,
        };

        let timeout = match env::var("PRICE_SCOUT_TIMEOUT_SECS") {
            Ok(raw) => Duration::from_secs(
                raw.parse()
                    .context("PRICE_SCOUT_TIMEOUT_SECS must be a valid number")?,
            ),
            Err(_) => defaults.timeout,
        };

        Ok(Self {
            api_base: env::var("PRICE_SCOUT_API_BASE").unwrap_or(defaults.api_base),
            item_base: env::var("PRICE_SCOUT_ITEM_BASE").unwrap_or(defaults.item_base),
            default_limit,
            timeout,
            ..defaults
        })
    }
}
