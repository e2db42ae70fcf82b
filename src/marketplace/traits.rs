use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::SearchError;
use crate::marketplace::normalizer::Normalizer;
use crate::marketplace::types::{RawPage, SearchRequest, SortField, SortOrder};
use crate::models::{ItemDetailResult, SearchResult};

/// Common trait for all marketplace search providers.
/// Implementations are interchangeable: live HTTP, sample data, test doubles.
#[async_trait]
pub trait MarketplaceClient: Send + Sync {
    /// One bounded round trip returning raw provider records
    async fn fetch(
        &self,
        query: &str,
        limit: usize,
        sort_field: SortField,
        sort_order: SortOrder,
    ) -> Result<RawPage, SearchError>;

    /// One bounded round trip returning the raw record for a single item
    async fn fetch_item(&self, item_id: &str) -> Result<Value, SearchError>;

    /// Get the name of the provider
    fn source_name(&self) -> &'static str;

    /// Normalizer used for this provider's records
    fn normalizer(&self) -> &Normalizer;

    /// Fetch and normalize. Never fails: transport errors become a failed result.
    async fn search(
        &self,
        query: &str,
        limit: usize,
        sort_field: SortField,
        sort_order: SortOrder,
    ) -> SearchResult {
        info!("Searching {} for \"{}\" (limit {})", self.source_name(), query, limit);

        match self.fetch(query, limit, sort_field, sort_order).await {
            Ok(page) => {
                let listings = self.normalizer().normalize(page.items);
                info!("{} returned {} listings", self.source_name(), listings.len());
                SearchResult::success(query, self.source_name(), listings, page.total_found)
            }
            Err(err) => {
                warn!("{} search failed: {}", self.source_name(), err);
                SearchResult::failure(query, self.source_name(), &err)
            }
        }
    }

    /// Look up one item. Never fails: every error becomes a failed result.
    async fn item_details(&self, item_id: &str) -> ItemDetailResult {
        let item_id = item_id.trim();
        if item_id.is_empty() {
            let err = SearchError::InvalidRequest("item id must not be empty".to_string());
            return ItemDetailResult::failure(item_id, self.source_name(), &err);
        }

        info!("Fetching item {} from {}", item_id, self.source_name());

        let outcome = match self.fetch_item(item_id).await {
            Ok(record) => self.normalizer().normalize_detail(record),
            Err(err) => Err(err),
        };

        match outcome {
            Ok(detail) => ItemDetailResult::success(self.source_name(), detail),
            Err(err) => {
                warn!("{} item lookup failed: {}", self.source_name(), err);
                ItemDetailResult::failure(item_id, self.source_name(), &err)
            }
        }
    }
}

/// Build the query for `request` and run it against `client`
pub async fn run_search(
    client: &dyn MarketplaceClient,
    request: &SearchRequest,
) -> Result<SearchResult, SearchError> {
    let query = request.query()?;
    Ok(client
        .search(&query, request.limit(), request.sort_field, request.sort_order)
        .await)
}
