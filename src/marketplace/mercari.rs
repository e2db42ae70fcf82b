use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::error::SearchError;
use crate::marketplace::normalizer::Normalizer;
use crate::marketplace::traits::MarketplaceClient;
use crate::marketplace::types::{RawPage, SortField, SortOrder};

/// Direct HTTP client for the Mercari search API
pub struct MercariClient {
    client: Client,
    api_base: String,
    normalizer: Normalizer,
}

/// Search API request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchBody<'a> {
    page_size: usize,
    page_token: &'a str,
    search_condition: SearchCondition<'a>,
    default_datasets: [&'static str; 1],
}

#[derive(Debug, Serialize)]
struct SearchCondition<'a> {
    keyword: &'a str,
    sort: &'static str,
    order: &'static str,
    status: Vec<&'static str>,
}

/// Search API response. Items stay untyped until normalization.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<Value>,
    #[serde(default)]
    meta: Option<SearchMeta>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchMeta {
    #[serde(default)]
    num_found: Option<Value>,
}

/// Item API response envelope
#[derive(Debug, Deserialize)]
struct ItemResponse {
    #[serde(default)]
    data: Option<Value>,
}

impl MercariClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        Self::with_timeout(&config.api_base, &config.item_base, config.timeout)
    }

    pub fn with_timeout(api_base: &str, item_base: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            normalizer: Normalizer::new(item_base),
        })
    }

    fn search_url(&self) -> String {
        format!("{}/v2/entities:search", self.api_base)
    }

    fn item_url(&self) -> String {
        format!("{}/items/get", self.api_base)
    }
}

/// numFound arrives as either a JSON number or a decimal string
fn parse_num_found(meta: Option<SearchMeta>) -> Option<u64> {
    match meta?.num_found? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[async_trait]
impl MarketplaceClient for MercariClient {
    async fn fetch(
        &self,
        query: &str,
        limit: usize,
        sort_field: SortField,
        sort_order: SortOrder,
    ) -> Result<RawPage, SearchError> {
        let body = SearchBody {
            page_size: limit,
            page_token: "",
            search_condition: SearchCondition {
                keyword: query,
                sort: sort_field.as_provider_str(),
                order: sort_order.as_provider_str(),
                status: Vec::new(),
            },
            default_datasets: ["DATASET_TYPE_MERCARI"],
        };

        let url = self.search_url();
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("X-Platform", "web")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            warn!("Mercari returned status: {}", status);
            return Err(SearchError::TransportFailure(format!(
                "search API returned status {}",
                status
            )));
        }

        let bytes = response.bytes().await?;
        debug!("Downloaded {} bytes of JSON", bytes.len());

        let parsed: SearchResponse = serde_json::from_slice(&bytes)?;
        let mut items = parsed.items;
        items.truncate(limit);

        Ok(RawPage {
            items,
            total_found: parse_num_found(parsed.meta),
        })
    }

    async fn fetch_item(&self, item_id: &str) -> Result<Value, SearchError> {
        let url = self.item_url();
        debug!("GET {}?id={}", url, item_id);

        let response = self
            .client
            .get(&url)
            .query(&[("id", item_id)])
            .header("X-Platform", "web")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            warn!("Mercari returned status: {}", status);
            return Err(SearchError::TransportFailure(format!(
                "item API returned status {}",
                status
            )));
        }

        let bytes = response.bytes().await?;
        let parsed: ItemResponse = serde_json::from_slice(&bytes)?;

        parsed.data.ok_or_else(|| {
            SearchError::TransportFailure("malformed payload: item response has no data".to_string())
        })
    }

    fn source_name(&self) -> &'static str {
        "Mercari"
    }

    fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListingStatus;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ITEM_BASE: &str = "https://jp.mercari.com/item";

    fn client_for(server: &MockServer, timeout: Duration) -> MercariClient {
        MercariClient::with_timeout(&server.uri(), ITEM_BASE, timeout).unwrap()
    }

    #[tokio::test]
    async fn test_successful_search_normalizes_items() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/entities:search"))
            .and(header("X-Platform", "web"))
            .and(body_partial_json(json!({
                "pageSize": 3,
                "searchCondition": {
                    "keyword": "ポケモンカード 025/165",
                    "sort": "SORT_CREATED_TIME",
                    "order": "ORDER_DESC"
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    { "id": "m1", "name": "a", "price": "1000", "status": "ITEM_STATUS_ON_SALE",
                      "thumbnails": ["https://img/1.jpg"], "created": "1700000000" },
                    { "id": "m2", "name": "b", "price": "2000", "status": "ITEM_STATUS_SOLD_OUT" },
                    { "id": "m3", "name": "c", "price": "-1" }
                ],
                "meta": { "numFound": "57" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        let result = client
            .search("ポケモンカード 025/165", 3, SortField::CreatedTime, SortOrder::Desc)
            .await;

        assert!(result.succeeded);
        assert!(result.error.is_none());
        assert_eq!(result.source, "Mercari");
        assert_eq!(result.total_found, 57);
        assert_eq!(result.listings.len(), 2);
        assert_eq!(result.listings[0].id(), "m1");
        assert_eq!(result.listings[1].status(), ListingStatus::Sold);
        assert_eq!(result.listings[1].detail_url(), "https://jp.mercari.com/item/m2");
    }

    #[tokio::test]
    async fn test_timeout_becomes_failed_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "items": [] }))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_millis(100));
        let result = client
            .search("q", 10, SortField::CreatedTime, SortOrder::Desc)
            .await;

        assert!(!result.succeeded);
        assert!(result.listings.is_empty());
        assert!(!result.error.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn test_non_success_status_becomes_failed_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        let result = client.search("q", 10, SortField::Price, SortOrder::Asc).await;

        assert!(!result.succeeded);
        assert!(result.error.unwrap().contains("403"));
    }

    #[tokio::test]
    async fn test_malformed_payload_becomes_failed_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        let result = client
            .search("q", 10, SortField::CreatedTime, SortOrder::Desc)
            .await;

        assert!(!result.succeeded);
        assert!(result.error.unwrap().contains("malformed payload"));
    }

    #[tokio::test]
    async fn test_connection_error_becomes_failed_result() {
        let client =
            MercariClient::with_timeout("http://127.0.0.1:1", ITEM_BASE, Duration::from_secs(2))
                .unwrap();
        let result = client
            .search("q", 10, SortField::CreatedTime, SortOrder::Desc)
            .await;

        assert!(!result.succeeded);
        assert!(result.listings.is_empty());
    }

    #[tokio::test]
    async fn test_item_details_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/items/get"))
            .and(query_param("id", "m42"))
            .and(header("X-Platform", "web"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": "OK",
                "data": {
                    "id": "m42",
                    "name": "リザードン",
                    "description": "初版",
                    "price": 15000,
                    "status": "on_sale",
                    "seller": { "id": 99, "name": "tcg_store" },
                    "photos": ["https://img/42-1.jpg", "https://img/42-2.jpg"]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        let result = client.item_details("m42").await;

        assert!(result.succeeded);
        let detail = result.detail.unwrap();
        assert_eq!(detail.name, "リザードン");
        assert_eq!(detail.description, "初版");
        assert_eq!(detail.price, 15000);
        assert_eq!(detail.status, ListingStatus::Active);
        assert_eq!(detail.seller.as_deref(), Some("tcg_store"));
        assert_eq!(detail.photos.len(), 2);
        assert_eq!(detail.url, "https://jp.mercari.com/item/m42");
    }

    #[tokio::test]
    async fn test_item_details_failures_become_failed_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("id", "gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("id", "empty"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "OK" })))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));

        let gone = client.item_details("gone").await;
        assert!(!gone.succeeded);
        assert!(gone.detail.is_none());
        assert!(gone.error.unwrap().contains("404"));

        let empty = client.item_details("empty").await;
        assert!(!empty.succeeded);
        assert!(empty.error.unwrap().contains("malformed payload"));
    }

    #[test]
    fn test_parse_num_found() {
        let meta = |v: Value| Some(SearchMeta { num_found: Some(v) });
        assert_eq!(parse_num_found(meta(json!(12))), Some(12));
        assert_eq!(parse_num_found(meta(json!("34"))), Some(34));
        assert_eq!(parse_num_found(meta(json!(null))), None);
        assert_eq!(parse_num_found(None), None);
    }
}
