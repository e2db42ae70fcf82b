use clap::ValueEnum;
use serde::Deserialize;
use serde_json::Value;

use crate::config::{DEFAULT_SEARCH_LIMIT, SEARCH_KEYWORD_PREFIX};
use crate::error::SearchError;

/// Field the provider orders its results by
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortField {
    CreatedTime,
    Price,
    Score,
    NumLikes,
}

impl SortField {
    pub fn as_provider_str(&self) -> &'static str {
        match self {
            SortField::CreatedTime => "SORT_CREATED_TIME",
            SortField::Price => "SORT_PRICE",
            SortField::Score => "SORT_SCORE",
            SortField::NumLikes => "SORT_NUM_LIKES",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortOrder {
    Desc,
    Asc,
}

impl SortOrder {
    pub fn as_provider_str(&self) -> &'static str {
        match self {
            SortOrder::Desc => "ORDER_DESC",
            SortOrder::Asc => "ORDER_ASC",
        }
    }
}

/// Compose the search keyword: `<prefix> <identifier>[ <qualifier>]`
pub fn build_query(identifier: &str, qualifier: Option<&str>) -> Result<String, SearchError> {
    let identifier = identifier.trim();
    if identifier.is_empty() {
        return Err(SearchError::InvalidRequest(
            "card identifier must not be empty".to_string(),
        ));
    }

    let mut query = format!("{} {}", SEARCH_KEYWORD_PREFIX, identifier);
    if let Some(qualifier) = qualifier.map(str::trim).filter(|q| !q.is_empty()) {
        query.push(' ');
        query.push_str(qualifier);
    }

    Ok(query)
}

/// Validated search parameters
#[derive(Debug, Clone)]
pub struct SearchRequest {
    identifier: String,
    qualifier: Option<String>,
    limit: usize,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
}

impl SearchRequest {
    pub fn new(identifier: &str, qualifier: Option<&str>) -> Result<Self, SearchError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(SearchError::InvalidRequest(
                "card identifier must not be empty".to_string(),
            ));
        }

        Ok(Self {
            identifier: identifier.to_string(),
            qualifier: qualifier
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string),
            limit: DEFAULT_SEARCH_LIMIT,
            sort_field: SortField::CreatedTime,
            sort_order: SortOrder::Desc,
        })
    }

    pub fn with_limit(mut self, limit: usize) -> Result<Self, SearchError> {
        if limit == 0 {
            return Err(SearchError::InvalidRequest(
                "result limit must be positive".to_string(),
            ));
        }
        self.limit = limit;
        Ok(self)
    }

    pub fn with_sort(mut self, field: SortField, order: SortOrder) -> Self {
        self.sort_field = field;
        self.sort_order = order;
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn query(&self) -> Result<String, SearchError> {
        build_query(&self.identifier, self.qualifier.as_deref())
    }
}

/// Untyped provider records plus the provider's hit count, if reported
#[derive(Debug, Clone, Default)]
pub struct RawPage {
    pub items: Vec<Value>,
    pub total_found: Option<u64>,
}

/// Provider record shape. Only `id` is typed; every other field stays a raw
/// value so an odd status or thumbnail never fails decoding of the record.
#[derive(Debug, Clone, Deserialize)]
pub struct RawItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub thumbnails: Option<Value>,
    #[serde(default)]
    pub created: Option<Value>,
}

impl RawItem {
    pub fn name(&self) -> String {
        self.name
            .as_ref()
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    /// `None` unless the provider sent a string
    pub fn status(&self) -> Option<&str> {
        self.status.as_ref().and_then(Value::as_str)
    }

    /// First string entry of `thumbnails`, or a bare string
    pub fn first_thumbnail(&self) -> Option<String> {
        match self.thumbnails.as_ref()? {
            Value::Array(entries) => entries.iter().find_map(Value::as_str).map(str::to_string),
            Value::String(url) => Some(url.clone()),
            _ => None,
        }
    }
}

/// Single-item record: the search fields plus description, seller and photos
#[derive(Debug, Clone, Deserialize)]
pub struct RawItemDetail {
    #[serde(flatten)]
    pub item: RawItem,
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub seller: Option<Value>,
    #[serde(default)]
    pub photos: Option<Value>,
}

impl RawItemDetail {
    pub fn description(&self) -> String {
        self.description
            .as_ref()
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    /// `seller.name`, or a bare string seller
    pub fn seller_name(&self) -> Option<String> {
        match self.seller.as_ref()? {
            Value::Object(seller) => seller.get("name")?.as_str().map(str::to_string),
            Value::String(name) => Some(name.clone()),
            _ => None,
        }
    }

    /// String entries of `photos`; non-strings are dropped
    pub fn photo_urls(&self) -> Vec<String> {
        match self.photos.as_ref() {
            Some(Value::Array(entries)) => entries
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query_with_and_without_qualifier() {
        assert_eq!(build_query("025/165", None).unwrap(), "ポケモンカード 025/165");
        assert_eq!(
            build_query(" 025/165 ", Some("ピカチュウ")).unwrap(),
            "ポケモンカード 025/165 ピカチュウ"
        );
        assert_eq!(build_query("SV-P-123", Some("  ")).unwrap(), "ポケモンカード SV-P-123");
    }

    #[test]
    fn test_build_query_is_deterministic() {
        let a = build_query("SV-P-123", Some("Pikachu")).unwrap();
        let b = build_query("SV-P-123", Some("Pikachu")).unwrap();
        assert_eq!(a, b);
        assert!(a.contains("SV-P-123"));
    }

    #[test]
    fn test_build_query_rejects_blank_identifier() {
        assert!(matches!(build_query("", None), Err(SearchError::InvalidRequest(_))));
        assert!(matches!(build_query("   ", Some("x")), Err(SearchError::InvalidRequest(_))));
    }

    #[test]
    fn test_search_request_validation() {
        assert!(SearchRequest::new("  ", None).is_err());

        let request = SearchRequest::new("025/165", Some("")).unwrap();
        assert_eq!(request.qualifier(), None);
        assert_eq!(request.limit(), DEFAULT_SEARCH_LIMIT);

        assert!(matches!(
            request.clone().with_limit(0),
            Err(SearchError::InvalidRequest(_))
        ));
        assert_eq!(request.with_limit(10).unwrap().limit(), 10);
    }

    #[test]
    fn test_raw_item_tolerates_missing_fields() {
        let item: RawItem = serde_json::from_value(serde_json::json!({ "id": "m1" })).unwrap();
        assert_eq!(item.id.as_deref(), Some("m1"));
        assert_eq!(item.first_thumbnail(), None);
        assert_eq!(item.status(), None);
        assert_eq!(item.name(), "");
    }

    #[test]
    fn test_raw_item_accepts_odd_field_types() {
        let item: RawItem = serde_json::from_value(serde_json::json!({
            "id": "m2",
            "name": 7,
            "status": 2,
            "thumbnails": [null, 3, "https://img/2.jpg"]
        }))
        .unwrap();
        assert_eq!(item.status(), None);
        assert_eq!(item.name(), "");
        assert_eq!(item.first_thumbnail().as_deref(), Some("https://img/2.jpg"));

        let item: RawItem =
            serde_json::from_value(serde_json::json!({ "id": "m3", "thumbnails": null })).unwrap();
        assert_eq!(item.first_thumbnail(), None);
    }

    #[test]
    fn test_raw_item_detail_helpers() {
        let detail: RawItemDetail = serde_json::from_value(serde_json::json!({
            "id": "m1",
            "price": 500,
            "description": "美品",
            "seller": { "id": 1, "name": "card_shop" },
            "photos": ["https://img/1.jpg", null, "https://img/2.jpg"]
        }))
        .unwrap();

        assert_eq!(detail.item.id.as_deref(), Some("m1"));
        assert_eq!(detail.description(), "美品");
        assert_eq!(detail.seller_name().as_deref(), Some("card_shop"));
        assert_eq!(detail.photo_urls(), vec!["https://img/1.jpg", "https://img/2.jpg"]);

        let bare: RawItemDetail =
            serde_json::from_value(serde_json::json!({ "id": "m2", "seller": 5 })).unwrap();
        assert_eq!(bare.seller_name(), None);
        assert!(bare.photo_urls().is_empty());
        assert_eq!(bare.description(), "");
    }
}
