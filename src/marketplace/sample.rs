use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use tracing::info;

use crate::error::SearchError;
use crate::marketplace::normalizer::Normalizer;
use crate::marketplace::traits::MarketplaceClient;
use crate::marketplace::types::{RawPage, SortField, SortOrder};

const SAMPLE_IMAGES: [&str; 3] = [
    "https://images.pokemontcg.io/base1/4_hires.png",
    "https://images.pokemontcg.io/base1/1_hires.png",
    "https://images.pokemontcg.io/base1/2_hires.png",
];

/// Offline provider producing synthetic listings for demos and testing
pub struct SampleClient {
    seed: Option<u64>,
    normalizer: Normalizer,
}

impl SampleClient {
    pub fn new(item_base: &str) -> Self {
        Self {
            seed: None,
            normalizer: Normalizer::new(item_base),
        }
    }

    /// Same seed and query always yield the same records
    pub fn with_seed(item_base: &str, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            normalizer: Normalizer::new(item_base),
        }
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Pikachu or card number 025 anywhere in the query doubles the base price
    fn base_price(query: &str) -> f64 {
        let lowered = query.to_lowercase();
        if lowered.contains("pikachu") || lowered.contains("025") {
            2000.0
        } else {
            1000.0
        }
    }

    fn generate(&self, query: &str, limit: usize) -> Vec<Value> {
        let mut rng = self.rng();
        let base_price = Self::base_price(query);

        let count = rng.gen_range(30..=80).min(limit);
        let now = Utc::now();

        (0..count)
            .map(|i| {
                let price = (base_price * rng.gen_range(0.5..2.0)) as u64;
                let status = if rng.gen_bool(0.3) { "sold_out" } else { "on_sale" };
                let image = SAMPLE_IMAGES.choose(&mut rng).copied().unwrap_or_default();
                let created = now - ChronoDuration::minutes(rng.gen_range(0..60 * 24 * 14));

                json!({
                    "id": format!("m{}", rng.gen_range(10_000_000_000u64..100_000_000_000)),
                    "name": format!("{} #{}", query, i + 1),
                    "price": price,
                    "status": status,
                    "thumbnails": [image],
                    "created": created.timestamp(),
                })
            })
            .collect()
    }

    fn generate_item(&self, item_id: &str) -> Value {
        let mut rng = self.rng();
        let photo_count = rng.gen_range(1..=SAMPLE_IMAGES.len());
        let photos: Vec<&str> = SAMPLE_IMAGES
            .choose_multiple(&mut rng, photo_count)
            .copied()
            .collect();

        json!({
            "id": item_id,
            "name": format!("Sample card {}", item_id),
            "description": "Sample listing generated offline.",
            "price": (1000.0 * rng.gen_range(0.5..2.0)) as u64,
            "status": if rng.gen_bool(0.3) { "sold_out" } else { "on_sale" },
            "seller": { "name": "sample_seller" },
            "photos": photos,
        })
    }
}

#[async_trait]
impl MarketplaceClient for SampleClient {
    async fn fetch(
        &self,
        query: &str,
        limit: usize,
        _sort_field: SortField,
        _sort_order: SortOrder,
    ) -> Result<RawPage, SearchError> {
        info!("📋 Generating sample listings for \"{}\"", query);
        let items = self.generate(query, limit);

        Ok(RawPage {
            total_found: Some(items.len() as u64),
            items,
        })
    }

    async fn fetch_item(&self, item_id: &str) -> Result<Value, SearchError> {
        info!("📋 Generating sample item {}", item_id);
        Ok(self.generate_item(item_id))
    }

    fn source_name(&self) -> &'static str {
        "Sample"
    }

    fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }
}
