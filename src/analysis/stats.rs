use serde::Serialize;

use crate::models::{Listing, ListingStatus};

/// Price summary over a listing set. Numeric fields are `None` for an empty set.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PriceStatistics {
    pub total: usize,
    pub active_count: usize,
    pub sold_count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub min: Option<u64>,
    pub max: Option<u64>,
    /// Ascending
    pub active_prices: Vec<u64>,
    /// Ascending
    pub sold_prices: Vec<u64>,
}

impl PriceStatistics {
    /// Active and sold prices merged, ascending
    pub fn all_prices(&self) -> Vec<u64> {
        let mut all: Vec<u64> = self
            .active_prices
            .iter()
            .chain(&self.sold_prices)
            .copied()
            .collect();
        all.sort_unstable();
        all
    }
}

pub fn compute_statistics<'a, I>(listings: I) -> PriceStatistics
where
    I: IntoIterator<Item = &'a Listing>,
{
    let mut active_prices = Vec::new();
    let mut sold_prices = Vec::new();

    for listing in listings {
        match listing.status() {
            ListingStatus::Active => active_prices.push(listing.price()),
            ListingStatus::Sold => sold_prices.push(listing.price()),
        }
    }

    // Sorted so the result does not depend on input order
    active_prices.sort_unstable();
    sold_prices.sort_unstable();

    let mut all: Vec<u64> = active_prices.iter().chain(&sold_prices).copied().collect();
    all.sort_unstable();

    PriceStatistics {
        total: all.len(),
        active_count: active_prices.len(),
        sold_count: sold_prices.len(),
        mean: mean(&all).map(round2),
        median: median(&all).map(round2),
        min: all.first().copied(),
        max: all.last().copied(),
        active_prices,
        sold_prices,
    }
}

fn mean(prices: &[u64]) -> Option<f64> {
    if prices.is_empty() {
        return None;
    }
    let sum: u128 = prices.iter().map(|&p| p as u128).sum();
    Some(sum as f64 / prices.len() as f64)
}

/// `sorted` must be ascending
fn median(sorted: &[u64]) -> Option<f64> {
    let n = sorted.len();
    match n {
        0 => None,
        _ if n % 2 == 1 => Some(sorted[n / 2] as f64),
        _ => Some((sorted[n / 2 - 1] as f64 + sorted[n / 2] as f64) / 2.0),
    }
}

/// Half away from zero
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Equal-width histogram over a price set
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PriceDistribution {
    /// `bins + 1` edges, ascending
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

/// Bucket `prices` into `bins` equal-width bins between min and max.
/// The last bin is closed on the right. A single distinct value spans value ± 0.5.
pub fn price_distribution(prices: &[u64], bins: usize) -> PriceDistribution {
    let (Some(&lo), Some(&hi)) = (prices.iter().min(), prices.iter().max()) else {
        return PriceDistribution {
            edges: Vec::new(),
            counts: Vec::new(),
        };
    };
    if bins == 0 {
        return PriceDistribution {
            edges: Vec::new(),
            counts: Vec::new(),
        };
    }

    let (lo, hi) = if lo == hi {
        (lo as f64 - 0.5, hi as f64 + 0.5)
    } else {
        (lo as f64, hi as f64)
    };
    let width = (hi - lo) / bins as f64;

    let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
    let mut counts = vec![0usize; bins];

    for &price in prices {
        let offset = (price as f64 - lo) / width;
        let index = (offset.floor() as usize).min(bins - 1);
        counts[index] += 1;
    }

    PriceDistribution { edges, counts }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: &str, price: u64, status: ListingStatus) -> Listing {
        Listing::new(id, id, price, status, None, "https://jp.mercari.com/item", None).unwrap()
    }

    #[test]
    fn test_empty_input_has_no_price_fields() {
        let empty: Vec<Listing> = Vec::new();
        let stats = compute_statistics(&empty);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.active_count, 0);
        assert_eq!(stats.sold_count, 0);
        assert_eq!(stats.mean, None);
        assert_eq!(stats.median, None);
        assert_eq!(stats.min, None);
        assert_eq!(stats.max, None);
        assert!(stats.active_prices.is_empty());
        assert!(stats.sold_prices.is_empty());
    }

    #[test]
    fn test_counts_and_prices() {
        let listings = vec![
            listing("a", 300, ListingStatus::Active),
            listing("b", 100, ListingStatus::Sold),
            listing("c", 200, ListingStatus::Active),
            listing("d", 1000, ListingStatus::Active),
        ];
        let stats = compute_statistics(&listings);

        assert_eq!(stats.total, 4);
        assert_eq!(stats.active_count + stats.sold_count, stats.total);
        assert_eq!(stats.active_prices.len(), stats.active_count);
        assert_eq!(stats.active_prices, vec![200, 300, 1000]);
        assert_eq!(stats.sold_prices, vec![100]);
        assert_eq!(stats.mean, Some(400.0));
        assert_eq!(stats.median, Some(250.0));
        assert_eq!(stats.min, Some(100));
        assert_eq!(stats.max, Some(1000));
    }

    #[test]
    fn test_mean_rounds_to_two_decimals() {
        let listings = vec![
            listing("a", 1, ListingStatus::Active),
            listing("b", 1, ListingStatus::Active),
            listing("c", 2, ListingStatus::Sold),
        ];
        let stats = compute_statistics(&listings);
        assert_eq!(stats.mean, Some(1.33));
        assert_eq!(stats.median, Some(1.0));
    }

    #[test]
    fn test_order_independent() {
        let listings = vec![
            listing("a", 500, ListingStatus::Active),
            listing("b", 120, ListingStatus::Sold),
            listing("c", 999, ListingStatus::Active),
            listing("d", 120, ListingStatus::Active),
            listing("e", 75, ListingStatus::Sold),
        ];
        let mut shuffled = listings.clone();
        shuffled.reverse();
        shuffled.swap(0, 2);

        assert_eq!(compute_statistics(&listings), compute_statistics(&shuffled));
    }

    #[test]
    fn test_all_prices_merges_sorted() {
        let listings = vec![
            listing("a", 30, ListingStatus::Sold),
            listing("b", 10, ListingStatus::Active),
            listing("c", 20, ListingStatus::Sold),
        ];
        assert_eq!(compute_statistics(&listings).all_prices(), vec![10, 20, 30]);
    }

    #[test]
    fn test_price_distribution() {
        let dist = price_distribution(&[0, 10, 5, 10], 2);
        assert_eq!(dist.edges, vec![0.0, 5.0, 10.0]);
        assert_eq!(dist.counts, vec![1, 3]);

        let single = price_distribution(&[100, 100], 4);
        assert_eq!(single.edges.first().copied(), Some(99.5));
        assert_eq!(single.edges.last().copied(), Some(100.5));
        assert_eq!(single.counts.iter().sum::<usize>(), 2);

        let empty = price_distribution(&[], 10);
        assert!(empty.edges.is_empty());
        assert!(empty.counts.is_empty());
    }
}
