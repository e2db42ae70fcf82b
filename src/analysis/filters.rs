use clap::ValueEnum;

use crate::models::{Listing, ListingStatus};

pub fn filter_by_status<'a, I>(listings: I, status: ListingStatus) -> Vec<&'a Listing>
where
    I: IntoIterator<Item = &'a Listing>,
{
    listings
        .into_iter()
        .filter(|listing| listing.status() == status)
        .collect()
}

/// Inclusive on both bounds; a missing bound is unconstrained
pub fn filter_by_price<'a, I>(listings: I, min: Option<u64>, max: Option<u64>) -> Vec<&'a Listing>
where
    I: IntoIterator<Item = &'a Listing>,
{
    listings
        .into_iter()
        .filter(|listing| min.map_or(true, |lo| listing.price() >= lo))
        .filter(|listing| max.map_or(true, |hi| listing.price() <= hi))
        .collect()
}

/// Stable in both directions: equal prices keep their input order
pub fn sort_by_price<'a, I>(listings: I, ascending: bool) -> Vec<&'a Listing>
where
    I: IntoIterator<Item = &'a Listing>,
{
    let mut sorted: Vec<&Listing> = listings.into_iter().collect();
    if ascending {
        sorted.sort_by(|a, b| a.price().cmp(&b.price()));
    } else {
        sorted.sort_by(|a, b| b.price().cmp(&a.price()));
    }
    sorted
}

/// Newest first. Listings without a timestamp go last, in input order.
pub fn recent_listings<'a, I>(listings: I, limit: usize) -> Vec<&'a Listing>
where
    I: IntoIterator<Item = &'a Listing>,
{
    let mut sorted: Vec<&Listing> = listings.into_iter().collect();
    sorted.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    sorted.truncate(limit);
    sorted
}

/// Status selection for a view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Sold,
}

impl StatusFilter {
    fn status(self) -> Option<ListingStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Active => Some(ListingStatus::Active),
            StatusFilter::Sold => Some(ListingStatus::Sold),
        }
    }
}

/// Ordering of a view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ViewOrder {
    /// Order the provider returned
    Provider,
    #[default]
    Asc,
    Desc,
}

impl ViewOrder {
    pub fn ascending(self) -> Option<bool> {
        match self {
            ViewOrder::Provider => None,
            ViewOrder::Asc => Some(true),
            ViewOrder::Desc => Some(false),
        }
    }
}

/// Filter and sort selections applied together
#[derive(Debug, Clone, Default)]
pub struct ListingView {
    pub status: StatusFilter,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    /// `None` keeps provider order
    pub ascending: Option<bool>,
}

impl ListingView {
    pub fn apply<'a>(&self, listings: &'a [Listing]) -> Vec<&'a Listing> {
        let mut view: Vec<&Listing> = match self.status.status() {
            Some(status) => filter_by_status(listings, status),
            None => listings.iter().collect(),
        };

        view = filter_by_price(view, self.min_price, self.max_price);

        match self.ascending {
            Some(ascending) => sort_by_price(view, ascending),
            None => view,
        }
    }
}
