pub mod filters;
pub mod stats;

pub use filters::{recent_listings, ListingView, StatusFilter, ViewOrder};
pub use stats::{compute_statistics, price_distribution, PriceStatistics};
