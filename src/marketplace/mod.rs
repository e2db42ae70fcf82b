pub mod mercari;
pub mod normalizer;
pub mod sample;
pub mod traits;
pub mod types;

pub use mercari::MercariClient;
pub use sample::SampleClient;
pub use traits::{run_search, MarketplaceClient};
pub use types::{SearchRequest, SortField, SortOrder};
