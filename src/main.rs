mod analysis;
mod config;
mod error;
mod export;
mod marketplace;
mod models;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use analysis::{
    compute_statistics, price_distribution, recent_listings, ListingView, StatusFilter, ViewOrder,
};
use config::AppConfig;
use export::format_price;
use marketplace::{
    run_search, MarketplaceClient, MercariClient, SampleClient, SearchRequest, SortField, SortOrder,
};

/// Search secondhand listings for a card and summarize prices
#[derive(Debug, Parser)]
#[command(name = "price-scout", version)]
struct Cli {
    /// Card number, e.g. 025/165 or SV-P-123
    identifier: String,

    /// Card name to narrow the search
    #[arg(long)]
    name: Option<String>,

    /// Maximum number of results requested from the provider
    #[arg(long)]
    limit: Option<usize>,

    /// Provider-side ordering
    #[arg(long, value_enum)]
    sort: Option<SortField>,

    #[arg(long, value_enum)]
    order: Option<SortOrder>,

    /// Only show listings with this status
    #[arg(long, value_enum, default_value_t = StatusFilter::All)]
    status: StatusFilter,

    #[arg(long)]
    min_price: Option<u64>,

    #[arg(long)]
    max_price: Option<u64>,

    /// Order of the listing view: provider order or by price
    #[arg(long, value_enum, default_value_t = ViewOrder::Asc)]
    sort_view: ViewOrder,

    /// Use generated sample data instead of the live API
    #[arg(long)]
    sample: bool,

    /// Seed for sample data
    #[arg(long, requires = "sample")]
    seed: Option<u64>,

    /// Histogram bins for the price distribution
    #[arg(long, default_value_t = 10)]
    bins: usize,

    /// Show the N most recently listed items
    #[arg(long)]
    recent: Option<usize>,

    /// Export the listing view as CSV (use "-" for the default file name)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Also look up full details for this item id
    #[arg(long)]
    item: Option<String>,

    /// Export the full result and statistics as JSON
    #[arg(long)]
    json: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    info!("🎴 Price Scout");

    let request = SearchRequest::new(&cli.identifier, cli.name.as_deref())?
        .with_limit(cli.limit.unwrap_or(config.default_limit))?
        .with_sort(
            cli.sort.unwrap_or(config.sort_field),
            cli.order.unwrap_or(config.sort_order),
        );

    info!(
        "Card: {}{}",
        request.identifier(),
        request.qualifier().map(|q| format!(" ({})", q)).unwrap_or_default()
    );

    let client: Box<dyn MarketplaceClient> = if cli.sample {
        Box::new(match cli.seed {
            Some(seed) => SampleClient::with_seed(&config.item_base, seed),
            None => SampleClient::new(&config.item_base),
        })
    } else {
        Box::new(MercariClient::new(&config)?)
    };

    let result = run_search(client.as_ref(), &request).await?;

    if !result.succeeded {
        anyhow::bail!(
            "Search failed: {}",
            result.error.as_deref().unwrap_or("unknown error")
        );
    }
    if result.listings.is_empty() {
        warn!("No listings found for \"{}\"", result.query);
        return Ok(());
    }

    info!("\n✅ Found {} listings for \"{}\"\n", result.listings.len(), result.query);

    let stats = compute_statistics(&result.listings);
    println!("Total:   {} (provider reports {})", stats.total, result.total_found);
    println!("Active:  {}", stats.active_count);
    println!("Sold:    {}", stats.sold_count);
    println!("Average: {}", format_price(stats.mean));
    println!("Median:  {}", format_price(stats.median));
    println!("Min:     {}", format_price(stats.min.map(|p| p as f64)));
    println!("Max:     {}", format_price(stats.max.map(|p| p as f64)));
    println!();

    let distribution = price_distribution(&stats.all_prices(), cli.bins);
    for (i, count) in distribution.counts.iter().enumerate() {
        println!(
            "{:>10} - {:<10} {}",
            format_price(Some(distribution.edges[i])),
            format_price(Some(distribution.edges[i + 1])),
            "#".repeat(*count)
        );
    }
    println!();

    let view = ListingView {
        status: cli.status,
        min_price: cli.min_price,
        max_price: cli.max_price,
        ascending: cli.sort_view.ascending(),
    }
    .apply(&result.listings);

    println!("📦 {} listings", view.len());
    for (i, listing) in view.iter().enumerate() {
        println!(
            "{}. {} ({}) [{}]",
            i + 1,
            listing.title(),
            format_price(Some(listing.price() as f64)),
            listing.status().as_str()
        );
        println!("   URL: {}", listing.detail_url());
    }

    if let Some(n) = cli.recent {
        println!();
        println!("🕒 Most recent");
        for listing in recent_listings(&result.listings, n) {
            let when = listing
                .created_at()
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("   {} {} {}", when, listing.id(), format_price(Some(listing.price() as f64)));
        }
    }

    if let Some(item_id) = cli.item.as_deref() {
        let lookup = client.item_details(item_id).await;
        println!();
        match lookup.detail {
            Some(detail) => {
                println!("🔎 {} ({})", detail.name, format_price(Some(detail.price as f64)));
                println!("   Status: {}", detail.status.as_str());
                if let Some(seller) = &detail.seller {
                    println!("   Seller: {}", seller);
                }
                println!("   Photos: {}", detail.photos.len());
                println!("   URL: {}", detail.url);
                if !detail.description.is_empty() {
                    println!("   {}", detail.description);
                }
            }
            None => warn!(
                "Item lookup for {} failed: {}",
                lookup.item_id,
                lookup.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }

    if let Some(path) = cli.csv {
        let path = if path.as_os_str() == "-" {
            PathBuf::from(export::default_csv_filename(request.identifier(), Utc::now()))
        } else {
            path
        };
        let file = std::fs::File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        export::write_listings_csv(file, &view)?;
        info!("💾 Saved {} listings to {}", view.len(), path.display());
    }

    if let Some(path) = cli.json {
        export::write_json_report(&path, &result, &stats).await?;
        info!("💾 Saved search report to {}", path.display());
    }

    Ok(())
}
