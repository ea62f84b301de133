use chrono::Utc;
use dca_simulator::models::DateRange;
use dca_simulator::services::price_source::PriceSource;
use dca_simulator::services::yahoo::YahooPriceSource;
use log::{info, error};
use std::env;
use dotenv::dotenv;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::init();

    let symbol = env::var("TEST_SYMBOL").unwrap_or_else(|_| "^GSPC".to_string());
    info!("Testing Yahoo Finance monthly history for {}...", symbol);

    let source = YahooPriceSource::new()?;
    let range = DateRange::trailing_years(1, Utc::now())?;

    match source.fetch_monthly_history(&symbol, &range).await {
        Ok(points) => {
            info!("SUCCESS: {} monthly closes between {} and {}", points.len(), range.start, range.end);
            for point in &points {
                info!("  {} {:.2}", point.period_date, point.closing_price);
            }
        }
        Err(e) => {
            error!("ERROR: Failed to fetch Yahoo history for {}: {}", symbol, e);
            return Err(e.into());
        }
    }

    Ok(())
}
