// src/services/price_source.rs
use async_trait::async_trait;
use thiserror::Error;

use crate::models::{DateRange, PricePoint};

#[derive(Error, Debug)]
pub enum PriceSourceError {
    #[error("Symbol not found: {0}")]
    NotFound(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Parsing error: {0}")]
    Parsing(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Historical market data for the simulator.
///
/// Implementations return monthly closes inside `range`, oldest first. An empty
/// vector means the symbol resolved but has no data in the window; failing to
/// resolve the symbol at all is an error.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_monthly_history(
        &self,
        symbol: &str,
        range: &DateRange,
    ) -> Result<Vec<PricePoint>, PriceSourceError>;

    fn name(&self) -> &'static str;
}
