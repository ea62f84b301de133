// src/services/csv_source.rs
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use csv::Reader;
use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::models::{DateRange, PricePoint};
use super::price_source::{PriceSource, PriceSourceError};

/// Reads `<dir>/<SYMBOL>.csv` files with `Date` and `Close` columns.
pub struct CsvPriceSource {
    dir: PathBuf,
}

impl CsvPriceSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        CsvPriceSource { dir: dir.into() }
    }

    fn file_for(&self, symbol: &str) -> Result<PathBuf, PriceSourceError> {
        // Symbols become file names, keep them from walking out of the directory
        if symbol.is_empty() || symbol.contains(['/', '\\']) || symbol.starts_with('.') {
            return Err(PriceSourceError::NotFound(symbol.to_string()));
        }
        Ok(self.dir.join(format!("{}.csv", symbol)))
    }
}

#[async_trait]
impl PriceSource for CsvPriceSource {
    async fn fetch_monthly_history(
        &self,
        symbol: &str,
        range: &DateRange,
    ) -> Result<Vec<PricePoint>, PriceSourceError> {
        let path = self.file_for(symbol)?;
        if !path.is_file() {
            warn!("No price file for {} at {}", symbol, path.display());
            return Err(PriceSourceError::NotFound(symbol.to_string()));
        }

        info!("Reading price history for {} from {}", symbol, path.display());
        let csv_text = tokio::fs::read_to_string(&path).await?;
        let points = parse_price_csv(&path, &csv_text, range)?;
        info!("Loaded {} prices for {}", points.len(), symbol);
        Ok(points)
    }

    fn name(&self) -> &'static str {
        "csv"
    }
}

fn parse_price_csv(path: &Path, csv_text: &str, range: &DateRange) -> Result<Vec<PricePoint>, PriceSourceError> {
    let mut rdr = Reader::from_reader(csv_text.as_bytes());

    let headers = rdr.headers()
        .map_err(|e| PriceSourceError::Parsing(format!("{}: {}", path.display(), e)))?
        .clone();
    let idx_date = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("date"))
        .ok_or_else(|| PriceSourceError::Parsing(format!("No 'Date' column in {}", path.display())))?;
    let idx_close = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("close"))
        .ok_or_else(|| PriceSourceError::Parsing(format!("No 'Close' column in {}", path.display())))?;

    let mut points = Vec::new();
    for record in rdr.records() {
        let row = record.map_err(|e| PriceSourceError::Parsing(format!("{}: {}", path.display(), e)))?;

        let date_cell = row.get(idx_date).unwrap_or("").trim();
        let close_cell = row.get(idx_close).unwrap_or("").trim();

        let date = NaiveDate::parse_from_str(date_cell, "%Y-%m-%d")
            .map_err(|e| PriceSourceError::Parsing(format!("bad date '{}' in {}: {}", date_cell, path.display(), e)))?;
        if !range.contains(date) {
            continue;
        }

        // Blank closes show up for halted months, treat them like Yahoo nulls
        if close_cell.is_empty() {
            continue;
        }
        let close = close_cell.parse::<f64>()
            .map_err(|e| PriceSourceError::Parsing(format!("bad close '{}' in {}: {}", close_cell, path.display(), e)))?;

        points.push(PricePoint::new(date, close));
    }

    points.sort_by_key(|p| p.period_date);
    Ok(merge_same_month(points))
}

/// One point per calendar month: the first date seen, the last close.
fn merge_same_month(sorted: Vec<PricePoint>) -> Vec<PricePoint> {
    let mut merged: Vec<PricePoint> = Vec::with_capacity(sorted.len());
    for point in sorted {
        match merged.last_mut() {
            Some(last)
                if last.period_date.year() == point.period_date.year()
                    && last.period_date.month() == point.period_date.month() =>
            {
                last.closing_price = point.closing_price;
            }
            _ => merged.push(point),
        }
    }
    merged
}
