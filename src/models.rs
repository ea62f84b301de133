// src/models.rs
use serde::{Serialize, Deserialize};
use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::error::SimulationError;

/// One monthly closing price for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub period_date: NaiveDate,
    pub closing_price: f64,
}

impl PricePoint {
    pub fn new(period_date: NaiveDate, closing_price: f64) -> Self {
        PricePoint { period_date, closing_price }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationRow {
    pub period_date: NaiveDate,
    pub cumulative_invested: f64,
    pub cumulative_shares: f64,
    pub total_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSeries {
    pub symbol: String,
    pub periodic_amount: f64,
    pub rows: Vec<SimulationRow>,
}

impl SimulationSeries {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedRow {
    pub period_date: NaiveDate,
    pub total_invested: f64,
    pub total_value: f64,
}

/// Outcome of one aggregated run, handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub symbols: Vec<String>,
    pub per_symbol_amount: f64,
    pub range: DateRange,
    pub total_invested: f64,
    pub total_value: f64,
    pub percentage_return: f64,
    pub rows: Vec<CombinedRow>,
    // Only populated under the skip-invalid policy
    pub skipped_symbols: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, SimulationError> {
        if start >= end {
            return Err(SimulationError::InvalidInput(format!(
                "start date {} must be before end date {}",
                start, end
            )));
        }
        Ok(DateRange { start, end })
    }

    /// Window of `years` × 365 days ending at `now`.
    pub fn trailing_years(years: u32, now: DateTime<Utc>) -> Result<Self, SimulationError> {
        if years == 0 {
            return Err(SimulationError::InvalidInput(
                "number of years must be a positive integer".to_string(),
            ));
        }
        let start = Duration::try_days(i64::from(years) * 365)
            .and_then(|span| now.checked_sub_signed(span))
            .ok_or_else(|| SimulationError::InvalidInput("number of years is too large".to_string()))?;
        DateRange::new(start.date_naive(), now.date_naive())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Validated user input for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRequest {
    pub symbols: Vec<String>,
    pub total_periodic_amount: f64,
    pub range: DateRange,
}
