// src/services/simulator.rs
use log::{info, warn};
use std::sync::Arc;

use crate::error::SimulationError;
use crate::models::{DateRange, PricePoint, SimulationRow, SimulationSeries};
use super::price_source::PriceSource;

/// Buys `periodic_amount` worth of shares at every close, oldest first.
///
/// Fractional shares are kept unrounded. Points with a close that is not a
/// positive finite number are skipped.
pub fn simulate_prices(symbol: &str, periodic_amount: f64, prices: &[PricePoint]) -> SimulationSeries {
    let mut total_invested = 0.0;
    let mut total_shares = 0.0;
    let mut rows = Vec::with_capacity(prices.len());

    for point in prices {
        let close_price = point.closing_price;
        if !is_usable_close(close_price) {
            warn!("Skipping {} on {}: unusable close {}", symbol, point.period_date, close_price);
            continue;
        }

        let shares_bought = periodic_amount / close_price;
        total_shares += shares_bought;
        total_invested += periodic_amount;
        let total_value = total_shares * close_price;

        rows.push(SimulationRow {
            period_date: point.period_date,
            cumulative_invested: total_invested,
            cumulative_shares: total_shares,
            total_value,
        });
    }

    SimulationSeries {
        symbol: symbol.to_string(),
        periodic_amount,
        rows,
    }
}

/// The same purchases made with `periodic_amount` per period instead.
///
/// Shares bought scale linearly with the amount, so the dates and closes are unchanged.
pub(crate) fn rescale(series: SimulationSeries, periodic_amount: f64) -> SimulationSeries {
    let factor = periodic_amount / series.periodic_amount;
    let rows = series
        .rows
        .into_iter()
        .map(|row| SimulationRow {
            period_date: row.period_date,
            cumulative_invested: row.cumulative_invested * factor,
            cumulative_shares: row.cumulative_shares * factor,
            total_value: row.total_value * factor,
        })
        .collect();

    SimulationSeries {
        symbol: series.symbol,
        periodic_amount,
        rows,
    }
}

fn is_usable_close(close_price: f64) -> bool {
    close_price.is_finite() && close_price > 0.0
}

pub(crate) fn validate_amount(amount: f64) -> Result<(), SimulationError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(SimulationError::InvalidInput(format!(
            "investment amount must be a positive number, got {}",
            amount
        )));
    }
    Ok(())
}

pub struct Simulator {
    source: Arc<dyn PriceSource>,
}

impl Simulator {
    pub fn new(source: Arc<dyn PriceSource>) -> Self {
        Simulator { source }
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Monthly closes for `symbol`, with any retrieval failure reported as an invalid symbol.
    async fn fetch_history(&self, symbol: &str, range: &DateRange) -> Result<Vec<PricePoint>, SimulationError> {
        if symbol.trim().is_empty() {
            return Err(SimulationError::InvalidInput("symbol must not be empty".to_string()));
        }

        self.source
            .fetch_monthly_history(symbol, range)
            .await
            .map_err(|e| SimulationError::InvalidSymbol {
                symbol: symbol.to_string(),
                reason: e.to_string(),
            })
    }

    /// Fetches `symbol` and runs the purchase loop over it.
    ///
    /// An empty history is returned as an empty series; whether that is acceptable
    /// is up to the caller.
    pub async fn simulate(
        &self,
        symbol: &str,
        periodic_amount: f64,
        range: &DateRange,
    ) -> Result<SimulationSeries, SimulationError> {
        validate_amount(periodic_amount)?;

        let prices = self.fetch_history(symbol, range).await?;
        let series = simulate_prices(symbol, periodic_amount, &prices);

        info!(
            "Simulated {} over {} periods at {:.2} per period",
            symbol,
            series.len(),
            periodic_amount
        );
        Ok(series)
    }
}
