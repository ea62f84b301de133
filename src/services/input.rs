// src/services/input.rs
use chrono::{DateTime, Utc};
use log::debug;

use crate::error::SimulationError;
use crate::models::{DateRange, SimulationRequest};

/// Splits a comma-separated symbol list, trimming whitespace and dropping blanks.
pub fn parse_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn parse_amount(raw: &str) -> Result<f64, SimulationError> {
    let amount = raw.trim().parse::<f64>().map_err(|_| {
        SimulationError::InvalidInput(format!("'{}' is not a valid monthly investment amount", raw.trim()))
    })?;

    if !amount.is_finite() || amount <= 0.0 {
        return Err(SimulationError::InvalidInput(format!(
            "monthly investment amount must be positive, got {}",
            raw.trim()
        )));
    }
    Ok(amount)
}

pub fn parse_years(raw: &str) -> Result<u32, SimulationError> {
    let years = raw.trim().parse::<u32>().map_err(|_| {
        SimulationError::InvalidInput(format!("'{}' is not a valid number of years", raw.trim()))
    })?;

    if years == 0 {
        return Err(SimulationError::InvalidInput("number of years must be at least 1".to_string()));
    }
    Ok(years)
}

/// Validates the three user-facing fields. Numbers are checked before the
/// symbol list so malformed input never reaches a fetch.
pub fn parse_request(
    amount: &str,
    years: &str,
    symbols: &str,
    now: DateTime<Utc>,
) -> Result<SimulationRequest, SimulationError> {
    let total_periodic_amount = parse_amount(amount)?;
    let years = parse_years(years)?;

    let symbols = parse_symbols(symbols);
    if symbols.is_empty() {
        return Err(SimulationError::EmptyRun);
    }

    let range = DateRange::trailing_years(years, now)?;
    debug!(
        "Parsed request: {} symbols, {} per month, {} to {}",
        symbols.len(),
        total_periodic_amount,
        range.start,
        range.end
    );

    Ok(SimulationRequest {
        symbols,
        total_periodic_amount,
        range,
    })
}
