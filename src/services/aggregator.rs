// src/services/aggregator.rs
use chrono::{Datelike, NaiveDate};
use log::{info, warn};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::SimulationError;
use crate::models::{CombinedRow, DateRange, RunResult, SimulationRequest, SimulationRow, SimulationSeries};
use super::simulator::{rescale, validate_amount, Simulator};

/// What to do when some requested symbols cannot be simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidityPolicy {
    /// Reject the whole run if any symbol is invalid.
    #[default]
    Strict,
    /// Drop invalid symbols and split the budget across the rest.
    SkipInvalid,
}

/// How per-symbol rows are lined up before summing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    /// Inner join on calendar month.
    #[default]
    ByDate,
    /// Row i with row i; every series must have the same length.
    Positional,
}

impl FromStr for ValidityPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(ValidityPolicy::Strict),
            "skip-invalid" | "skip_invalid" => Ok(ValidityPolicy::SkipInvalid),
            other => Err(format!("unknown validity policy '{}' (expected strict or skip-invalid)", other)),
        }
    }
}

impl fmt::Display for ValidityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ValidityPolicy::Strict => write!(f, "strict"),
            ValidityPolicy::SkipInvalid => write!(f, "skip-invalid"),
        }
    }
}

impl FromStr for Alignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "by-date" | "by_date" | "date" => Ok(Alignment::ByDate),
            "positional" | "position" => Ok(Alignment::Positional),
            other => Err(format!("unknown alignment '{}' (expected by-date or positional)", other)),
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Alignment::ByDate => write!(f, "by-date"),
            Alignment::Positional => write!(f, "positional"),
        }
    }
}

pub struct Aggregator {
    simulator: Simulator,
    validity: ValidityPolicy,
    alignment: Alignment,
}

impl Aggregator {
    pub fn new(simulator: Simulator) -> Self {
        Aggregator {
            simulator,
            validity: ValidityPolicy::default(),
            alignment: Alignment::default(),
        }
    }

    pub fn with_validity(mut self, validity: ValidityPolicy) -> Self {
        self.validity = validity;
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub async fn run_request(&self, request: &SimulationRequest) -> Result<RunResult, SimulationError> {
        self.run(&request.symbols, request.total_periodic_amount, &request.range).await
    }

    /// Simulates every symbol with an equal share of `total_periodic_amount` and
    /// sums the results period by period.
    ///
    /// Every symbol is fetched, one after another, even after a failure so the
    /// complete list of invalid symbols can be reported.
    pub async fn run(
        &self,
        symbols: &[String],
        total_periodic_amount: f64,
        range: &DateRange,
    ) -> Result<RunResult, SimulationError> {
        if symbols.is_empty() {
            return Err(SimulationError::EmptyRun);
        }
        validate_amount(total_periodic_amount)?;

        info!(
            "Starting run for {} symbols ({}) from {} to {} via {} [{} / {}]",
            symbols.len(),
            symbols.join(", "),
            range.start,
            range.end,
            self.simulator.source_name(),
            self.validity,
            self.alignment
        );

        let initial_amount = total_periodic_amount / symbols.len() as f64;
        let mut series: Vec<SimulationSeries> = Vec::with_capacity(symbols.len());
        let mut invalid_symbols: Vec<String> = Vec::new();

        for symbol in symbols {
            let outcome = self.simulator.simulate(symbol, initial_amount, range).await;
            match non_empty(symbol, outcome) {
                Ok(s) => series.push(s),
                Err(e) => {
                    warn!("{}", e);
                    invalid_symbols.push(symbol.clone());
                }
            }
        }

        let mut per_symbol_amount = initial_amount;
        if !invalid_symbols.is_empty() {
            match self.validity {
                ValidityPolicy::Strict => {
                    return Err(SimulationError::InvalidSymbols(invalid_symbols));
                }
                ValidityPolicy::SkipInvalid if series.is_empty() => {
                    return Err(SimulationError::InvalidSymbols(invalid_symbols));
                }
                ValidityPolicy::SkipInvalid => {
                    warn!("Skipping invalid symbols: {}", invalid_symbols.join(", "));
                    // The full budget goes to the symbols that are left
                    per_symbol_amount = total_periodic_amount / series.len() as f64;
                    series = series
                        .into_iter()
                        .map(|s| rescale(s, per_symbol_amount))
                        .collect();
                }
            }
        }

        let rows = match self.alignment {
            Alignment::ByDate => merge_by_month(&series),
            Alignment::Positional => merge_positional(&series)?,
        };

        let last = rows.last().ok_or(SimulationError::NoOverlappingPeriods)?;
        let total_invested = last.total_invested;
        let total_value = last.total_value;
        let return_pct = percentage_return(total_invested, total_value)?;

        info!(
            "Run complete: {} periods, invested {:.2}, value {:.2}, return {:.2}%",
            rows.len(),
            total_invested,
            total_value,
            return_pct
        );

        Ok(RunResult {
            symbols: series.iter().map(|s| s.symbol.clone()).collect(),
            per_symbol_amount,
            range: *range,
            total_invested,
            total_value,
            percentage_return: return_pct,
            rows,
            skipped_symbols: invalid_symbols,
        })
    }
}

/// An empty series counts as an invalid symbol, same as a failed fetch.
fn non_empty(
    symbol: &str,
    outcome: Result<SimulationSeries, SimulationError>,
) -> Result<SimulationSeries, SimulationError> {
    match outcome {
        Ok(s) if s.is_empty() => Err(SimulationError::EmptyHistory(symbol.to_string())),
        other => other,
    }
}

/// `(value − invested) / invested × 100`
pub fn percentage_return(total_invested: f64, total_value: f64) -> Result<f64, SimulationError> {
    if total_invested == 0.0 {
        return Err(SimulationError::DivisionByZero);
    }
    Ok((total_value - total_invested) / total_invested * 100.0)
}

pub fn merge_positional(series: &[SimulationSeries]) -> Result<Vec<CombinedRow>, SimulationError> {
    let Some(first) = series.first() else {
        return Ok(Vec::new());
    };

    let expected = first.len();
    if let Some(short) = series.iter().find(|s| s.len() != expected) {
        return Err(SimulationError::SeriesLengthMismatch {
            symbol: short.symbol.clone(),
            expected,
            actual: short.len(),
        });
    }

    Ok((0..expected)
        .map(|i| CombinedRow {
            period_date: first.rows[i].period_date,
            total_invested: series.iter().map(|s| s.rows[i].cumulative_invested).sum(),
            total_value: series.iter().map(|s| s.rows[i].total_value).sum(),
        })
        .collect())
}

type MonthKey = (i32, u32);

fn month_key(date: NaiveDate) -> MonthKey {
    (date.year(), date.month())
}

/// Inner join on calendar month. Dates come from the first series.
pub fn merge_by_month(series: &[SimulationSeries]) -> Vec<CombinedRow> {
    let mut combined: BTreeMap<MonthKey, (CombinedRow, usize)> = BTreeMap::new();

    for s in series {
        // Within one series the latest row of a month wins
        let mut per_month: BTreeMap<MonthKey, &SimulationRow> = BTreeMap::new();
        for row in &s.rows {
            per_month.insert(month_key(row.period_date), row);
        }

        for (key, row) in per_month {
            let (entry, seen) = combined.entry(key).or_insert_with(|| {
                (
                    CombinedRow {
                        period_date: row.period_date,
                        total_invested: 0.0,
                        total_value: 0.0,
                    },
                    0,
                )
            });
            entry.total_invested += row.cumulative_invested;
            entry.total_value += row.total_value;
            *seen += 1;
        }
    }

    let months = combined.len();
    let rows: Vec<CombinedRow> = combined
        .into_values()
        .filter(|(_, seen)| *seen == series.len())
        .map(|(row, _)| row)
        .collect();

    if rows.len() < months {
        warn!("Dropped {} months not covered by every symbol", months - rows.len());
    }
    rows
}
