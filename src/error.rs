// src/error.rs
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("No symbols were provided")]
    EmptyRun,
    #[error("Invalid symbol {symbol}: {reason}")]
    InvalidSymbol { symbol: String, reason: String },
    #[error("No price history for {0} in the requested range")]
    EmptyHistory(String),
    #[error("The following symbols are not valid: {}", .0.join(", "))]
    InvalidSymbols(Vec<String>),
    #[error("Series for {symbol} has {actual} periods, expected {expected}")]
    SeriesLengthMismatch {
        symbol: String,
        expected: usize,
        actual: usize,
    },
    #[error("The requested symbols share no common periods")]
    NoOverlappingPeriods,
    #[error("Total invested is zero, the return is undefined")]
    DivisionByZero,
}

impl SimulationError {
    /// Errors caused by what the user typed, as opposed to what the data allowed.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            SimulationError::InvalidInput(_)
                | SimulationError::EmptyRun
                | SimulationError::InvalidSymbol { .. }
                | SimulationError::EmptyHistory(_)
                | SimulationError::InvalidSymbols(_)
        )
    }
}
