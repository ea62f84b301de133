// src/lib.rs

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use error::SimulationError;
pub use services::aggregator::{Aggregator, Alignment, ValidityPolicy};
pub use services::price_source::{PriceSource, PriceSourceError};
pub use services::simulator::Simulator;
