// src/services/mod.rs
pub mod aggregator;
pub mod csv_source;
pub mod input;
pub mod price_source;
pub mod report;
pub mod simulator;
pub mod yahoo;
