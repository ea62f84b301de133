// src/handlers/simulation.rs
use chrono::Utc;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use crate::handlers::error::ApiError;
use crate::models::RunResult;
use crate::services::aggregator::Aggregator;
use crate::services::input::parse_request;
use crate::services::report::{self, ChartSpec};

/// Raw form fields; validation happens in `parse_request` so that missing and
/// malformed values get the same user-facing message.
#[derive(Debug, Default, Deserialize)]
pub struct SimulationQuery {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub years: String,
    #[serde(default)]
    pub symbols: String,
}

#[derive(Serialize)]
struct SimulationResponse {
    result: RunResult,
    summary: String,
    chart: ChartSpec,
}

pub async fn get_simulation(query: SimulationQuery, aggregator: Arc<Aggregator>) -> Result<Json, Rejection> {
    debug!("Handling simulation request for symbols '{}'", query.symbols);

    let request = parse_request(&query.amount, &query.years, &query.symbols, Utc::now()).map_err(|e| {
        error!("Rejected simulation input: {}", e);
        warp::reject::custom(ApiError::from(e))
    })?;

    let result = aggregator.run_request(&request).await.map_err(|e| {
        error!("Simulation failed: {}", e);
        warp::reject::custom(ApiError::from(e))
    })?;

    let response = SimulationResponse {
        summary: report::summary_text(&result),
        chart: report::chart(&result),
        result,
    };

    Ok(warp::reply::json(&response))
}
