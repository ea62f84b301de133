// src/routes.rs
use std::convert::Infallible;
use std::sync::Arc;
use log::info;
use warp::reject::Rejection;
use warp::http::StatusCode;
use warp::{Filter, Reply};

use crate::handlers::error::ApiError;
use crate::handlers::simulation::{get_simulation, SimulationQuery};
use crate::services::aggregator::Aggregator;

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message;

    if err.is_not_found() {
        code = StatusCode::NOT_FOUND;
        message = "Not Found".to_string();
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = api_error.status;
        message = api_error.message.clone();
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        code = StatusCode::BAD_REQUEST;
        message = "Invalid query string".to_string();
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        code = StatusCode::METHOD_NOT_ALLOWED;
        message = "Method Not Allowed".to_string();
    } else {
        code = StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error".to_string();
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

pub fn routes(aggregator: Arc<Aggregator>) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let aggregator_filter = warp::any().map(move || aggregator.clone());

    let simulation_route = warp::path!("api" / "v1" / "simulation")
        .and(warp::get())
        .and(warp::query::<SimulationQuery>())
        .and(aggregator_filter)
        .and_then(get_simulation);

    info!("All routes configured successfully.");

    simulation_route.recover(handle_rejection)
}
