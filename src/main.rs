use anyhow::Result;
use dotenv::dotenv;
use log::{info, warn};
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::Filter;

use dca_simulator::config::AppConfig;
use dca_simulator::routes;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    // Initialize the logger
    env_logger::init();
    info!("Logger initialized. Starting the application...");

    if env::var("PORT").is_err() {
        warn!("$PORT not set, defaulting to 3030");
    }
    let config = AppConfig::from_env()?;
    info!("Using PORT: {}", config.port);
    info!("Validity policy: {}, alignment: {}", config.validity, config.alignment);

    let aggregator = Arc::new(config.aggregator()?);

    // Bind to 0.0.0.0 so the dashboard can reach us from outside a container
    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    info!("Will bind to: {}", addr);

    // Set up CORS
    let cors = warp::cors()
        .allow_any_origin()
        .allow_header("content-type")
        .allow_methods(vec!["GET"]);

    let api = routes::routes(aggregator).with(cors);
    info!("Routes configured successfully with CORS.");

    info!("Starting server on {}", addr);
    warp::serve(api)
        .run(addr)
        .await;

    Ok(())
}
