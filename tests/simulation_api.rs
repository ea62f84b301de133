use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use warp::http::StatusCode;

use dca_simulator::models::{DateRange, PricePoint};
use dca_simulator::routes::routes;
use dca_simulator::services::price_source::{PriceSource, PriceSourceError};
use dca_simulator::{Aggregator, Simulator, ValidityPolicy};

struct StaticPriceSource {
    histories: HashMap<String, Vec<PricePoint>>,
}

impl StaticPriceSource {
    fn example() -> Self {
        let jan = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let feb = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();

        let mut histories = HashMap::new();
        histories.insert(
            "AAA".to_string(),
            vec![PricePoint::new(jan, 10.0), PricePoint::new(feb, 20.0)],
        );
        histories.insert(
            "BBB".to_string(),
            vec![PricePoint::new(jan, 5.0), PricePoint::new(feb, 5.0)],
        );
        histories.insert("EMPTY".to_string(), vec![]);
        StaticPriceSource { histories }
    }
}

#[async_trait]
impl PriceSource for StaticPriceSource {
    // The window is derived from the wall clock, so it is ignored here
    async fn fetch_monthly_history(
        &self,
        symbol: &str,
        _range: &DateRange,
    ) -> Result<Vec<PricePoint>, PriceSourceError> {
        self.histories
            .get(symbol)
            .cloned()
            .ok_or_else(|| PriceSourceError::NotFound(symbol.to_string()))
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

fn strict_aggregator() -> Arc<Aggregator> {
    Arc::new(Aggregator::new(Simulator::new(Arc::new(StaticPriceSource::example()))))
}

async fn get(aggregator: Arc<Aggregator>, path: &str) -> (StatusCode, Value) {
    let response = warp::test::request()
        .method("GET")
        .path(path)
        .reply(&routes(aggregator))
        .await;

    let body: Value = serde_json::from_slice(response.body()).unwrap();
    (response.status(), body)
}

#[tokio::test]
async fn simulation_returns_result_summary_and_chart() {
    let (status, body) = get(
        strict_aggregator(),
        "/api/v1/simulation?amount=100&years=1&symbols=AAA,%20BBB",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["symbols"], serde_json::json!(["AAA", "BBB"]));
    assert_eq!(body["result"]["per_symbol_amount"].as_f64(), Some(50.0));
    assert_eq!(body["result"]["total_invested"].as_f64(), Some(200.0));
    assert_eq!(body["result"]["total_value"].as_f64(), Some(250.0));
    assert_eq!(body["result"]["percentage_return"].as_f64(), Some(25.0));
    assert_eq!(body["result"]["rows"].as_array().map(|r| r.len()), Some(2));
    assert_eq!(body["result"]["rows"][1]["period_date"], "2024-02-01");

    assert_eq!(
        body["summary"],
        "Combined total invested: $200.00\nCombined total investment value: $250.00"
    );
    assert_eq!(body["chart"]["title"], "Combined Investment Simulation\nReturn: 25.00%");
    assert_eq!(body["chart"]["series"][0]["label"], "Combined Investment Total Value: $250.00");
    assert_eq!(body["chart"]["series"][1]["label"], "Combined Total Invested: $200.00");
}

#[tokio::test]
async fn invalid_symbols_are_reported_together() {
    let (status, body) = get(
        strict_aggregator(),
        "/api/v1/simulation?amount=100&years=1&symbols=AAA,NOPE,EMPTY",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "The following symbols are not valid: NOPE, EMPTY");
}

#[tokio::test]
async fn skip_invalid_policy_returns_partial_result() {
    let aggregator = Arc::new(
        Aggregator::new(Simulator::new(Arc::new(StaticPriceSource::example())))
            .with_validity(ValidityPolicy::SkipInvalid),
    );
    let (status, body) = get(aggregator, "/api/v1/simulation?amount=100&years=1&symbols=AAA,NOPE").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["skipped_symbols"], serde_json::json!(["NOPE"]));
    assert_eq!(body["result"]["per_symbol_amount"].as_f64(), Some(100.0));
}

#[tokio::test]
async fn malformed_numbers_are_rejected() {
    let (status, body) = get(
        strict_aggregator(),
        "/api/v1/simulation?amount=lots&years=1&symbols=AAA",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid input"));
}

#[tokio::test]
async fn missing_symbols_is_an_empty_run() {
    let (status, body) = get(strict_aggregator(), "/api/v1/simulation?amount=100&years=1").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No symbols were provided");
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let (status, body) = get(strict_aggregator(), "/api/v1/nothing").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
}
