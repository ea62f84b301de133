// src/services/yahoo.rs
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use log::{debug, info, warn};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::models::{DateRange, PricePoint};
use super::price_source::{PriceSource, PriceSourceError};

pub const YCHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const MONTHLY_INTERVAL: &str = "1mo";

pub struct YahooPriceSource {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteIndicator>,
    #[serde(default)]
    adjclose: Vec<AdjCloseIndicator>,
}

#[derive(Debug, Deserialize)]
struct QuoteIndicator {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseIndicator {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

impl YahooPriceSource {
    pub fn new() -> Result<Self, PriceSourceError> {
        Self::with_base_url(YCHART_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, PriceSourceError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()?;

        Ok(YahooPriceSource {
            client,
            base_url: base_url.into(),
        })
    }

    fn chart_url(&self, symbol: &str, range: &DateRange) -> Result<Url, PriceSourceError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| PriceSourceError::Parsing(format!("bad chart URL {}: {}", self.base_url, e)))?;

        url.path_segments_mut()
            .map_err(|_| PriceSourceError::Parsing(format!("chart URL {} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .push(symbol);

        // period2 is exclusive on Yahoo's side, so push it one day past the end
        let period1 = range.start.and_time(NaiveTime::MIN).and_utc().timestamp();
        let period2 = (range.end + Duration::days(1)).and_time(NaiveTime::MIN).and_utc().timestamp();

        url.query_pairs_mut()
            .append_pair("period1", &period1.to_string())
            .append_pair("period2", &period2.to_string())
            .append_pair("interval", MONTHLY_INTERVAL)
            .append_pair("includeAdjustedClose", "true");

        Ok(url)
    }
}

#[async_trait]
impl PriceSource for YahooPriceSource {
    async fn fetch_monthly_history(
        &self,
        symbol: &str,
        range: &DateRange,
    ) -> Result<Vec<PricePoint>, PriceSourceError> {
        let url = self.chart_url(symbol, range)?;
        info!("Fetching monthly history for {} from {}", symbol, url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        match parse_chart_response(symbol, &body) {
            Ok(points) => {
                info!("Received {} monthly prices for {}", points.len(), symbol);
                Ok(points)
            }
            Err(PriceSourceError::Parsing(msg)) if !status.is_success() => {
                warn!("Chart request for {} failed with {}: {}", symbol, status, msg);
                if status == StatusCode::NOT_FOUND {
                    Err(PriceSourceError::NotFound(symbol.to_string()))
                } else {
                    Err(PriceSourceError::Parsing(format!("HTTP {} for {}", status, symbol)))
                }
            }
            Err(e) => Err(e),
        }
    }

    fn name(&self) -> &'static str {
        "yahoo"
    }
}

/// Turns a v8 chart payload into monthly points, oldest first.
fn parse_chart_response(symbol: &str, body: &str) -> Result<Vec<PricePoint>, PriceSourceError> {
    let envelope: ChartEnvelope = serde_json::from_str(body)
        .map_err(|e| PriceSourceError::Parsing(format!("chart payload for {}: {}", symbol, e)))?;

    if let Some(err) = envelope.chart.error {
        warn!("Yahoo rejected {}: {} ({})", symbol, err.description, err.code);
        return Err(PriceSourceError::NotFound(format!("{}: {}", symbol, err.description)));
    }

    let result = envelope.chart.result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| PriceSourceError::NotFound(symbol.to_string()))?;

    let closes = result.indicators.quote.first().map(|q| q.close.as_slice()).unwrap_or(&[]);
    let adjusted = result.indicators.adjclose.first().map(|a| a.adjclose.as_slice()).unwrap_or(&[]);

    let mut points: Vec<PricePoint> = Vec::with_capacity(result.timestamp.len());
    for (i, ts) in result.timestamp.iter().enumerate() {
        let close = adjusted.get(i).copied().flatten()
            .or_else(|| closes.get(i).copied().flatten());

        let Some(close) = close else {
            debug!("Skipping {} row {} with no close", symbol, i);
            continue;
        };

        // Shift into exchange-local time before taking the calendar date
        let date = DateTime::<Utc>::from_timestamp(ts + result.meta.gmtoffset, 0)
            .ok_or_else(|| PriceSourceError::Parsing(format!("bad timestamp {} for {}", ts, symbol)))?
            .date_naive();

        match points.last_mut() {
            // Yahoo appends the running month as an extra row
            Some(last) if last.period_date.year() == date.year() && last.period_date.month() == date.month() => {
                last.closing_price = close;
            }
            _ => points.push(PricePoint::new(date, close)),
        }
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_prefers_adjusted_close() {
        let body = r#"{"chart":{"result":[{
            "meta":{"currency":"USD","symbol":"AAA","gmtoffset":-18000},
            "timestamp":[1704085200,1706763600],
            "indicators":{
                "quote":[{"close":[10.0,20.0]}],
                "adjclose":[{"adjclose":[9.5,19.5]}]
            }}],"error":null}}"#;

        let points = parse_chart_response("AAA", body).unwrap();
        assert_eq!(points, vec![
            PricePoint::new(ymd(2024, 1, 1), 9.5),
            PricePoint::new(ymd(2024, 2, 1), 19.5),
        ]);
    }

    #[test]
    fn test_parse_falls_back_to_close_and_skips_nulls() {
        let body = r#"{"chart":{"result":[{
            "meta":{"gmtoffset":0},
            "timestamp":[1704067200,1706745600,1709251200],
            "indicators":{"quote":[{"close":[10.0,null,30.0]}]}
            }],"error":null}}"#;

        let points = parse_chart_response("AAA", body).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1], PricePoint::new(ymd(2024, 3, 1), 30.0));
    }

    #[test]
    fn test_parse_merges_trailing_partial_month() {
        // 2024-02-01 and 2024-02-16, both midnight UTC
        let body = r#"{"chart":{"result":[{
            "meta":{"gmtoffset":0},
            "timestamp":[1706745600,1708041600],
            "indicators":{"quote":[{"close":[20.0,21.0]}]}
            }],"error":null}}"#;

        let points = parse_chart_response("AAA", body).unwrap();
        assert_eq!(points, vec![PricePoint::new(ymd(2024, 2, 1), 21.0)]);
    }

    #[test]
    fn test_parse_empty_window_is_not_an_error() {
        let body = r#"{"chart":{"result":[{
            "meta":{"gmtoffset":-18000},
            "indicators":{"quote":[{}],"adjclose":[{}]}
            }],"error":null}}"#;

        assert!(parse_chart_response("AAA", body).unwrap().is_empty());
    }

    #[test]
    fn test_parse_chart_error_is_not_found() {
        let body = r#"{"chart":{"result":null,"error":{
            "code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;

        match parse_chart_response("NOPE", body) {
            Err(PriceSourceError::NotFound(msg)) => assert!(msg.starts_with("NOPE")),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_chart_url_carries_window_and_interval() {
        let source = YahooPriceSource::with_base_url("https://example.com/v8/finance/chart").unwrap();
        let range = DateRange::new(ymd(2024, 1, 1), ymd(2024, 3, 1)).unwrap();
        let url = source.chart_url("^GSPC", &range).unwrap();

        assert!(url.path().starts_with("/v8/finance/chart/"));
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(query.contains(&("period1".to_string(), "1704067200".to_string())));
        assert!(query.contains(&("period2".to_string(), "1709337600".to_string())));
        assert!(query.contains(&("interval".to_string(), "1mo".to_string())));
    }
}
