// src/services/report.rs
use chrono::NaiveDate;
use serde::Serialize;

use crate::models::RunResult;

#[derive(Debug, Clone, Serialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartSeries {
    pub label: String,
    pub points: Vec<ChartPoint>,
}

/// Everything a front-end needs to draw the invested-vs-value line chart.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<ChartSeries>,
}

/// Formats a currency amount with two decimals and comma thousands separators.
pub fn format_currency(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    // -0.00 would be noise
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, cents)
}

pub fn format_percent(pct: f64) -> String {
    format!("{:.2}%", pct)
}

pub fn summary_text(result: &RunResult) -> String {
    let mut text = format!(
        "Combined total invested: ${}\nCombined total investment value: ${}",
        format_currency(result.total_invested),
        format_currency(result.total_value)
    );
    if !result.skipped_symbols.is_empty() {
        text.push_str(&format!("\nSkipped symbols: {}", result.skipped_symbols.join(", ")));
    }
    text
}

pub fn chart(result: &RunResult) -> ChartSpec {
    let value_points = result
        .rows
        .iter()
        .map(|r| ChartPoint { date: r.period_date, value: r.total_value })
        .collect();
    let invested_points = result
        .rows
        .iter()
        .map(|r| ChartPoint { date: r.period_date, value: r.total_invested })
        .collect();

    ChartSpec {
        title: format!(
            "Combined Investment Simulation\nReturn: {}",
            format_percent(result.percentage_return)
        ),
        x_label: "Date".to_string(),
        y_label: "Value in USD".to_string(),
        series: vec![
            ChartSeries {
                label: format!(
                    "Combined Investment Total Value: ${}",
                    format_currency(result.total_value)
                ),
                points: value_points,
            },
            ChartSeries {
                label: format!(
                    "Combined Total Invested: ${}",
                    format_currency(result.total_invested)
                ),
                points: invested_points,
            },
        ],
    }
}

/// Plain-text table of the combined series for terminal output.
pub fn table(result: &RunResult) -> String {
    let mut out = format!("{:<12} {:>18} {:>18}\n", "Date", "Invested", "Value");
    for row in &result.rows {
        out.push_str(&format!(
            "{:<12} {:>18} {:>18}\n",
            row.period_date.format("%Y-%m-%d").to_string(),
            format_currency(row.total_invested),
            format_currency(row.total_value)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CombinedRow, DateRange};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_result() -> RunResult {
        RunResult {
            symbols: vec!["AAA".to_string(), "BBB".to_string()],
            per_symbol_amount: 50.0,
            range: DateRange::new(ymd(2024, 1, 1), ymd(2024, 2, 28)).unwrap(),
            total_invested: 200.0,
            total_value: 250.0,
            percentage_return: 25.0,
            rows: vec![
                CombinedRow { period_date: ymd(2024, 1, 1), total_invested: 100.0, total_value: 100.0 },
                CombinedRow { period_date: ymd(2024, 2, 1), total_invested: 200.0, total_value: 250.0 },
            ],
            skipped_symbols: vec![],
        }
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "0.00");
        assert_eq!(format_currency(999.999), "1,000.00");
        assert_eq!(format_currency(1234567.891), "1,234,567.89");
        assert_eq!(format_currency(123456.0), "123,456.00");
        assert_eq!(format_currency(-9876.5), "-9,876.50");
        assert_eq!(format_currency(-0.001), "0.00");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(25.0), "25.00%");
        assert_eq!(format_percent(-3.14159), "-3.14%");
    }

    #[test]
    fn test_summary_text() {
        let text = summary_text(&sample_result());
        assert_eq!(
            text,
            "Combined total invested: $200.00\nCombined total investment value: $250.00"
        );
    }

    #[test]
    fn test_summary_mentions_skipped_symbols() {
        let mut result = sample_result();
        result.skipped_symbols = vec!["NOPE".to_string()];
        assert!(summary_text(&result).ends_with("Skipped symbols: NOPE"));
    }

    #[test]
    fn test_chart_has_value_and_invested_series() {
        let c = chart(&sample_result());

        assert_eq!(c.title, "Combined Investment Simulation\nReturn: 25.00%");
        assert_eq!(c.series.len(), 2);
        assert_eq!(c.series[0].label, "Combined Investment Total Value: $250.00");
        assert_eq!(c.series[1].label, "Combined Total Invested: $200.00");
        assert_eq!(c.series[0].points[1].value, 250.0);
        assert_eq!(c.series[1].points[1].value, 200.0);
        assert_eq!(c.series[1].points[0].date, ymd(2024, 1, 1));
    }

    #[test]
    fn test_table_has_header_and_one_line_per_row() {
        let out = table(&sample_result());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[2].starts_with("2024-02-01"));
        assert!(lines[2].ends_with("250.00"));
    }
}
