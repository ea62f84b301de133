// src/config.rs
use anyhow::{anyhow, Context, Result};
use log::info;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use crate::services::aggregator::{Aggregator, Alignment, ValidityPolicy};
use crate::services::csv_source::CsvPriceSource;
use crate::services::price_source::PriceSource;
use crate::services::simulator::Simulator;
use crate::services::yahoo::{YahooPriceSource, YCHART_URL};

const DEFAULT_PORT: u16 = 3030;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub port: u16,
    pub yahoo_chart_url: String,
    pub price_data_dir: Option<PathBuf>,
    pub validity: ValidityPolicy,
    pub alignment: Alignment,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            port: DEFAULT_PORT,
            yahoo_chart_url: YCHART_URL.to_string(),
            price_data_dir: None,
            validity: ValidityPolicy::default(),
            alignment: Alignment::default(),
        }
    }
}

impl AppConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(port) = lookup("PORT") {
            config.port = port
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a number, got '{}'", port))?;
        }

        if let Some(url) = lookup("YAHOO_CHART_URL") {
            config.yahoo_chart_url = url;
        }

        config.price_data_dir = lookup("PRICE_DATA_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        if let Some(policy) = lookup("VALIDITY_POLICY") {
            config.validity = policy.parse().map_err(|e| anyhow!("VALIDITY_POLICY: {}", e))?;
        }

        if let Some(alignment) = lookup("ALIGNMENT") {
            config.alignment = alignment.parse().map_err(|e| anyhow!("ALIGNMENT: {}", e))?;
        }

        Ok(config)
    }

    pub fn price_source(&self) -> Result<Arc<dyn PriceSource>> {
        match &self.price_data_dir {
            Some(dir) => {
                info!("Using CSV price files from {}", dir.display());
                Ok(Arc::new(CsvPriceSource::new(dir.clone())))
            }
            None => {
                info!("Using Yahoo Finance chart API at {}", self.yahoo_chart_url);
                let source = YahooPriceSource::with_base_url(self.yahoo_chart_url.clone())
                    .context("Failed to build Yahoo HTTP client")?;
                Ok(Arc::new(source))
            }
        }
    }

    pub fn aggregator(&self) -> Result<Aggregator> {
        let simulator = Simulator::new(self.price_source()?);
        Ok(Aggregator::new(simulator)
            .with_validity(self.validity)
            .with_alignment(self.alignment))
    }
}
