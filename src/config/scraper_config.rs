//! Chart scraper configuration parsing from environment variables.

use anyhow::{Context, Result};
use std::env;

pub const DEFAULT_SCRAPE_URL: &str =
    "https://dpboss.boston/panel-chart-record/main-bazar.php?full_chart";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Scraper environment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ScraperEnvConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for ScraperEnvConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SCRAPE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ScraperEnvConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let timeout_secs = match lookup("SCRAPE_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .context("Failed to parse SCRAPE_TIMEOUT_SECS")?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            anyhow::bail!("SCRAPE_TIMEOUT_SECS must be positive");
        }
        Ok(Self {
            url: lookup("SCRAPE_URL").unwrap_or_else(|| DEFAULT_SCRAPE_URL.to_string()),
            timeout_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scraper_config_defaults() {
        let config = ScraperEnvConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.timeout_secs, 15);
        assert!(config.url.contains("main-bazar"));
    }

    #[test]
    fn test_scraper_config_rejects_bad_timeout() {
        let lookup = |value: &'static str| {
            move |key: &str| (key == "SCRAPE_TIMEOUT_SECS").then(|| value.to_string())
        };
        assert!(ScraperEnvConfig::from_lookup(lookup("abc")).is_err());
        assert!(ScraperEnvConfig::from_lookup(lookup("0")).is_err());
        assert_eq!(ScraperEnvConfig::from_lookup(lookup("3")).unwrap().timeout_secs, 3);
    }
}
