use super::parser::{self, ChartHistory};
use crate::domain::draw::DrawRecord;
use crate::domain::errors::IngestError;
use crate::domain::ports::DrawSource;
use crate::infrastructure::core::HttpClientFactory;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use tracing::info;

/// Fetches the published panel chart. One request per call, no retries.
pub struct ChartScraper {
    client: Client,
    url: String,
    timeout_secs: u64,
}

impl ChartScraper {
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> anyhow::Result<Self> {
        Ok(Self {
            client: HttpClientFactory::create_client(timeout_secs)?,
            url: url.into(),
            timeout_secs,
        })
    }

    async fn fetch_page(&self) -> Result<String, IngestError> {
        info!("Fetching chart from {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }
        response.text().await.map_err(|e| self.request_error(e))
    }

    fn request_error(&self, e: reqwest::Error) -> IngestError {
        if e.is_timeout() {
            IngestError::Timeout {
                url: self.url.clone(),
                timeout_secs: self.timeout_secs,
            }
        } else {
            IngestError::Http {
                url: self.url.clone(),
                reason: e.to_string(),
            }
        }
    }

    /// Whole chart with the count of rejected day slots.
    pub async fn fetch_chart(&self) -> Result<ChartHistory, IngestError> {
        let html = self.fetch_page().await?;
        let chart = parser::parse_history(&html, &self.url, Utc::now())?;
        info!(
            "Parsed {} draws from chart ({} day slots skipped)",
            chart.records.len(),
            chart.skipped
        );
        Ok(chart)
    }
}

#[async_trait]
impl DrawSource for ChartScraper {
    async fn fetch_latest(&self) -> Result<DrawRecord, IngestError> {
        let html = self.fetch_page().await?;
        let record = parser::parse_latest(&html, &self.url, Utc::now())?;
        info!("Latest draw: {} ({})", record.draw_id(), record.date);
        Ok(record)
    }
}
