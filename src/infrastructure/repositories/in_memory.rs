//! In-Memory Repository Implementations
//!
//! Thread-safe, in-memory implementation of `DrawRepository`. Data is lost
//! when the process exits; used by tests and one-off runs that featurize a
//! freshly scraped chart without a database.

use crate::domain::draw::DrawRecord;
use crate::domain::repositories::{AppendOutcome, DrawRepository};
use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of DrawRepository
pub struct InMemoryDrawRepository {
    draws: Arc<RwLock<Vec<DrawRecord>>>,
}

impl InMemoryDrawRepository {
    pub fn new() -> Self {
        Self {
            draws: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for InMemoryDrawRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DrawRepository for InMemoryDrawRepository {
    async fn append(&self, draw: &DrawRecord) -> Result<AppendOutcome> {
        let mut draws = self.draws.write().await;
        if draws.iter().any(|d| d.date == draw.date) {
            return Ok(AppendOutcome::Duplicate);
        }
        if let Some(last) = draws.last()
            && draw.date < last.date
        {
            bail!(
                "Refusing to append draw for {}: history already extends to {}",
                draw.date,
                last.date
            );
        }
        draws.push(draw.clone());
        Ok(AppendOutcome::Inserted)
    }

    async fn find_all(&self) -> Result<Vec<DrawRecord>> {
        Ok(self.draws.read().await.clone())
    }

    async fn find_before(&self, date: NaiveDate) -> Result<Vec<DrawRecord>> {
        let draws = self.draws.read().await;
        Ok(draws.iter().filter(|d| d.date < date).cloned().collect())
    }

    async fn latest(&self) -> Result<Option<DrawRecord>> {
        Ok(self.draws.read().await.last().cloned())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.draws.read().await.len())
    }
}
