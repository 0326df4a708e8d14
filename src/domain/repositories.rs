//! Repository Pattern Abstractions
//!
//! The draw history is append-only: records arrive in non-decreasing date
//! order and are never mutated or deleted.
//!
//! # Implementations
//!
//! - `SqliteDrawRepository`: persistent storage through sqlx
//! - `InMemoryDrawRepository`: `Arc<RwLock>` storage for tests and one-off runs

use crate::domain::draw::DrawRecord;
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Result of appending a draw to the history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Inserted,
    /// A draw for that date is already stored; the history is unchanged.
    Duplicate,
}

/// Append-only, date-ordered draw history
#[async_trait]
pub trait DrawRepository: Send + Sync {
    /// Append a draw. Fails when its date precedes the latest stored date.
    async fn append(&self, draw: &DrawRecord) -> Result<AppendOutcome>;

    /// All draws, ascending by date
    async fn find_all(&self) -> Result<Vec<DrawRecord>>;

    /// Draws strictly before `date`, ascending by date
    async fn find_before(&self, date: NaiveDate) -> Result<Vec<DrawRecord>>;

    /// The most recent draw
    async fn latest(&self) -> Result<Option<DrawRecord>>;

    async fn count(&self) -> Result<usize>;
}
