use crate::domain::draw::DrawRecord;
use crate::domain::errors::IngestError;
use async_trait::async_trait;

/// A live source of published draws
#[async_trait]
pub trait DrawSource: Send + Sync {
    /// The most recently published draw
    async fn fetch_latest(&self) -> Result<DrawRecord, IngestError>;
}
