//! Importing scraped draws into the append-only history.

use crate::domain::draw::DrawRecord;
use crate::domain::repositories::{AppendOutcome, DrawRepository};
use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

/// Counts from one history import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    /// Dates already stored
    pub duplicates: usize,
    /// Dates older than the latest stored draw
    pub stale: usize,
}

impl ImportSummary {
    pub fn skipped(&self) -> usize {
        self.duplicates + self.stale
    }
}

/// Append every record that extends the stored history.
///
/// Records dated before the latest stored draw are counted as stale and never
/// reach the repository, so a chart overlapping an already-extended history
/// imports its new tail instead of failing on its first row.
pub async fn import_draws(
    repository: &dyn DrawRepository,
    records: &[DrawRecord],
) -> Result<ImportSummary> {
    let mut ordered: Vec<&DrawRecord> = records.iter().collect();
    ordered.sort_by_key(|r| r.date);

    let cutoff = repository.latest().await?.map(|latest| latest.date);
    let mut summary = ImportSummary::default();
    for record in ordered {
        if let Some(cutoff) = cutoff
            && record.date < cutoff
        {
            debug!("Skipping {}: history already extends to {}", record.date, cutoff);
            summary.stale += 1;
            continue;
        }
        match repository.append(record).await? {
            AppendOutcome::Inserted => summary.imported += 1,
            AppendOutcome::Duplicate => summary.duplicates += 1,
        }
    }

    info!(
        "Imported {} draws ({} already stored, {} older than stored history)",
        summary.imported, summary.duplicates, summary.stale
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::draw::DrawProvenance;
    use crate::infrastructure::InMemoryDrawRepository;
    use chrono::Utc;

    fn draw(date: &str) -> DrawRecord {
        DrawRecord::new(
            date.parse().unwrap(),
            "123".parse().unwrap(),
            "456".parse().unwrap(),
            "61".parse().unwrap(),
            DrawProvenance {
                raw_source: String::new(),
                source_url: String::new(),
                fetched_at: Utc::now(),
            },
        )
    }

    #[tokio::test]
    async fn test_unordered_input_is_imported_in_date_order() {
        let repo = InMemoryDrawRepository::new();
        let records = vec![draw("2024-01-03"), draw("2024-01-01"), draw("2024-01-02")];

        let summary = import_draws(&repo, &records).await.unwrap();
        assert_eq!(summary.imported, 3);
        assert_eq!(summary.skipped(), 0);
        assert_eq!(repo.latest().await.unwrap().unwrap().date.to_string(), "2024-01-03");
    }

    #[tokio::test]
    async fn test_older_records_are_stale_not_errors() {
        let repo = InMemoryDrawRepository::new();
        repo.append(&draw("2024-01-02")).await.unwrap();

        let records = vec![draw("2024-01-01"), draw("2024-01-02"), draw("2024-01-03")];
        let summary = import_draws(&repo, &records).await.unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                imported: 1,
                duplicates: 1,
                stale: 1,
            }
        );
        assert_eq!(repo.count().await.unwrap(), 2);
    }
}
