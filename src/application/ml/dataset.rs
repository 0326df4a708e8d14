//! Labeled dataset assembly.
//!
//! Each draw in the history becomes one row: the features computed from the
//! draws strictly before its date, labeled with its own double.

use crate::application::features;
use crate::domain::draw::DrawRecord;
use crate::domain::ml::feature_registry::{FEATURE_NAMES, FeatureVector};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::borrow::Cow;
use std::fs::File;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct LabeledDataset {
    pub dates: Vec<NaiveDate>,
    pub features: Vec<FeatureVector>,
    pub labels: Vec<u8>,
}

impl LabeledDataset {
    /// Build from a draw history. Out-of-order input is sorted by date first.
    pub fn from_history(history: &[DrawRecord]) -> Self {
        let history: Cow<'_, [DrawRecord]> = if history.is_sorted_by_key(|r| r.date) {
            Cow::Borrowed(history)
        } else {
            let mut sorted = history.to_vec();
            sorted.sort_by_key(|r| r.date);
            Cow::Owned(sorted)
        };

        let mut dataset = Self::default();
        for record in history.iter() {
            dataset.dates.push(record.date);
            dataset
                .features
                .push(features::compute(&history, record.date));
            dataset.labels.push(record.double.value());
        }
        dataset
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Feature rows in schema order.
    pub fn matrix(&self) -> Vec<Vec<f64>> {
        self.features.iter().map(FeatureVector::to_vec).collect()
    }

    /// Write `date,label,<schema...>` rows as CSV.
    pub fn export_csv(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).context("Failed to create dataset directory")?;
        }
        let file = File::create(path)
            .with_context(|| format!("Failed to create dataset file {:?}", path))?;
        let mut wtr = csv::Writer::from_writer(file);

        let mut header = vec!["date".to_string(), "label".to_string()];
        header.extend(FEATURE_NAMES.iter().map(|n| n.to_string()));
        wtr.write_record(&header)?;

        for ((date, fv), label) in self.dates.iter().zip(&self.features).zip(&self.labels) {
            let mut row = vec![date.to_string(), format!("{:02}", label)];
            row.extend(fv.as_slice().iter().map(|v| v.to_string()));
            wtr.write_record(&row)?;
        }
        wtr.flush().context("Failed to flush CSV writer")?;

        info!("Dataset exported to {:?} with {} rows", path, self.len());
        Ok(())
    }
}
