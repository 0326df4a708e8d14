use thiserror::Error;

/// Errors raised while constructing draw values from raw fields
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DrawError {
    #[error("Invalid panel '{value}': expected exactly three digits")]
    InvalidPanel { value: String },

    #[error("Invalid double '{value}': expected exactly two digits")]
    InvalidDouble { value: String },

    #[error("Double out of range: {value} > 99")]
    DoubleOutOfRange { value: u8 },

    #[error("Invalid date range '{value}': {reason}")]
    InvalidDateRange { value: String, reason: String },
}

/// Errors related to fetching and parsing the published chart
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("No table found on the page")]
    NoTable,

    #[error("No data rows found in table")]
    NoDataRows,

    #[error("Insufficient columns in row: expected >={expected}, got {actual}")]
    InsufficientColumns { expected: usize, actual: usize },

    #[error("Invalid data in row for {date}: {reason}")]
    InvalidRow { date: String, reason: String },

    #[error(transparent)]
    Draw(#[from] DrawError),

    #[error("Request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    #[error("Request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    #[error("Request to {url} failed: {reason}")]
    Http { url: String, reason: String },
}

/// Errors raised at the boundary where external feature payloads enter the system
#[derive(Debug, Error, PartialEq)]
pub enum FeatureError {
    #[error("Unknown feature: {name}")]
    UnknownFeature { name: String },

    #[error("Feature {name} has a non-finite value")]
    NonFinite { name: String },
}

/// Errors related to the training pipeline
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("Insufficient training data: {available} samples available, {required} required")]
    InsufficientData { available: usize, required: usize },

    #[error("Invalid training configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Classifier failure: {reason}")]
    Classifier { reason: String },
}

/// Errors related to trained model artifacts and scoring
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model not found: {location}")]
    NotFound { location: String },

    #[error("Feature schema mismatch: model expects {expected} slots, runtime provides {actual}{detail}")]
    SchemaMismatch {
        expected: usize,
        actual: usize,
        detail: String,
    },

    #[error("Model artifact already exists: {path}")]
    AlreadyExists { path: String },

    #[error("Corrupt model artifact {path}: {reason}")]
    Corrupt { path: String, reason: String },

    #[error("Prediction failed: {reason}")]
    Prediction { reason: String },
}

/// Errors surfaced while scoring an external request
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_formatting() {
        let err = TrainingError::InsufficientData {
            available: 3,
            required: 60,
        };

        let msg = err.to_string();
        assert!(msg.contains("3 samples"));
        assert!(msg.contains("60 required"));
    }

    #[test]
    fn test_ingest_error_wraps_draw_error() {
        let err: IngestError = DrawError::InvalidPanel {
            value: "12".to_string(),
        }
        .into();
        assert!(err.to_string().contains("'12'"));
    }
}
