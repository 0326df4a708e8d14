//! Inference scoring against an injected, already-loaded model.

use super::predictor::DoublePredictor;
use crate::domain::errors::{ModelError, ScoringError};
use crate::domain::ml::feature_registry::{FEATURE_COUNT, FEATURE_NAMES, FeatureVector, schema_matches};
use crate::domain::ml::label_space::{LABEL_COUNT, label_key, ranked_labels};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// External scoring request: a name→value mapping of feature slots.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoreRequest {
    #[serde(default)]
    pub features: HashMap<String, f64>,
}

impl ScoreRequest {
    pub fn to_feature_vector(&self) -> Result<FeatureVector, ScoringError> {
        Ok(FeatureVector::from_named(&self.features)?)
    }
}

/// Distribution over every label plus the most probable one
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub scores: BTreeMap<String, f64>,
    pub top_prediction: String,
    pub confidence: f64,
}

pub struct InferenceScorer {
    predictor: Arc<dyn DoublePredictor>,
}

impl InferenceScorer {
    /// Refuses a model trained against a different feature schema.
    pub fn new(predictor: Arc<dyn DoublePredictor>) -> Result<Self, ModelError> {
        let names = predictor.feature_names();
        if !schema_matches(names) {
            let detail = names
                .iter()
                .zip(FEATURE_NAMES)
                .position(|(a, b)| a != b)
                .map(|idx| {
                    format!(
                        " (slot {}: model '{}', runtime '{}')",
                        idx, names[idx], FEATURE_NAMES[idx]
                    )
                })
                .unwrap_or_default();
            return Err(ModelError::SchemaMismatch {
                expected: names.len(),
                actual: FEATURE_COUNT,
                detail,
            });
        }
        Ok(Self { predictor })
    }

    pub fn model_version(&self) -> &str {
        self.predictor.version()
    }

    pub fn score(&self, features: &FeatureVector) -> Result<Prediction, ModelError> {
        let probs = self.predictor.predict_proba(features)?;
        if probs.len() != LABEL_COUNT {
            return Err(ModelError::Prediction {
                reason: format!("expected {} probabilities, got {}", LABEL_COUNT, probs.len()),
            });
        }

        let top = ranked_labels(&probs)
            .first()
            .copied()
            .ok_or_else(|| ModelError::Prediction {
                reason: "empty distribution".to_string(),
            })?;
        let scores = probs
            .iter()
            .enumerate()
            .map(|(label, &p)| (label_key(label), p))
            .collect();

        Ok(Prediction {
            scores,
            top_prediction: label_key(top),
            confidence: probs[top],
        })
    }

    pub fn score_request(&self, request: &ScoreRequest) -> Result<Prediction, ScoringError> {
        let features = request.to_feature_vector()?;
        Ok(self.score(&features)?)
    }
}
