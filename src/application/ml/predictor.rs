use crate::domain::errors::ModelError;
use crate::domain::ml::feature_registry::FeatureVector;

/// Interface for models that score a feature vector against the label space
pub trait DoublePredictor: Send + Sync {
    /// Probability for each label 00-99, indexed by label.
    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, ModelError>;

    /// Ordered feature names the model was trained against
    fn feature_names(&self) -> &[String];

    /// Get model name/type
    fn name(&self) -> &str;

    /// Get model version/id
    fn version(&self) -> &str;
}
