pub mod classifier;
pub mod cross_validation;
pub mod dataset;
pub mod grid_search;
pub mod metrics;
pub mod model;
pub mod predictor;
pub mod scorer;
pub mod trainer;
