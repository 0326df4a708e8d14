pub mod feature_registry;
pub mod label_space;
