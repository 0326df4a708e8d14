// Draw records and their value types
pub mod draw;

// Feature schema and label space
pub mod ml;

// Port interfaces
pub mod ports;

// Repository traits
pub mod repositories;

// Domain-specific error types
pub mod errors;
