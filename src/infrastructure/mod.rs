pub mod chart;
pub mod core;
pub mod model_store;
pub mod observability;
pub mod persistence;
pub mod repositories;

pub use chart::ChartScraper;
pub use model_store::ModelStore;
pub use persistence::{Database, SqliteDrawRepository};
pub use repositories::InMemoryDrawRepository;
