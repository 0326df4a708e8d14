//! Feature engineering over draw histories.

pub mod calendar;
pub mod digits;
pub mod engine;
pub mod transitions;

pub use engine::compute;
