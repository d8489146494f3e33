/// Actionable recommendations from the combined signals

pub mod generator;

pub use generator::{generate, sort_recommendations};
