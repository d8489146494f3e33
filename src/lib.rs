// Core data contracts and errors
pub mod core;

// Configuration and thresholds
pub mod config;

// Analysis pipeline stages
pub mod burst;
pub mod engine;
pub mod features;
pub mod forecast;
pub mod momentum;
pub mod recommend;
pub mod report;

// Re-export commonly used types for convenience
pub use crate::core::*;
pub use config::Config;
pub use engine::IntelligenceEngine;
