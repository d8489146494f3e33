/// Burst and anomaly detection against the expected baseline

pub mod detector;

pub use detector::{detect, BurstInput};
