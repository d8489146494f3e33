/// Momentum classification from the EMA triple

pub mod classifier;

pub use classifier::classify;
