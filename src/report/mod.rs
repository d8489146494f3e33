/// Weekly portfolio report across analyzed products

pub mod ranker;

pub use ranker::{weekly_report, WeeklyReport};
