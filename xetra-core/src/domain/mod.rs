//! Domain types: projected ticks and daily summary rows.

pub mod summary;
pub mod tick;

pub use summary::{DailyReport, DailySummary};
pub use tick::Tick;
