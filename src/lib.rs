//! bodylog - Body metrics tracker
//!
//! Merges the latest height, weight and body fat records from a health-data
//! provider into one row per calendar day.

pub mod aggregate;
pub mod db;
pub mod format;
pub mod health;
pub mod metrics;
pub mod timer;
pub mod units;

pub use aggregate::{DailyAggregate, aggregate_records_by_date};
pub use db::Database;
