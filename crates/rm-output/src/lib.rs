//! `rm-output` — per-day output writers for the route_marl workspace.
//!
//! Three backends are provided behind Cargo features:
//!
//! | Feature   | Backend     | Files created                                       |
//! |-----------|-------------|-----------------------------------------------------|
//! | *(none)*  | CSV         | `travel_times.csv`, `day_summaries.csv`             |
//! | `sqlite`  | SQLite      | `output.db`                                         |
//! | `parquet` | Parquet     | `travel_times.parquet`, `day_summaries.parquet`     |
//!
//! All backends implement [`OutputWriter`] and are driven by
//! [`DayOutputObserver`], which implements `rm_sim::DayObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use rm_output::{open_writer, DayOutputObserver};
//!
//! let writer = open_writer(config.reporting.backend, &config.reporting.output_dir)?;
//! let mut obs = DayOutputObserver::new(writer, &config.reporting);
//! env.run(&mut policy, &mut obs)?;
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "parquet")]
pub mod parquet;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::DayOutputObserver;
pub use row::{DaySummaryRow, TravelTimeRow};
pub use writer::{open_writer, OutputWriter};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;

#[cfg(feature = "parquet")]
pub use parquet::ParquetWriter;
