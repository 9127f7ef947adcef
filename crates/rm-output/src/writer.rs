//! The `OutputWriter` trait implemented by all backend writers.

use std::path::Path;

use rm_core::OutputBackend;

use crate::{CsvWriter, DaySummaryRow, OutputResult, TravelTimeRow};

/// Trait implemented by CSV, SQLite, and Parquet writers.
///
/// The observer never propagates these errors.  The first one is kept and
/// can be retrieved with
/// [`DayOutputObserver::take_error`][crate::DayOutputObserver::take_error].
pub trait OutputWriter {
    /// Write one day's travel-time rows.
    fn write_travel_times(&mut self, rows: &[TravelTimeRow]) -> OutputResult<()>;

    /// Write one day summary row.
    fn write_day_summary(&mut self, row: &DaySummaryRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Calling it again is a no-op.
    fn finish(&mut self) -> OutputResult<()>;
}

impl<W: OutputWriter + ?Sized> OutputWriter for Box<W> {
    fn write_travel_times(&mut self, rows: &[TravelTimeRow]) -> OutputResult<()> {
        (**self).write_travel_times(rows)
    }

    fn write_day_summary(&mut self, row: &DaySummaryRow) -> OutputResult<()> {
        (**self).write_day_summary(row)
    }

    fn finish(&mut self) -> OutputResult<()> {
        (**self).finish()
    }
}

/// Create `dir` if needed and open the writer for `backend`.
///
/// Fails with [`OutputError::BackendUnavailable`][crate::OutputError::BackendUnavailable] when the backend's Cargo
/// feature is off.
pub fn open_writer(backend: OutputBackend, dir: &Path) -> OutputResult<Box<dyn OutputWriter>> {
    std::fs::create_dir_all(dir)?;
    match backend {
        OutputBackend::Csv => Ok(Box::new(CsvWriter::new(dir)?)),

        #[cfg(feature = "sqlite")]
        OutputBackend::Sqlite => Ok(Box::new(crate::SqliteWriter::new(dir)?)),
        #[cfg(not(feature = "sqlite"))]
        OutputBackend::Sqlite => Err(crate::OutputError::BackendUnavailable("sqlite")),

        #[cfg(feature = "parquet")]
        OutputBackend::Parquet => Ok(Box::new(crate::ParquetWriter::new(dir)?)),
        #[cfg(not(feature = "parquet"))]
        OutputBackend::Parquet => Err(crate::OutputError::BackendUnavailable("parquet")),
    }
}
