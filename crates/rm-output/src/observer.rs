//! `DayOutputObserver<W>` — bridges `DayObserver` to an `OutputWriter`.

use std::collections::VecDeque;

use tracing::warn;

use rm_core::{Day, Phase, ReportingConfig};
use rm_sim::{DayObserver, DayReport, TravelTimeRecord};

use crate::row::{DaySummaryRow, TravelTimeRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`DayObserver`] that writes travel-time rows and day summaries to any
/// [`OutputWriter`] backend (CSV, SQLite, Parquet, …).
///
/// Records are buffered per day and written as one batch when the day ends.
/// Errors from the writer are stored internally because `DayObserver`
/// methods have no return value.  After `env.run()` returns, check for
/// errors with [`take_error`][Self::take_error].
pub struct DayOutputObserver<W: OutputWriter> {
    writer:      W,
    reporting:   ReportingConfig,
    smooth_by:   usize,
    window:      VecDeque<f64>,
    pending:     Vec<TravelTimeRow>,
    last_error:  Option<OutputError>,
}

impl<W: OutputWriter> DayOutputObserver<W> {
    /// Create an observer backed by `writer`, labelling phases and smoothing
    /// summaries as `reporting` says.
    pub fn new(writer: W, reporting: &ReportingConfig) -> Self {
        Self {
            writer,
            smooth_by:   reporting.smooth_by.max(1),
            reporting:   reporting.clone(),
            window:      VecDeque::new(),
            pending:     Vec::new(),
            last_error:  None,
        }
    }

    /// Take the stored write error (if any) after `env.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Flush the writer.  Needed only when a run ended early; a completed
    /// run finishes the writer itself.
    pub fn finish(&mut self) -> OutputResult<()> {
        self.writer.finish()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Trailing mean including `latest`.
    fn smooth(&mut self, latest: f64) -> f64 {
        if self.window.len() == self.smooth_by {
            self.window.pop_front();
        }
        self.window.push_back(latest);
        self.window.iter().sum::<f64>() / self.window.len() as f64
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                warn!(error = %e, "output write failed; further errors are dropped");
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> DayObserver for DayOutputObserver<W> {
    fn on_day_start(&mut self, _day: Day, _phase: Phase) {
        self.pending.clear();
    }

    fn on_record(&mut self, record: &TravelTimeRecord) {
        let row = TravelTimeRow::from_record(record, self.reporting.phase_label(record.phase));
        match row {
            Ok(row) => self.pending.push(row),
            Err(e) => self.store_err(Err(e)),
        }
    }

    fn on_day_end(&mut self, report: &DayReport) {
        let rows = std::mem::take(&mut self.pending);
        let result = self.writer.write_travel_times(&rows);
        self.store_err(result);

        let row = DaySummaryRow {
            day:                      report.day.0,
            phase:                    self.reporting.phase_label(report.phase).to_owned(),
            humans:                   report.humans as u64,
            machines:                 report.machines as u64,
            mean_travel_time:         report.mean_travel_time,
            mean_human_travel_time:   report.mean_human_travel_time,
            mean_machine_travel_time: report.mean_machine_travel_time,
            smoothed_travel_time:     self.smooth(report.mean_travel_time),
        };
        let result = self.writer.write_day_summary(&row);
        self.store_err(result);
    }

    fn on_run_end(&mut self, _days_completed: u64) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
