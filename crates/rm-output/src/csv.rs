//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `travel_times.csv`
//! - `day_summaries.csv`
//!
//! Missing optional values (a human's reward, the mean of an empty group)
//! are written as empty fields.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{DaySummaryRow, OutputResult, TravelTimeRow};

pub const TRAVEL_TIME_HEADER: [&str; 11] = [
    "day", "phase", "agent_id", "kind", "action", "origin", "destination",
    "start_time", "travel_time", "reward", "cost_table",
];

pub const DAY_SUMMARY_HEADER: [&str; 8] = [
    "day", "phase", "humans", "machines", "mean_travel_time",
    "mean_human_travel_time", "mean_machine_travel_time", "smoothed_travel_time",
];

fn opt(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

/// Writes run output to two CSV files.
pub struct CsvWriter {
    travel_times: Writer<File>,
    summaries:    Writer<File>,
    finished:     bool,
}

impl CsvWriter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut travel_times = Writer::from_path(dir.join("travel_times.csv"))?;
        travel_times.write_record(TRAVEL_TIME_HEADER)?;

        let mut summaries = Writer::from_path(dir.join("day_summaries.csv"))?;
        summaries.write_record(DAY_SUMMARY_HEADER)?;

        Ok(Self { travel_times, summaries, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_travel_times(&mut self, rows: &[TravelTimeRow]) -> OutputResult<()> {
        for row in rows {
            self.travel_times.write_record(&[
                row.day.to_string(),
                row.phase.clone(),
                row.agent_id.to_string(),
                row.kind.to_owned(),
                row.action.to_string(),
                row.origin.to_string(),
                row.destination.to_string(),
                row.start_time.to_string(),
                row.travel_time.to_string(),
                opt(row.reward),
                row.cost_table.clone(),
            ])?;
        }
        Ok(())
    }

    fn write_day_summary(&mut self, row: &DaySummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.day.to_string(),
            row.phase.clone(),
            row.humans.to_string(),
            row.machines.to_string(),
            row.mean_travel_time.to_string(),
            opt(row.mean_human_travel_time),
            opt(row.mean_machine_travel_time),
            row.smoothed_travel_time.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.travel_times.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
