//! Parquet output backend (feature `parquet`).
//!
//! Creates two files in the configured output directory:
//! - `travel_times.parquet`
//! - `day_summaries.parquet`
//!
//! Optional values are nullable `Float64` columns.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Float64Builder, StringBuilder, UInt16Builder, UInt32Builder, UInt64Builder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::writer::OutputWriter;
use crate::{DaySummaryRow, OutputResult, TravelTimeRow};

fn travel_time_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("day",         DataType::UInt64,  false),
        Field::new("phase",       DataType::Utf8,    false),
        Field::new("agent_id",    DataType::UInt32,  false),
        Field::new("kind",        DataType::Utf8,    false),
        Field::new("action",      DataType::UInt16,  false),
        Field::new("origin",      DataType::UInt32,  false),
        Field::new("destination", DataType::UInt32,  false),
        Field::new("start_time",  DataType::UInt32,  false),
        Field::new("travel_time", DataType::Float64, false),
        Field::new("reward",      DataType::Float64, true),
        Field::new("cost_table",  DataType::Utf8,    false),
    ]))
}

fn summary_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("day",                      DataType::UInt64,  false),
        Field::new("phase",                    DataType::Utf8,    false),
        Field::new("humans",                   DataType::UInt64,  false),
        Field::new("machines",                 DataType::UInt64,  false),
        Field::new("mean_travel_time",         DataType::Float64, false),
        Field::new("mean_human_travel_time",   DataType::Float64, true),
        Field::new("mean_machine_travel_time", DataType::Float64, true),
        Field::new("smoothed_travel_time",     DataType::Float64, false),
    ]))
}

fn snappy_props() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build()
}

/// Writes run output to two Parquet files.
///
/// `finish()` **must** be called to write the Parquet file footer; files
/// written without calling `finish()` cannot be opened by Parquet readers.
pub struct ParquetWriter {
    travel_times: Option<ArrowWriter<File>>,
    summaries:    Option<ArrowWriter<File>>,
    tt_schema:    Arc<Schema>,
    summ_schema:  Arc<Schema>,
}

impl ParquetWriter {
    /// Create both Parquet files in `dir`.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let tt_schema = travel_time_schema();
        let summ_schema = summary_schema();

        let tt_file = File::create(dir.join("travel_times.parquet"))?;
        let travel_times = ArrowWriter::try_new(tt_file, Arc::clone(&tt_schema), Some(snappy_props()))?;

        let summ_file = File::create(dir.join("day_summaries.parquet"))?;
        let summaries = ArrowWriter::try_new(summ_file, Arc::clone(&summ_schema), Some(snappy_props()))?;

        Ok(Self {
            travel_times: Some(travel_times),
            summaries:    Some(summaries),
            tt_schema,
            summ_schema,
        })
    }
}

impl OutputWriter for ParquetWriter {
    fn write_travel_times(&mut self, rows: &[TravelTimeRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.travel_times.as_mut() else {
            return Ok(());
        };

        let mut days         = UInt64Builder::new();
        let mut phases       = StringBuilder::new();
        let mut agent_ids    = UInt32Builder::new();
        let mut kinds        = StringBuilder::new();
        let mut actions      = UInt16Builder::new();
        let mut origins      = UInt32Builder::new();
        let mut destinations = UInt32Builder::new();
        let mut starts       = UInt32Builder::new();
        let mut times        = Float64Builder::new();
        let mut rewards      = Float64Builder::new();
        let mut tables       = StringBuilder::new();

        for row in rows {
            days.append_value(row.day);
            phases.append_value(&row.phase);
            agent_ids.append_value(row.agent_id);
            kinds.append_value(row.kind);
            actions.append_value(row.action);
            origins.append_value(row.origin);
            destinations.append_value(row.destination);
            starts.append_value(row.start_time);
            times.append_value(row.travel_time);
            rewards.append_option(row.reward);
            tables.append_value(&row.cost_table);
        }

        let batch = RecordBatch::try_new(
            Arc::clone(&self.tt_schema),
            vec![
                Arc::new(days.finish()),
                Arc::new(phases.finish()),
                Arc::new(agent_ids.finish()),
                Arc::new(kinds.finish()),
                Arc::new(actions.finish()),
                Arc::new(origins.finish()),
                Arc::new(destinations.finish()),
                Arc::new(starts.finish()),
                Arc::new(times.finish()),
                Arc::new(rewards.finish()),
                Arc::new(tables.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn write_day_summary(&mut self, row: &DaySummaryRow) -> OutputResult<()> {
        let Some(writer) = self.summaries.as_mut() else {
            return Ok(());
        };

        let mut days     = UInt64Builder::new();
        let mut phases   = StringBuilder::new();
        let mut humans   = UInt64Builder::new();
        let mut machines = UInt64Builder::new();
        let mut mean     = Float64Builder::new();
        let mut human    = Float64Builder::new();
        let mut machine  = Float64Builder::new();
        let mut smoothed = Float64Builder::new();

        days.append_value(row.day);
        phases.append_value(&row.phase);
        humans.append_value(row.humans);
        machines.append_value(row.machines);
        mean.append_value(row.mean_travel_time);
        human.append_option(row.mean_human_travel_time);
        machine.append_option(row.mean_machine_travel_time);
        smoothed.append_value(row.smoothed_travel_time);

        let batch = RecordBatch::try_new(
            Arc::clone(&self.summ_schema),
            vec![
                Arc::new(days.finish()),
                Arc::new(phases.finish()),
                Arc::new(humans.finish()),
                Arc::new(machines.finish()),
                Arc::new(mean.finish()),
                Arc::new(human.finish()),
                Arc::new(machine.finish()),
                Arc::new(smoothed.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if let Some(w) = self.travel_times.take() {
            w.close()?;
        }
        if let Some(w) = self.summaries.take() {
            w.close()?;
        }
        Ok(())
    }
}
