//! Integration tests for rm-output.

use tempfile::TempDir;

use crate::row::{DaySummaryRow, TravelTimeRow};

fn tmp() -> TempDir {
    tempfile::tempdir().expect("create temp dir")
}

fn trip_row(agent_id: u32, day: u64, reward: Option<f64>) -> TravelTimeRow {
    TravelTimeRow {
        day,
        phase:       "Training".to_owned(),
        agent_id,
        kind:        if reward.is_some() { "machine" } else { "human" },
        action:      1,
        origin:      0,
        destination: 3,
        start_time:  agent_id * 60,
        travel_time: 612.5,
        reward,
        cost_table:  "[600.0,720.0]".to_owned(),
    }
}

fn summary_row(day: u64) -> DaySummaryRow {
    DaySummaryRow {
        day,
        phase:                    "Human learning".to_owned(),
        humans:                   10,
        machines:                 0,
        mean_travel_time:         640.0,
        mean_human_travel_time:   Some(640.0),
        mean_machine_travel_time: None,
        smoothed_travel_time:     650.0,
    }
}

fn headers(path: &std::path::Path) -> Vec<String> {
    let mut rdr = csv::Reader::from_path(path).unwrap();
    rdr.headers().unwrap().iter().map(str::to_owned).collect()
}

#[cfg(test)]
mod rows {
    use rm_core::{AgentId, AgentKind, Day, NodeId, PathIndex, Phase};
    use rm_sim::TravelTimeRecord;

    use crate::TravelTimeRow;

    #[test]
    fn record_converts_with_json_cost_table() {
        let record = TravelTimeRecord {
            day:         Day(4),
            phase:       Phase::PostMutation,
            agent:       AgentId(7),
            kind:        AgentKind::Machine,
            action:      PathIndex(1),
            origin:      NodeId(0),
            destination: NodeId(3),
            start_time:  90,
            travel_time: 700.0,
            reward:      Some(-700.0),
            cost_table:  vec![610.5, 700.0],
        };
        let row = TravelTimeRow::from_record(&record, "Training").unwrap();
        assert_eq!(row.day, 4);
        assert_eq!(row.phase, "Training");
        assert_eq!(row.agent_id, 7);
        assert_eq!(row.kind, "machine");
        assert_eq!(row.action, 1);
        assert_eq!(row.reward, Some(-700.0));
        assert_eq!(row.cost_table, "[610.5,700.0]");
    }
}

#[cfg(test)]
mod csv_tests {
    use super::{headers, summary_row, tmp, trip_row};
    use crate::csv::{CsvWriter, DAY_SUMMARY_HEADER, TRAVEL_TIME_HEADER};
    use crate::writer::OutputWriter;

    #[test]
    fn csv_files_created_with_headers() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        assert_eq!(headers(&dir.path().join("travel_times.csv")), TRAVEL_TIME_HEADER);
        assert_eq!(headers(&dir.path().join("day_summaries.csv")), DAY_SUMMARY_HEADER);
        assert_eq!(
            TRAVEL_TIME_HEADER,
            ["day", "phase", "agent_id", "kind", "action", "origin", "destination",
             "start_time", "travel_time", "reward", "cost_table"]
        );
    }

    #[test]
    fn csv_travel_time_rows() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_travel_times(&[trip_row(0, 2, None), trip_row(1, 2, Some(-612.5))]).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("travel_times.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "2");
        assert_eq!(&rows[0][3], "human");
        assert_eq!(&rows[0][9], "");            // no reward for humans
        assert_eq!(&rows[1][9], "-612.5");
        assert_eq!(&rows[1][10], "[600.0,720.0]");
    }

    #[test]
    fn csv_day_summary_row() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_day_summary(&summary_row(3)).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("day_summaries.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "3");
        assert_eq!(&rows[0][1], "Human learning");
        assert_eq!(&rows[0][6], "");            // no machines yet
        assert_eq!(&rows[0][7], "650");
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }
}

#[cfg(test)]
mod observer_tests {
    use approx::assert_relative_eq;

    use rm_behavior::AnyHumanModel;
    use rm_core::{ExperimentConfig, OutputBackend, PathIndex};
    use rm_paths::builtin;
    use rm_sim::{DayObserver, DayReport, EnvBuilder, ScriptedPolicy};
    use rm_traffic::BprSimulator;

    use super::tmp;
    use crate::{open_writer, CsvWriter, DayOutputObserver};

    fn report(day: u64, mean: f64) -> DayReport {
        DayReport {
            day: rm_core::Day(day),
            phase: rm_core::Phase::HumanLearning,
            humans: 2,
            machines: 0,
            mean_travel_time: mean,
            mean_human_travel_time: Some(mean),
            mean_machine_travel_time: None,
            mean_machine_reward: None,
            retries: 0,
        }
    }

    #[test]
    fn smoothing_is_a_trailing_mean() {
        let dir = tmp();
        let mut reporting = ExperimentConfig::default().reporting;
        reporting.smooth_by = 2;
        let mut obs = DayOutputObserver::new(CsvWriter::new(dir.path()).unwrap(), &reporting);
        for (day, mean) in [(0, 100.0), (1, 200.0), (2, 400.0)] {
            obs.on_day_end(&report(day, mean));
        }
        obs.on_run_end(3);
        assert!(obs.take_error().is_none());

        let mut rdr = csv::Reader::from_path(dir.path().join("day_summaries.csv")).unwrap();
        let smoothed: Vec<f64> = rdr.records().map(|r| r.unwrap()[7].parse().unwrap()).collect();
        assert_relative_eq!(smoothed[0], 100.0);
        assert_relative_eq!(smoothed[1], 150.0);
        assert_relative_eq!(smoothed[2], 300.0);
    }

    #[test]
    fn full_run_writes_every_row() {
        let mut config = ExperimentConfig::default();
        config.population.num_agents = 8;
        config.mutation.new_machines = 3;
        config.run.human_learning_days = 2;
        config.run.training_days = 2;
        config.run.test_days = 1;

        let dir = tmp();
        let mut obs = DayOutputObserver::new(
            open_writer(OutputBackend::Csv, dir.path()).unwrap(),
            &config.reporting,
        );
        let sim = BprSimulator::new(builtin("two_route").unwrap(), &config.simulator);
        let model = AnyHumanModel::from_config(&config.human);
        let mut env = EnvBuilder::new(config, model, sim).build().unwrap();
        env.run(&mut ScriptedPolicy::new(PathIndex(0)), &mut obs).unwrap();
        assert!(obs.take_error().is_none(), "no write errors expected");

        let mut rdr = csv::Reader::from_path(dir.path().join("travel_times.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 8 * 5);
        let machines_with_reward = rows.iter().filter(|r| &r[3] == "machine" && !r[9].is_empty()).count();
        assert_eq!(machines_with_reward, 3 * 3);

        let mut rdr = csv::Reader::from_path(dir.path().join("day_summaries.csv")).unwrap();
        let phases: Vec<String> = rdr.records().map(|r| r.unwrap()[1].to_owned()).collect();
        assert_eq!(phases, ["Human learning", "Human learning", "Training", "Training", "Testing"]);
    }

    #[cfg(not(feature = "sqlite"))]
    #[test]
    fn missing_backend_is_reported() {
        use crate::OutputError;

        let dir = tmp();
        let err = open_writer(OutputBackend::Sqlite, dir.path()).err().unwrap();
        assert!(matches!(err, OutputError::BackendUnavailable("sqlite")));
    }

    #[test]
    fn open_writer_creates_the_directory() {
        let dir = tmp();
        let nested = dir.path().join("runs").join("a");
        let mut w = open_writer(OutputBackend::Csv, &nested).unwrap();
        w.finish().unwrap();
        assert!(nested.join("travel_times.csv").exists());
    }
}

// ── SQLite tests ──────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use super::{summary_row, tmp, trip_row};
    use crate::sqlite::SqliteWriter;
    use crate::writer::OutputWriter;

    #[test]
    fn sqlite_db_created() {
        let dir = tmp();
        let _w = SqliteWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("output.db").exists());
    }

    #[test]
    fn sqlite_travel_time_count_and_null_reward() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_travel_times(&[trip_row(0, 1, None), trip_row(1, 1, Some(-5.0)), trip_row(2, 1, None)])
            .unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM travel_times", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 3);
        let nulls: i64 = conn
            .query_row("SELECT COUNT(*) FROM travel_times WHERE reward IS NULL", [], |r| r.get(0))
            .unwrap();
        assert_eq!(nulls, 2);
    }

    #[test]
    fn sqlite_day_summary() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_day_summary(&summary_row(7)).unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let (day, phase, machine_mean): (i64, String, Option<f64>) = conn
            .query_row(
                "SELECT day, phase, mean_machine_travel_time FROM day_summaries WHERE day = 7",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!(day, 7);
        assert_eq!(phase, "Human learning");
        assert_eq!(machine_mean, None);
    }
}

// ── Parquet tests ─────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "parquet"))]
mod parquet_tests {
    use arrow::datatypes::DataType;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    use super::{summary_row, tmp, trip_row};
    use crate::parquet::ParquetWriter;
    use crate::writer::OutputWriter;

    #[test]
    fn parquet_files_created() {
        let dir = tmp();
        let mut w = ParquetWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        assert!(dir.path().join("travel_times.parquet").exists());
        assert!(dir.path().join("day_summaries.parquet").exists());
    }

    #[test]
    fn parquet_travel_times_schema_and_rows() {
        let dir = tmp();
        let mut w = ParquetWriter::new(dir.path()).unwrap();
        w.write_travel_times(&[trip_row(0, 2, None), trip_row(1, 2, Some(-1.0))]).unwrap();
        w.write_day_summary(&summary_row(2)).unwrap();
        w.finish().unwrap();

        let file = std::fs::File::open(dir.path().join("travel_times.parquet")).unwrap();
        let builder = ParquetRecordBatchReaderBuilder::try_new(file).unwrap();
        let schema = builder.schema().clone();
        let reader = builder.build().unwrap();
        let total_rows: usize = reader.map(|b| b.unwrap().num_rows()).sum();
        assert_eq!(total_rows, 2);

        let reward = schema.field_with_name("reward").unwrap();
        assert_eq!(*reward.data_type(), DataType::Float64);
        assert!(reward.is_nullable());
        assert_eq!(*schema.field_with_name("cost_table").unwrap().data_type(), DataType::Utf8);
    }
}
