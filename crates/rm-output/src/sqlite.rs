//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! two tables: `travel_times` and `day_summaries`.  Optional values are
//! stored as `NULL`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{DaySummaryRow, OutputResult, TravelTimeRow};

/// Writes run output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS travel_times (
                 day         INTEGER NOT NULL,
                 phase       TEXT    NOT NULL,
                 agent_id    INTEGER NOT NULL,
                 kind        TEXT    NOT NULL,
                 action      INTEGER NOT NULL,
                 origin      INTEGER NOT NULL,
                 destination INTEGER NOT NULL,
                 start_time  INTEGER NOT NULL,
                 travel_time REAL    NOT NULL,
                 reward      REAL,
                 cost_table  TEXT    NOT NULL,
                 PRIMARY KEY (day, agent_id)
             );
             CREATE TABLE IF NOT EXISTS day_summaries (
                 day                      INTEGER PRIMARY KEY,
                 phase                    TEXT    NOT NULL,
                 humans                   INTEGER NOT NULL,
                 machines                 INTEGER NOT NULL,
                 mean_travel_time         REAL    NOT NULL,
                 mean_human_travel_time   REAL,
                 mean_machine_travel_time REAL,
                 smoothed_travel_time     REAL    NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_travel_times(&mut self, rows: &[TravelTimeRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO travel_times \
                 (day, phase, agent_id, kind, action, origin, destination, \
                  start_time, travel_time, reward, cost_table) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.day as i64,
                    row.phase,
                    row.agent_id,
                    row.kind,
                    row.action,
                    row.origin,
                    row.destination,
                    row.start_time,
                    row.travel_time,
                    row.reward,
                    row.cost_table,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_day_summary(&mut self, row: &DaySummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO day_summaries \
             (day, phase, humans, machines, mean_travel_time, mean_human_travel_time, \
              mean_machine_travel_time, smoothed_travel_time) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                row.day as i64,
                row.phase,
                row.humans as i64,
                row.machines as i64,
                row.mean_travel_time,
                row.mean_human_travel_time,
                row.mean_machine_travel_time,
                row.smoothed_travel_time,
            ],
        )?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
