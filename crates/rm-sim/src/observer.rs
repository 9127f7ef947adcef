//! Day observer trait for progress reporting and data collection.

use rm_agent::MutationOutcome;
use rm_core::{Day, Phase};

use crate::{DayReport, EnvError, TravelTimeRecord};

/// Callbacks invoked by [`RouteEnv`][crate::RouteEnv] at key points of a run.
///
/// All methods default to no-ops so implementors only override what they
/// need.
///
/// # Example — progress printer
///
/// ```rust,ignore
/// struct Progress;
///
/// impl DayObserver for Progress {
///     fn on_day_end(&mut self, report: &DayReport) {
///         println!("{}: mean {:.1} s", report.day, report.mean_travel_time);
///     }
/// }
/// ```
pub trait DayObserver {
    fn on_day_start(&mut self, _day: Day, _phase: Phase) {}

    /// One call per agent, ascending id, after the day succeeded.
    fn on_record(&mut self, _record: &TravelTimeRecord) {}

    fn on_day_end(&mut self, _report: &DayReport) {}

    /// A simulator call failed and will be retried.  `error` is always
    /// [`EnvError::RecoverableSimulation`].
    fn on_retry(&mut self, _day: Day, _error: &EnvError) {}

    fn on_mutation(&mut self, _day: Day, _outcome: &MutationOutcome) {}

    fn on_phase_change(&mut self, _day: Day, _phase: Phase) {}

    /// Called once after the last day of [`RouteEnv::run`][crate::RouteEnv::run].
    fn on_run_end(&mut self, _days_completed: u64) {}
}

/// A [`DayObserver`] that does nothing.
pub struct NoopObserver;

impl DayObserver for NoopObserver {}
