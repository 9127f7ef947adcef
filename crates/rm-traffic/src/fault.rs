//! Scripted simulator failures.
//!
//! Wraps any simulator and fails the next connects or days with queued
//! errors before delegating.  Used to exercise reconnect and abort paths
//! without a flaky external process.

use std::collections::VecDeque;

use rm_core::Day;

use crate::{SimulatorError, SimulatorResult, TrafficSimulator, TripRequest, TripResult};

pub struct FaultInjector<S: TrafficSimulator> {
    inner:          S,
    connect_faults: VecDeque<SimulatorError>,
    day_faults:     VecDeque<SimulatorError>,
    connects:       u32,
    day_attempts:   u32,
}

impl<S: TrafficSimulator> FaultInjector<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            connect_faults: VecDeque::new(),
            day_faults:     VecDeque::new(),
            connects:       0,
            day_attempts:   0,
        }
    }

    /// Fail the next `times` connect attempts with `err`.
    pub fn fail_connect(mut self, err: SimulatorError, times: usize) -> Self {
        self.connect_faults.extend(std::iter::repeat(err).take(times));
        self
    }

    /// Fail the next `times` day simulations with `err`.
    pub fn fail_days(mut self, err: SimulatorError, times: usize) -> Self {
        self.day_faults.extend(std::iter::repeat(err).take(times));
        self
    }

    /// Queue more day failures after construction.
    pub fn push_day_fault(&mut self, err: SimulatorError) {
        self.day_faults.push_back(err);
    }

    pub fn connect_attempts(&self) -> u32 {
        self.connects
    }

    pub fn day_attempts(&self) -> u32 {
        self.day_attempts
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: TrafficSimulator> TrafficSimulator for FaultInjector<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn connect(&mut self) -> SimulatorResult<()> {
        self.connects += 1;
        match self.connect_faults.pop_front() {
            Some(err) => Err(err),
            None => self.inner.connect(),
        }
    }

    fn simulate_day(&mut self, day: Day, trips: &[TripRequest<'_>]) -> SimulatorResult<Vec<TripResult>> {
        self.day_attempts += 1;
        match self.day_faults.pop_front() {
            Some(err) => {
                if err.is_recoverable() {
                    self.inner.disconnect();
                }
                Err(err)
            }
            None => self.inner.simulate_day(day, trips),
        }
    }

    fn disconnect(&mut self) {
        self.inner.disconnect();
    }

    fn is_connected(&self) -> bool {
        self.inner.is_connected()
    }
}
