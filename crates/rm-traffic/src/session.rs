//! Scoped ownership of a simulator connection.

use tracing::info;

use rm_core::Day;

use crate::{SimulatorError, SimulatorResult, TrafficSimulator, TripRequest, TripResult};

/// Owns a simulator and its connection state for the length of a run.
///
/// The connection is released by [`close`](Self::close) or, failing that,
/// when the session is dropped, so an early return or a panic in the day
/// loop never leaves a simulator process attached.
pub struct SimulatorSession<S: TrafficSimulator> {
    sim:        S,
    open:       bool,
    reconnects: u32,
}

impl<S: TrafficSimulator> SimulatorSession<S> {
    /// Wrap `sim` without connecting.
    pub fn new(sim: S) -> Self {
        Self { sim, open: false, reconnects: 0 }
    }

    pub fn open(&mut self) -> SimulatorResult<()> {
        if self.open {
            return Ok(());
        }
        self.sim.connect()?;
        self.open = true;
        info!(simulator = self.sim.name(), "simulator session opened");
        Ok(())
    }

    /// Drop the current connection and establish a new one.
    pub fn reconnect(&mut self) -> SimulatorResult<()> {
        self.sim.disconnect();
        self.open = false;
        self.sim.connect()?;
        self.open = true;
        self.reconnects += 1;
        Ok(())
    }

    /// Simulate one day.  The result has exactly one entry per trip.
    pub fn dispatch(&mut self, day: Day, trips: &[TripRequest<'_>]) -> SimulatorResult<Vec<TripResult>> {
        if !self.open {
            return Err(SimulatorError::NotConnected);
        }
        let results = self.sim.simulate_day(day, trips)?;
        if results.len() != trips.len() {
            return Err(SimulatorError::Unrecoverable(format!(
                "simulator returned {} results for {} trips",
                results.len(),
                trips.len()
            )));
        }
        Ok(results)
    }

    /// Release the connection.  Idempotent.
    pub fn close(&mut self) {
        if self.open {
            self.sim.disconnect();
            self.open = false;
            info!(simulator = self.sim.name(), reconnects = self.reconnects, "simulator session closed");
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Successful reconnects over the session's lifetime.
    pub fn reconnects(&self) -> u32 {
        self.reconnects
    }

    pub fn simulator(&self) -> &S {
        &self.sim
    }

    pub fn simulator_mut(&mut self) -> &mut S {
        &mut self.sim
    }
}

impl<S: TrafficSimulator> Drop for SimulatorSession<S> {
    fn drop(&mut self) {
        self.close();
    }
}
