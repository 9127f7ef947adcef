//! The `TrafficSimulator` trait.

use rm_core::Day;

use crate::{SimulatorResult, TripRequest, TripResult};

/// A traffic simulator the day driver can talk to.
///
/// `connect` and `disconnect` bracket a run; `simulate_day` is called once
/// per day in between.  Implementations return one [`TripResult`] per
/// request, in request order.
///
/// Do not call these directly from the day loop; hold the simulator in a
/// [`SimulatorSession`](crate::SimulatorSession) so the connection is
/// released on every exit path.
pub trait TrafficSimulator: Send {
    fn name(&self) -> &str;

    fn connect(&mut self) -> SimulatorResult<()>;

    fn simulate_day(&mut self, day: Day, trips: &[TripRequest<'_>]) -> SimulatorResult<Vec<TripResult>>;

    /// Release the connection.  Must be safe to call when not connected.
    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;
}
