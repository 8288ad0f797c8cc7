//! Registry-wide time bounds.

use crate::error::AerResult;
use crate::stream::EventStream;

use super::monitor::{Monitor, MonitorPhase};

/// `t_start` reported when no stream contributes, `2^16 - 1`.
pub const EMPTY_T_START: f64 = 65535.0;

/// `t_stop` reported when no stream contributes.
pub const EMPTY_T_STOP: f64 = 0.0;

/// Collections of monitors that can report a common time domain.
///
/// Implementors only provide their streams; the bound folds are shared.
/// Both folds start from their sentinel, so a result never exceeds
/// `EMPTY_T_START` nor drops below `EMPTY_T_STOP`. Streams without bounds of
/// their own (no event was ever observed) do not take part.
pub trait BoundsQuery {
    /// Streams that contribute to the bounds, materializing pending ones.
    ///
    /// # Errors
    ///
    /// Propagates materialization failures.
    fn bound_streams(&mut self) -> AerResult<Vec<&EventStream>>;

    /// Earliest `t_start` over all streams.
    ///
    /// # Errors
    ///
    /// Propagates materialization failures.
    fn get_t_start(&mut self) -> AerResult<f64> {
        Ok(self
            .bound_streams()?
            .iter()
            .filter(|s| s.has_bounds())
            .fold(EMPTY_T_START, |acc, s| acc.min(s.t_start())))
    }

    /// Latest `t_stop` over all streams.
    ///
    /// # Errors
    ///
    /// Propagates materialization failures.
    fn get_t_stop(&mut self) -> AerResult<f64> {
        Ok(self
            .bound_streams()?
            .iter()
            .filter(|s| s.has_bounds())
            .fold(EMPTY_T_STOP, |acc, s| acc.max(s.t_stop())))
    }
}

/// Materializes every pending monitor and returns the built streams.
///
/// Monitors that were never populated hold no data and are skipped.
pub(crate) fn materialized_streams(monitors: &mut [Monitor]) -> AerResult<Vec<&EventStream>> {
    for mon in monitors.iter_mut() {
        if mon.phase() == MonitorPhase::Pending {
            mon.materialize()?;
        }
    }
    Ok(monitors.iter().filter_map(Monitor::materialized).collect())
}

impl BoundsQuery for [Monitor] {
    fn bound_streams(&mut self) -> AerResult<Vec<&EventStream>> {
        materialized_streams(self)
    }
}

impl BoundsQuery for Vec<Monitor> {
    fn bound_streams(&mut self) -> AerResult<Vec<&EventStream>> {
        materialized_streams(self)
    }
}
