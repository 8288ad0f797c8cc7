//! Spike monitors and their lazy materialization.
//!
//! A monitor is created when its address group is registered, before anything
//! has been recorded. Capture data is attached with [`Monitor::populate`] and
//! only turned into an [`EventStream`] the first time the stream is read.

use std::collections::HashSet;
use std::mem;

use tracing::{debug, trace};

use crate::address::{Address, AddressGroup, Channel};
use crate::capture::RawCapture;
use crate::error::{AerError, AerResult, MaterializationError, ValidationError};
use crate::rate::{BinnedRate, RateEstimator};
use crate::remap::{linspace, remap_positions, RemappedStream};
use crate::stream::EventStream;

use super::style::PlotStyle;

/// Observable lifecycle phase of a monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonitorPhase {
    /// Bound to its group, nothing captured yet.
    Empty,
    /// Capture attached, stream not built yet.
    Pending,
    /// Stream built.
    Materialized,
}

#[derive(Debug, Clone)]
enum MonitorState {
    Empty,
    Pending(RawCapture),
    Materialized(EventStream),
}

/// Binds one address group to a lazily built event stream.
///
/// Once materialized, the stream's id domain is exactly the group's
/// addresses, and its channel is the group's channel.
///
/// # Examples
///
/// ```
/// use aermon::{AddressGroup, Monitor, RawCapture};
///
/// let mut mon = Monitor::new(AddressGroup::new("exc soma", 0, vec![5, 9, 12]));
/// mon.populate(RawCapture::from_pairs([(9, 1.0), (9, 2.0), (5, 0.5)]));
///
/// let stream = mon.stream().unwrap();
/// assert_eq!(stream.id_list(), vec![5, 9, 12]);
/// assert_eq!(stream.t_start(), 0.5);
/// assert_eq!(stream.t_stop(), 2.0);
/// ```
#[derive(Debug, Clone)]
pub struct Monitor {
    group: AddressGroup,
    style: PlotStyle,
    state: MonitorState,
}

impl Monitor {
    /// Creates an empty monitor for `group`.
    #[must_use]
    pub fn new(group: AddressGroup) -> Self {
        Self::with_style(group, PlotStyle::new())
    }

    /// Creates an empty monitor with plot style defaults.
    #[must_use]
    pub fn with_style(group: AddressGroup, style: PlotStyle) -> Self {
        Self {
            group,
            style,
            state: MonitorState::Empty,
        }
    }

    /// Wraps an existing stream as an already materialized monitor.
    ///
    /// The monitor's group is the stream's channel and id list, unnamed.
    #[must_use]
    pub fn from_stream(stream: EventStream) -> Self {
        let group = AddressGroup::new("", stream.channel(), stream.id_list());
        Self {
            group,
            style: PlotStyle::new(),
            state: MonitorState::Materialized(stream),
        }
    }

    /// The monitored address group.
    #[must_use]
    pub const fn group(&self) -> &AddressGroup {
        &self.group
    }

    /// Full name of the address group.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.group.name
    }

    /// First word of the name, used as a row or legend label.
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.group.name.split(' ').next().unwrap_or_default()
    }

    /// Channel of the address group.
    #[must_use]
    pub const fn channel(&self) -> Channel {
        self.group.channel
    }

    /// Number of monitored addresses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.group.len()
    }

    /// True when the group has no address.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.group.is_empty()
    }

    /// Plot style defaults.
    #[must_use]
    pub const fn style(&self) -> &PlotStyle {
        &self.style
    }

    /// Mutable plot style defaults.
    pub fn style_mut(&mut self) -> &mut PlotStyle {
        &mut self.style
    }

    /// Current lifecycle phase. Never triggers materialization.
    #[must_use]
    pub const fn phase(&self) -> MonitorPhase {
        match self.state {
            MonitorState::Empty => MonitorPhase::Empty,
            MonitorState::Pending(_) => MonitorPhase::Pending,
            MonitorState::Materialized(_) => MonitorPhase::Materialized,
        }
    }

    /// Attaches capture data, discarding any pending or built stream.
    pub fn populate(&mut self, capture: RawCapture) {
        self.state = MonitorState::Pending(capture);
    }

    /// Builds the stream if capture data is pending. Idempotent.
    ///
    /// # Errors
    ///
    /// - `MaterializationError::Unready` if nothing was ever populated.
    /// - `MaterializationError::MalformedCapture` if the capture cannot be
    ///   normalized. The capture stays pending.
    pub fn materialize(&mut self) -> AerResult<()> {
        let capture = match mem::replace(&mut self.state, MonitorState::Empty) {
            MonitorState::Empty => {
                return Err(MaterializationError::Unready {
                    monitor: self.group.name.clone(),
                }
                .into());
            }
            MonitorState::Materialized(stream) => {
                trace!(monitor = %self.group.name, "stream already materialized");
                self.state = MonitorState::Materialized(stream);
                return Ok(());
            }
            MonitorState::Pending(capture) => capture,
        };

        if let Err(reason) = capture.validate() {
            self.state = MonitorState::Pending(capture);
            return Err(MaterializationError::MalformedCapture {
                monitor: self.group.name.clone(),
                reason,
            }
            .into());
        }

        let total = capture.len();
        let members: HashSet<Address> = self.group.laddr.iter().copied().collect();
        let events = capture
            .into_events()
            .map_err(|reason| MaterializationError::MalformedCapture {
                monitor: self.group.name.clone(),
                reason,
            })?
            .into_iter()
            .filter(|e| members.contains(&e.address));

        let mut stream = EventStream::new(self.group.channel, events, &self.group.laddr, None, None);
        stream.complete(&self.group.laddr);

        let kept = stream.event_count();
        debug!(
            monitor = %self.group.name,
            channel = self.group.channel,
            kept,
            dropped = total - kept,
            "materialized monitor stream"
        );
        self.state = MonitorState::Materialized(stream);
        Ok(())
    }

    /// The monitor's stream, built on first access.
    ///
    /// # Errors
    ///
    /// See [`Monitor::materialize`].
    pub fn stream(&mut self) -> AerResult<&EventStream> {
        self.materialize()?;
        self.materialized()
            .ok_or_else(|| AerError::internal("monitor not materialized after materialize()"))
    }

    /// The stream if already built. Never triggers materialization.
    #[must_use]
    pub const fn materialized(&self) -> Option<&EventStream> {
        match &self.state {
            MonitorState::Materialized(stream) => Some(stream),
            _ => None,
        }
    }

    pub(crate) fn materialized_mut(&mut self) -> Option<&mut EventStream> {
        match &mut self.state {
            MonitorState::Materialized(stream) => Some(stream),
            _ => None,
        }
    }

    /// Group addresses mapped linearly onto `[s_start, s_stop]`, in group order.
    #[must_use]
    pub fn normalized_addresses(&self, s_start: f64, s_stop: f64) -> Vec<f64> {
        linspace(s_start, s_stop, self.len())
    }

    /// The stream with each group address replaced by its position-based
    /// coordinate in `[s_start, s_stop]`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidInterval` for non-finite bounds, or any
    /// error of [`Monitor::stream`].
    pub fn remap(&mut self, s_start: f64, s_stop: f64) -> AerResult<RemappedStream> {
        if !(s_start.is_finite() && s_stop.is_finite()) {
            return Err(ValidationError::InvalidInterval {
                start: s_start,
                stop: s_stop,
            }
            .into());
        }
        let mapping = remap_positions(&self.group.laddr, s_start, s_stop);
        Ok(mapping.apply(self.stream()?))
    }

    /// Mean rate in Hz over an optional window.
    ///
    /// # Errors
    ///
    /// See [`Monitor::stream`].
    pub fn mean_rate(&mut self, t_start: Option<f64>, t_stop: Option<f64>) -> AerResult<f64> {
        Ok(self.stream()?.mean_rate(t_start, t_stop))
    }

    /// Binned rate of the monitor, optionally on a time-shifted copy.
    ///
    /// The averaged rate is always computed first; the total is that result
    /// times the number of ids.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidTimeBin`, or any error of
    /// [`Monitor::stream`].
    pub fn firing_rates(
        &mut self,
        time_bin: f64,
        average: bool,
        offset: Option<f64>,
    ) -> AerResult<BinnedRate> {
        self.firing_rates_with(&RateEstimator::default(), time_bin, average, offset)
    }

    pub(crate) fn firing_rates_with(
        &mut self,
        estimator: &RateEstimator,
        time_bin: f64,
        average: bool,
        offset: Option<f64>,
    ) -> AerResult<BinnedRate> {
        let stream = self.stream()?;
        let shifted;
        let stream = match offset {
            Some(offset) => {
                shifted = stream.shifted(offset);
                &shifted
            }
            None => stream,
        };

        let mean = estimator.firing_rate(stream, time_bin, true)?;
        if average {
            Ok(mean)
        } else {
            #[allow(clippy::cast_precision_loss)]
            let ids = stream.len() as f64;
            Ok(mean.scaled(ids))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::RawEvent;

    fn scenario() -> Monitor {
        let mut mon = Monitor::new(AddressGroup::new("exc soma", 0, vec![5, 9, 12]));
        mon.populate(RawCapture::from_pairs([(9, 1.0), (9, 2.0), (5, 0.5)]));
        mon
    }

    #[test]
    fn test_starts_empty_and_is_unready() {
        let mut mon = Monitor::new(AddressGroup::new("m", 0, vec![1]));
        assert_eq!(mon.phase(), MonitorPhase::Empty);
        let err = mon.stream().unwrap_err();
        assert!(err.is_unready());
        assert_eq!(mon.phase(), MonitorPhase::Empty);
    }

    #[test]
    fn test_lazy_materialization() {
        let mut mon = scenario();
        assert_eq!(mon.phase(), MonitorPhase::Pending);
        assert!(mon.materialized().is_none());

        let stream = mon.stream().unwrap();
        assert_eq!(stream.id_list(), vec![5, 9, 12]);
        assert_eq!(stream.get(12), Some(&[][..]));
        assert_eq!(stream.t_start(), 0.5);
        assert_eq!(stream.t_stop(), 2.0);
        assert_eq!(mon.phase(), MonitorPhase::Materialized);
    }

    #[test]
    fn test_second_read_is_identical() {
        let mut mon = scenario();
        let first = mon.stream().unwrap().clone();
        let second = mon.stream().unwrap().clone();
        assert_eq!(first, second);
    }

    #[test]
    fn test_populate_resets_materialized_stream() {
        let mut mon = scenario();
        mon.stream().unwrap();
        mon.populate(RawCapture::from_pairs([(12, 7.0)]));
        assert_eq!(mon.phase(), MonitorPhase::Pending);

        let stream = mon.stream().unwrap();
        assert_eq!(stream.get(9), Some(&[][..]));
        assert_eq!(stream.get(12), Some(&[7.0][..]));
        assert_eq!(stream.t_start(), 7.0);
    }

    #[test]
    fn test_foreign_addresses_are_filtered() {
        let mut mon = Monitor::new(AddressGroup::new("m", 1, vec![1, 2]));
        mon.populate(RawCapture::from_pairs([(1, 1.0), (3, 0.1), (4, 9.0)]));
        let stream = mon.stream().unwrap();
        assert_eq!(stream.id_list(), vec![1, 2]);
        assert_eq!(stream.channel(), 1);
        assert_eq!(stream.t_start(), 1.0);
        assert_eq!(stream.t_stop(), 1.0);
    }

    #[test]
    fn test_no_matching_events_uses_sentinels() {
        let mut mon = Monitor::new(AddressGroup::new("m", 0, vec![1, 2]));
        mon.populate(RawCapture::from_pairs([(7, 1.0)]));
        let stream = mon.stream().unwrap();
        assert_eq!(stream.len(), 2);
        assert_eq!(stream.t_start(), EventStream::EMPTY_T_START);
        assert_eq!(stream.t_stop(), EventStream::EMPTY_T_STOP);
    }

    #[test]
    fn test_malformed_capture_fails_and_stays_pending() {
        let mut mon = Monitor::new(AddressGroup::new("m", 0, vec![1, 2]));
        mon.populate(RawCapture::from_columns(vec![1, 2], vec![0.5]));
        let err = mon.stream().unwrap_err();
        assert!(err.is_materialization());
        assert!(!err.is_unready());
        assert_eq!(mon.phase(), MonitorPhase::Pending);
    }

    #[test]
    fn test_remap_scenario() {
        let mut mon = scenario();
        let remapped = mon.remap(0.0, 1.0).unwrap();
        assert_eq!(remapped.coordinate_of(5), Some(0.0));
        assert_eq!(remapped.coordinate_of(9), Some(0.5));
        assert_eq!(remapped.coordinate_of(12), Some(1.0));
    }

    #[test]
    fn test_remap_rejects_nan_interval() {
        let mut mon = scenario();
        assert!(mon.remap(f64::NAN, 1.0).unwrap_err().is_validation());
    }

    #[test]
    fn test_short_name_and_normalized_addresses() {
        let mon = scenario();
        assert_eq!(mon.short_name(), "exc");
        assert_eq!(mon.normalized_addresses(0.0, 1.0), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_firing_rates_total_is_mean_times_ids() {
        let mut mon = scenario();
        let mean = mon.firing_rates(0.5, true, None).unwrap();
        let total = mon.firing_rates(0.5, false, None).unwrap();
        for (m, t) in mean.values().iter().zip(total.values()) {
            assert!((m * 3.0 - t).abs() < 1e-12);
        }
        assert_eq!(total.values().iter().sum::<f64>(), 3.0);
    }

    #[test]
    fn test_firing_rates_with_offset() {
        let mut mon = scenario();
        let rate = mon.firing_rates(1.0, false, Some(100.0)).unwrap();
        assert_eq!(rate.edges()[0], 100.5);
        assert_eq!(mon.stream().unwrap().t_start(), 0.5);
    }

    #[test]
    fn test_from_stream_is_materialized() {
        let stream = EventStream::new(4, [RawEvent::new(3, 1.0)], &[3, 8], None, Some(5.0));
        let mut mon = Monitor::from_stream(stream);
        assert_eq!(mon.phase(), MonitorPhase::Materialized);
        assert_eq!(mon.channel(), 4);
        assert_eq!(mon.group().laddr, vec![3, 8]);
        assert_eq!(mon.stream().unwrap().t_stop(), 5.0);
    }

    #[test]
    fn test_mean_rate_delegates() {
        let mut mon = scenario();
        // 3 events, 3 ids, 1.5 ms window -> 1 event per id per 1.5 ms.
        let rate = mon.mean_rate(None, None).unwrap();
        assert!((rate - 1000.0 / 1.5).abs() < 1e-9);
    }
}
