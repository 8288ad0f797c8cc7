//! Event streams: per-address spike trains scoped to one channel.
//!
//! A stream maps every address of its id domain to an ascending sequence of
//! timestamps, and carries explicit `[t_start, t_stop]` bounds. Addresses in
//! the domain may have no events at all; they are still part of the domain.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::address::{Address, Channel};
use crate::capture::RawEvent;
use crate::error::AerResult;
use crate::rate::{BinnedRate, RateEstimator};

/// Completed collection of address events for one channel.
///
/// # Examples
///
/// ```
/// use aermon::{EventStream, RawEvent};
///
/// let events = [RawEvent::new(9, 2.0), RawEvent::new(9, 1.0), RawEvent::new(5, 0.5)];
/// let stream = EventStream::new(0, events, &[5, 9, 12], None, None);
///
/// assert_eq!(stream.id_list(), vec![5, 9, 12]);
/// assert_eq!(stream.get(9), Some(&[1.0, 2.0][..]));
/// assert_eq!(stream.t_start(), 0.5);
/// assert_eq!(stream.t_stop(), 2.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventStream {
    channel: Channel,
    trains: BTreeMap<Address, Vec<f64>>,
    t_start: f64,
    t_stop: f64,
    /// False while the bounds are the empty sentinels rather than data.
    #[serde(default = "bounded_by_default")]
    bounded: bool,
}

const fn bounded_by_default() -> bool {
    true
}

impl EventStream {
    /// `t_start` of a stream that never observed an event.
    pub const EMPTY_T_START: f64 = 0.0;

    /// `t_stop` of a stream that never observed an event.
    pub const EMPTY_T_STOP: f64 = 0.0;

    /// Builds a stream over `domain` from raw events.
    ///
    /// Events whose address is outside `domain` are dropped. Bounds default to
    /// the earliest and latest kept timestamp, or to the empty sentinels when
    /// nothing was kept. A stream built from sentinels alone reports
    /// [`EventStream::has_bounds`] as false.
    #[must_use]
    pub fn new<I>(
        channel: Channel,
        events: I,
        domain: &[Address],
        t_start: Option<f64>,
        t_stop: Option<f64>,
    ) -> Self
    where
        I: IntoIterator<Item = RawEvent>,
    {
        let mut trains: BTreeMap<Address, Vec<f64>> =
            domain.iter().map(|&id| (id, Vec::new())).collect();

        let mut observed: Option<(f64, f64)> = None;
        for event in events {
            let Some(train) = trains.get_mut(&event.address) else {
                continue;
            };
            train.push(event.timestamp);
            observed = Some(match observed {
                Some((lo, hi)) => (lo.min(event.timestamp), hi.max(event.timestamp)),
                None => (event.timestamp, event.timestamp),
            });
        }
        for train in trains.values_mut() {
            train.sort_by(f64::total_cmp);
        }

        let bounded = observed.is_some() || t_start.is_some() || t_stop.is_some();
        let (seen_start, seen_stop) =
            observed.unwrap_or((Self::EMPTY_T_START, Self::EMPTY_T_STOP));
        let t_start = t_start.unwrap_or(seen_start);
        let t_stop = t_stop.unwrap_or_else(|| seen_stop.max(t_start));

        Self {
            channel,
            trains,
            t_start,
            t_stop,
            bounded,
        }
    }

    /// An empty stream with no ids.
    #[must_use]
    pub fn empty(channel: Channel) -> Self {
        Self {
            channel,
            trains: BTreeMap::new(),
            t_start: Self::EMPTY_T_START,
            t_stop: Self::EMPTY_T_STOP,
            bounded: false,
        }
    }

    /// Builds a stream from already grouped trains. Trains are sorted.
    #[must_use]
    pub fn from_trains(
        channel: Channel,
        mut trains: BTreeMap<Address, Vec<f64>>,
        t_start: f64,
        t_stop: f64,
    ) -> Self {
        for train in trains.values_mut() {
            train.sort_by(f64::total_cmp);
        }
        Self {
            channel,
            trains,
            t_start,
            t_stop,
            bounded: true,
        }
    }

    /// Channel the stream is scoped to.
    #[must_use]
    pub const fn channel(&self) -> Channel {
        self.channel
    }

    /// Lower time bound.
    #[must_use]
    pub const fn t_start(&self) -> f64 {
        self.t_start
    }

    /// Upper time bound.
    #[must_use]
    pub const fn t_stop(&self) -> f64 {
        self.t_stop
    }

    /// Whether the bounds come from observed events or explicit values.
    ///
    /// A stream whose ids never fired carries the empty sentinels instead;
    /// those are not data and are ignored when bounds are combined.
    #[must_use]
    pub const fn has_bounds(&self) -> bool {
        self.bounded
    }

    /// Number of ids in the domain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trains.len()
    }

    /// True when the id domain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trains.is_empty()
    }

    /// Total number of events across all ids.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.trains.values().map(Vec::len).sum()
    }

    /// Ids of the domain, ascending.
    #[must_use]
    pub fn id_list(&self) -> Vec<Address> {
        self.trains.keys().copied().collect()
    }

    /// Whether `id` is part of the domain.
    #[must_use]
    pub fn contains_id(&self, id: Address) -> bool {
        self.trains.contains_key(&id)
    }

    /// Timestamps of `id`, ascending. `None` if `id` is outside the domain.
    #[must_use]
    pub fn get(&self, id: Address) -> Option<&[f64]> {
        self.trains.get(&id).map(Vec::as_slice)
    }

    /// Iterates `(id, timestamps)` in ascending id order.
    pub fn trains(&self) -> impl Iterator<Item = (Address, &[f64])> + '_ {
        self.trains.iter().map(|(&id, times)| (id, times.as_slice()))
    }

    /// Flattened `(id, time)` pairs, grouped by id.
    #[must_use]
    pub fn raw_data(&self) -> Vec<(Address, f64)> {
        self.trains
            .iter()
            .flat_map(|(&id, times)| times.iter().map(move |&t| (id, t)))
            .collect()
    }

    /// Pads every address of `domain` missing from the stream with an empty
    /// train. Existing ids are never removed.
    pub fn complete(&mut self, domain: &[Address]) {
        for &id in domain {
            self.trains.entry(id).or_default();
        }
    }

    /// Moves `t_stop` out to `target` if it is currently earlier.
    ///
    /// Returns true if the bound changed.
    pub fn extend_t_stop(&mut self, target: f64) -> bool {
        if self.t_stop < target {
            self.t_stop = target;
            true
        } else {
            false
        }
    }

    /// Shifts every timestamp and both bounds by `offset`.
    pub fn time_offset(&mut self, offset: f64) {
        for train in self.trains.values_mut() {
            for t in train.iter_mut() {
                *t += offset;
            }
        }
        self.t_start += offset;
        self.t_stop += offset;
    }

    /// Returns a copy shifted by `offset`.
    #[must_use]
    pub fn shifted(&self, offset: f64) -> Self {
        let mut copy = self.clone();
        copy.time_offset(offset);
        copy
    }

    /// Bin edges covering `[t_start, t_stop]` with width `time_bin`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidTimeBin` for a non-positive bin.
    pub fn time_axis(&self, time_bin: f64) -> AerResult<Vec<f64>> {
        RateEstimator::bin_edges(self.t_start, self.t_stop, time_bin)
    }

    /// Per-bin event counts, summed or averaged over the id domain.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidTimeBin` for a non-positive bin.
    pub fn firing_rate(&self, time_bin: f64, average: bool) -> AerResult<BinnedRate> {
        RateEstimator::default().firing_rate(self, time_bin, average)
    }

    /// Mean rate in Hz over an optional window, averaged over ids.
    ///
    /// Timestamps are taken to be milliseconds.
    #[must_use]
    pub fn mean_rate(&self, t_start: Option<f64>, t_stop: Option<f64>) -> f64 {
        RateEstimator::default().mean_rate(self, t_start, t_stop)
    }

    /// Union of two streams.
    ///
    /// The id domain is the union of both domains; an id present in both gets
    /// the ascending union of both trains. Bounds widen to cover both; a side
    /// without bounds of its own contributes none. The result keeps `self`'s
    /// channel.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let mut trains = self.trains.clone();
        for (&id, times) in &other.trains {
            trains.entry(id).or_default().extend_from_slice(times);
        }
        let (t_start, t_stop) = match (self.bounded, other.bounded) {
            (true, false) => (self.t_start, self.t_stop),
            (false, true) => (other.t_start, other.t_stop),
            _ => (self.t_start.min(other.t_start), self.t_stop.max(other.t_stop)),
        };
        let mut merged = Self::from_trains(self.channel, trains, t_start, t_stop);
        merged.bounded = self.bounded || other.bounded;
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EventStream {
        let events = [
            RawEvent::new(9, 1.0),
            RawEvent::new(9, 2.0),
            RawEvent::new(5, 0.5),
        ];
        EventStream::new(0, events, &[5, 9, 12], None, None)
    }

    #[test]
    fn test_new_filters_and_completes() {
        let events = [RawEvent::new(1, 1.0), RawEvent::new(99, 0.1)];
        let stream = EventStream::new(3, events, &[1, 2], None, None);
        assert_eq!(stream.channel(), 3);
        assert_eq!(stream.id_list(), vec![1, 2]);
        assert_eq!(stream.get(2), Some(&[][..]));
        assert!(!stream.contains_id(99));
        assert_eq!(stream.t_start(), 1.0);
    }

    #[test]
    fn test_bounds_from_observed_events() {
        let stream = sample();
        assert_eq!(stream.t_start(), 0.5);
        assert_eq!(stream.t_stop(), 2.0);
        assert_eq!(stream.event_count(), 3);
    }

    #[test]
    fn test_empty_events_use_sentinels() {
        let stream = EventStream::new(0, Vec::new(), &[1, 2], None, None);
        assert_eq!(stream.t_start(), EventStream::EMPTY_T_START);
        assert_eq!(stream.t_stop(), EventStream::EMPTY_T_STOP);
        assert_eq!(stream.len(), 2);
    }

    #[test]
    fn test_explicit_bounds_win() {
        let stream = EventStream::new(0, [RawEvent::new(1, 5.0)], &[1], Some(0.0), Some(10.0));
        assert_eq!(stream.t_start(), 0.0);
        assert_eq!(stream.t_stop(), 10.0);
    }

    #[test]
    fn test_complete_never_removes() {
        let mut stream = sample();
        stream.complete(&[1, 5]);
        assert_eq!(stream.id_list(), vec![1, 5, 9, 12]);
        assert_eq!(stream.get(5), Some(&[0.5][..]));
    }

    #[test]
    fn test_raw_data_grouped_by_id() {
        assert_eq!(sample().raw_data(), vec![(5, 0.5), (9, 1.0), (9, 2.0)]);
    }

    #[test]
    fn test_extend_t_stop_never_truncates() {
        let mut stream = sample();
        assert!(!stream.extend_t_stop(1.0));
        assert_eq!(stream.t_stop(), 2.0);
        assert!(stream.extend_t_stop(4.0));
        assert_eq!(stream.t_stop(), 4.0);
    }

    #[test]
    fn test_shifted_moves_events_and_bounds() {
        let stream = sample().shifted(10.0);
        assert_eq!(stream.get(9), Some(&[11.0, 12.0][..]));
        assert_eq!(stream.t_start(), 10.5);
        assert_eq!(stream.t_stop(), 12.0);
    }

    #[test]
    fn test_merge_is_union() {
        let a = EventStream::new(0, [RawEvent::new(1, 1.0), RawEvent::new(2, 3.0)], &[1, 2], None, None);
        let b = EventStream::new(0, [RawEvent::new(2, 2.0), RawEvent::new(3, 4.0)], &[2, 3], None, None);

        let merged = a.merge(&b);
        assert_eq!(merged.id_list(), vec![1, 2, 3]);
        assert_eq!(merged.get(2), Some(&[2.0, 3.0][..]));
        assert_eq!(merged.t_start(), 1.0);
        assert_eq!(merged.t_stop(), 4.0);
    }

    #[test]
    fn test_silent_stream_has_no_bounds() {
        let silent = EventStream::new(0, Vec::new(), &[7, 8], None, None);
        assert!(!silent.has_bounds());
        assert!(!EventStream::empty(0).has_bounds());
        assert!(sample().has_bounds());

        let explicit = EventStream::new(0, Vec::new(), &[7], Some(5.0), Some(9.0));
        assert!(explicit.has_bounds());
    }

    #[test]
    fn test_merge_ignores_bounds_of_silent_member() {
        let active = EventStream::new(0, [RawEvent::new(1, 100.0), RawEvent::new(1, 200.0)], &[1], None, None);
        let silent = EventStream::new(0, Vec::new(), &[2, 3], None, None);

        for merged in [active.merge(&silent), silent.merge(&active)] {
            assert_eq!(merged.id_list(), vec![1, 2, 3]);
            assert_eq!(merged.t_start(), 100.0);
            assert_eq!(merged.t_stop(), 200.0);
            assert!(merged.has_bounds());
            assert_eq!(merged.firing_rate(50.0, false).unwrap().len(), 2);
        }

        let both_silent = silent.merge(&EventStream::empty(0));
        assert!(!both_silent.has_bounds());
    }

    #[test]
    fn test_serde_roundtrip_keeps_domain() {
        let stream = sample();
        let json = serde_json::to_string(&stream).unwrap();
        let back: EventStream = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stream);
    }
}
