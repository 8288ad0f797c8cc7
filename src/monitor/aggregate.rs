//! Channel-keyed merge of monitor streams.

use std::collections::BTreeMap;

use tracing::debug;

use crate::address::Channel;
use crate::stream::EventStream;

/// Merged event stream per channel.
///
/// Built on demand from a registry and never stored; every member stream of a
/// channel is merged with [`EventStream::merge`], so the domain is the union
/// of member domains and shared ids get the ascending union of their events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelAggregate {
    streams: BTreeMap<Channel, EventStream>,
}

impl ChannelAggregate {
    /// Creates an empty aggregate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges `stream` into the aggregate of `channel`.
    pub fn insert(&mut self, channel: Channel, stream: &EventStream) {
        match self.streams.get_mut(&channel) {
            Some(merged) => *merged = merged.merge(stream),
            None => {
                self.streams.insert(channel, stream.clone());
            }
        }
    }

    /// Merged stream of `channel`, if any monitor recorded it.
    #[must_use]
    pub fn get(&self, channel: Channel) -> Option<&EventStream> {
        self.streams.get(&channel)
    }

    /// Merged stream of `channel`, or an empty stream.
    #[must_use]
    pub fn stream_or_empty(&self, channel: Channel) -> EventStream {
        self.get(channel)
            .cloned()
            .unwrap_or_else(|| EventStream::empty(channel))
    }

    /// Merged streams of the requested channels.
    ///
    /// Channels without data are skipped.
    #[must_use]
    pub fn select(&self, channels: &[Channel]) -> BTreeMap<Channel, &EventStream> {
        let mut out = BTreeMap::new();
        for &channel in channels {
            match self.streams.get(&channel) {
                Some(stream) => {
                    out.insert(channel, stream);
                }
                None => debug!(channel, "channel absent from aggregate, skipped"),
            }
        }
        out
    }

    /// Channels present, ascending.
    pub fn channels(&self) -> impl Iterator<Item = Channel> + '_ {
        self.streams.keys().copied()
    }

    /// Iterates `(channel, merged stream)` in ascending channel order.
    pub fn iter(&self) -> impl Iterator<Item = (Channel, &EventStream)> {
        self.streams.iter().map(|(&ch, s)| (ch, s))
    }

    /// Number of channels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    /// True when no channel was merged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Consumes the aggregate into its channel map.
    #[must_use]
    pub fn into_inner(self) -> BTreeMap<Channel, EventStream> {
        self.streams
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::RawEvent;

    fn stream(channel: Channel, events: &[(u32, f64)], domain: &[u32]) -> EventStream {
        EventStream::new(
            channel,
            events.iter().map(|&(a, t)| RawEvent::new(a, t)),
            domain,
            None,
            None,
        )
    }

    #[test]
    fn test_union_per_channel() {
        let a = stream(0, &[(1, 1.0), (2, 5.0)], &[1, 2]);
        let b = stream(0, &[(2, 2.0), (2, 5.0), (3, 9.0)], &[2, 3]);
        let c = stream(1, &[(7, 0.5)], &[7]);

        let mut agg = ChannelAggregate::new();
        agg.insert(0, &a);
        agg.insert(0, &b);
        agg.insert(1, &c);

        assert_eq!(agg.len(), 2);
        let merged = agg.get(0).unwrap();
        assert_eq!(merged.id_list(), vec![1, 2, 3]);
        assert_eq!(merged.get(2), Some(&[2.0, 5.0, 5.0][..]));
        assert_eq!(merged.t_start(), 1.0);
        assert_eq!(merged.t_stop(), 9.0);
        assert_eq!(agg.get(1).unwrap().id_list(), vec![7]);
    }

    #[test]
    fn test_missing_channel_defaults_and_skips() {
        let mut agg = ChannelAggregate::new();
        agg.insert(2, &stream(2, &[(1, 1.0)], &[1]));

        let empty = agg.stream_or_empty(5);
        assert!(empty.is_empty());
        assert_eq!(empty.channel(), 5);

        let picked = agg.select(&[2, 5]);
        assert_eq!(picked.len(), 1);
        assert!(picked.contains_key(&2));
    }

    #[test]
    fn test_members_are_not_mutated() {
        let a = stream(0, &[(1, 3.0)], &[1]);
        let b = stream(0, &[(1, 1.0)], &[1]);
        let mut agg = ChannelAggregate::new();
        agg.insert(0, &a);
        agg.insert(0, &b);
        assert_eq!(a.get(1), Some(&[3.0][..]));
        assert_eq!(agg.get(0).unwrap().get(1), Some(&[1.0, 3.0][..]));
    }
}
