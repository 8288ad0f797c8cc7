//! Position-based address remapping.
//!
//! Renderers stack several monitors on one axis, so each monitor's addresses
//! are replaced by evenly spaced coordinates inside the interval reserved for
//! it. Coordinates follow the address group's own order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::address::{Address, Channel};
use crate::stream::EventStream;

/// `n` coordinates evenly spaced over `[s_start, s_stop]`, both ends included.
///
/// A single coordinate sits at `s_start`.
#[must_use]
pub fn linspace(s_start: f64, s_stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![s_start],
        _ => {
            #[allow(clippy::cast_precision_loss)]
            let step = (s_stop - s_start) / (n - 1) as f64;
            #[allow(clippy::cast_precision_loss)]
            let mut coords: Vec<f64> = (0..n).map(|i| s_start + i as f64 * step).collect();
            coords[n - 1] = s_stop;
            coords
        }
    }
}

/// Assigns each address of `ordered` its position-based coordinate.
///
/// The input order is kept as given. If an address repeats, the mapping keeps
/// its first position and the coordinate of its last occurrence.
///
/// # Examples
///
/// ```
/// use aermon::remap_positions;
///
/// let mapping = remap_positions(&[5, 9, 12], 0.0, 1.0);
/// assert_eq!(mapping.get(9), Some(0.5));
/// assert_eq!(mapping.coordinates(), vec![0.0, 0.5, 1.0]);
/// ```
#[must_use]
pub fn remap_positions(ordered: &[Address], s_start: f64, s_stop: f64) -> AddressMapping {
    let coords = linspace(s_start, s_stop, ordered.len());
    let mut entries: Vec<(Address, f64)> = Vec::with_capacity(ordered.len());
    let mut index: HashMap<Address, usize> = HashMap::with_capacity(ordered.len());

    for (&address, coordinate) in ordered.iter().zip(coords) {
        match index.get(&address) {
            Some(&pos) => entries[pos].1 = coordinate,
            None => {
                index.insert(address, entries.len());
                entries.push((address, coordinate));
            }
        }
    }

    AddressMapping { entries, index }
}

/// Ordered address → coordinate mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddressMapping {
    entries: Vec<(Address, f64)>,
    index: HashMap<Address, usize>,
}

impl AddressMapping {
    /// Number of mapped addresses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Coordinate of `address`, if mapped.
    #[must_use]
    pub fn get(&self, address: Address) -> Option<f64> {
        self.index.get(&address).map(|&pos| self.entries[pos].1)
    }

    /// `(address, coordinate)` pairs in mapping order.
    #[must_use]
    pub fn entries(&self) -> &[(Address, f64)] {
        &self.entries
    }

    /// Coordinates in mapping order.
    #[must_use]
    pub fn coordinates(&self) -> Vec<f64> {
        self.entries.iter().map(|&(_, c)| c).collect()
    }

    /// Applies the mapping to `stream`.
    ///
    /// Mapped addresses present in the stream come first, in mapping order.
    /// Stream ids the mapping does not cover follow in ascending order and
    /// keep their address as coordinate.
    #[must_use]
    pub fn apply(&self, stream: &EventStream) -> RemappedStream {
        let mut trains = Vec::with_capacity(stream.len());

        for &(address, coordinate) in &self.entries {
            if let Some(times) = stream.get(address) {
                trains.push(RemappedTrain {
                    address,
                    coordinate,
                    times: times.to_vec(),
                });
            }
        }
        for (address, times) in stream.trains() {
            if !self.index.contains_key(&address) {
                trains.push(RemappedTrain {
                    address,
                    coordinate: f64::from(address),
                    times: times.to_vec(),
                });
            }
        }

        RemappedStream {
            channel: stream.channel(),
            trains,
            t_start: stream.t_start(),
            t_stop: stream.t_stop(),
        }
    }
}

/// One train of a remapped stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemappedTrain {
    /// Original logical address.
    pub address: Address,

    /// Synthetic coordinate replacing the address.
    pub coordinate: f64,

    /// Timestamps, ascending.
    pub times: Vec<f64>,
}

/// An event stream whose ids were replaced by coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemappedStream {
    /// Channel of the source stream.
    pub channel: Channel,

    /// Trains in mapping order, unmapped ids last.
    pub trains: Vec<RemappedTrain>,

    /// Lower bound of the source stream.
    pub t_start: f64,

    /// Upper bound of the source stream.
    pub t_stop: f64,
}

impl RemappedStream {
    /// Number of trains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trains.len()
    }

    /// True when there is no train.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trains.is_empty()
    }

    /// Coordinate assigned to `address`.
    #[must_use]
    pub fn coordinate_of(&self, address: Address) -> Option<f64> {
        self.trains
            .iter()
            .find(|t| t.address == address)
            .map(|t| t.coordinate)
    }

    /// Flattened `(coordinate, time)` pairs.
    #[must_use]
    pub fn raw_data(&self) -> Vec<(f64, f64)> {
        self.trains
            .iter()
            .flat_map(|t| t.times.iter().map(move |&time| (t.coordinate, time)))
            .collect()
    }
}
