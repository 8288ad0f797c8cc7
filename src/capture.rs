//! Raw capture data as handed over by the hardware layer.
//!
//! Drivers deliver either `(address, timestamp)` pairs or the transposed
//! column layout. `RawCapture` accepts both and normalizes lazily, so a
//! malformed buffer is only reported when the owning monitor is read.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::address::{Address, Channel};

/// A single captured address event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Logical address that fired.
    pub address: Address,

    /// Time of the event, in stream time units.
    pub timestamp: f64,
}

impl RawEvent {
    /// Creates an event.
    #[must_use]
    pub const fn new(address: Address, timestamp: f64) -> Self {
        Self { address, timestamp }
    }
}

impl From<(Address, f64)> for RawEvent {
    fn from((address, timestamp): (Address, f64)) -> Self {
        Self { address, timestamp }
    }
}

/// Captured events for one channel, in either layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum RawCapture {
    /// Row layout: one `(address, timestamp)` pair per event.
    Pairs {
        events: Vec<RawEvent>,
    },

    /// Column layout: parallel address and timestamp vectors.
    Columns {
        addresses: Vec<Address>,
        timestamps: Vec<f64>,
    },
}

impl RawCapture {
    /// Builds a row-layout capture.
    #[must_use]
    pub fn from_pairs<I, E>(events: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<RawEvent>,
    {
        Self::Pairs {
            events: events.into_iter().map(Into::into).collect(),
        }
    }

    /// Builds a column-layout capture. Lengths are checked on normalization.
    #[must_use]
    pub fn from_columns(addresses: Vec<Address>, timestamps: Vec<f64>) -> Self {
        Self::Columns {
            addresses,
            timestamps,
        }
    }

    /// An empty capture.
    #[must_use]
    pub const fn empty() -> Self {
        Self::Pairs { events: Vec::new() }
    }

    /// Number of events the capture claims to hold.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Pairs { events } => events.len(),
            Self::Columns { timestamps, .. } => timestamps.len(),
        }
    }

    /// True when the capture holds no event.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks that the capture can be normalized.
    ///
    /// # Errors
    ///
    /// Returns a human readable reason when the columns have different lengths
    /// or a timestamp is not finite. Callers wrap it in
    /// `MaterializationError::MalformedCapture`.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Pairs { events } => match events.iter().find(|e| !e.timestamp.is_finite()) {
                Some(bad) => Err(non_finite(bad.address, bad.timestamp)),
                None => Ok(()),
            },
            Self::Columns {
                addresses,
                timestamps,
            } => {
                if addresses.len() != timestamps.len() {
                    return Err(format!(
                        "address column has {} entries but timestamp column has {}",
                        addresses.len(),
                        timestamps.len()
                    ));
                }
                match addresses.iter().zip(timestamps).find(|(_, t)| !t.is_finite()) {
                    Some((&address, &t)) => Err(non_finite(address, t)),
                    None => Ok(()),
                }
            }
        }
    }

    /// Normalizes the capture to row layout.
    ///
    /// # Errors
    ///
    /// Same conditions as [`RawCapture::validate`].
    pub fn into_events(self) -> Result<Vec<RawEvent>, String> {
        self.validate()?;
        Ok(match self {
            Self::Pairs { events } => events,
            Self::Columns {
                addresses,
                timestamps,
            } => addresses
                .into_iter()
                .zip(timestamps)
                .map(|(address, timestamp)| RawEvent { address, timestamp })
                .collect(),
        })
    }
}

fn non_finite(address: Address, timestamp: f64) -> String {
    format!("address {address} has non-finite timestamp {timestamp}")
}

impl Default for RawCapture {
    fn default() -> Self {
        Self::empty()
    }
}

/// Captures keyed by channel, as returned by one stimulation run.
pub type ChannelCapture = BTreeMap<Channel, RawCapture>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_normalize_unchanged() {
        let capture = RawCapture::from_pairs([(9, 1.0), (5, 0.5)]);
        let events = capture.into_events().unwrap();
        assert_eq!(events, vec![RawEvent::new(9, 1.0), RawEvent::new(5, 0.5)]);
    }

    #[test]
    fn test_columns_are_transposed() {
        let capture = RawCapture::from_columns(vec![1, 2], vec![0.1, 0.2]);
        assert_eq!(capture.len(), 2);
        let events = capture.into_events().unwrap();
        assert_eq!(events[1], RawEvent::new(2, 0.2));
    }

    #[test]
    fn test_column_length_mismatch_is_rejected() {
        let capture = RawCapture::from_columns(vec![1, 2, 3], vec![0.1]);
        let err = capture.into_events().unwrap_err();
        assert!(err.contains("3"));
    }

    #[test]
    fn test_non_finite_timestamp_is_rejected() {
        let capture = RawCapture::from_pairs([(1, f64::NAN)]);
        assert!(capture.into_events().is_err());
    }

    #[test]
    fn test_serde_tagged_layout() {
        let json = r#"{"layout":"columns","addresses":[7],"timestamps":[3.5]}"#;
        let capture: RawCapture = serde_json::from_str(json).unwrap();
        assert_eq!(capture.into_events().unwrap(), vec![RawEvent::new(7, 3.5)]);
    }
}
