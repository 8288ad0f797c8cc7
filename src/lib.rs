//! # aermon - address-event monitors
//!
//! aermon captures the spike output of neuromorphic hardware per channel,
//! turns it into completed event streams on demand, merges them per channel
//! and remaps addresses onto synthetic coordinates for rendering and
//! statistics.
//!
//! ## Core Concepts
//!
//! - **AddressGroup**: a channel plus an ordered list of logical addresses
//! - **Monitor**: binds one group to a lazily materialized `EventStream`
//! - **MonitorRegistry**: the monitors of one experiment cycle
//! - **EventStream**: per-address spike trains with explicit time bounds
//! - **Remapping**: addresses replaced by evenly spaced coordinates
//!
//! ## Usage
//!
//! ```rust
//! use aermon::{AddressGroup, ChannelCapture, Monitor, MonitorRegistry, RawCapture};
//!
//! let mut registry = MonitorRegistry::new();
//! registry
//!     .import_monitors(Monitor::new(AddressGroup::new("exc soma", 0, vec![5, 9, 12])), true)
//!     .unwrap();
//!
//! // One stimulation run delivers raw events per channel.
//! let mut capture = ChannelCapture::new();
//! capture.insert(0, RawCapture::from_pairs([(9, 1.0), (9, 2.0), (5, 0.5)]));
//! registry.populate(&capture);
//!
//! let mon = registry.get_mut(0).unwrap();
//! let remapped = mon.remap(0.0, 1.0).unwrap();
//! assert_eq!(remapped.coordinate_of(9), Some(0.5));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod address;
pub mod capture;
pub mod config;
pub mod error;
pub mod monitor;
pub mod rate;
pub mod remap;
pub mod stream;

// Re-export primary types at crate root for convenience
pub use address::{Address, AddressGroup, AddressGroupSource, Channel, Population};
pub use capture::{ChannelCapture, RawCapture, RawEvent};
pub use config::MonitorConfig;
pub use error::{AerError, AerResult, MaterializationError, ValidationError};
pub use monitor::{
	BoundsQuery, ChannelAggregate, ImportItem, LayoutMode, Monitor, MonitorImport, MonitorPhase,
	MonitorRegistry, PlotStyle, RasterRow, RateReport, RateSummary, RowSpan,
};
pub use rate::{BinnedRate, RateEstimator};
pub use remap::{linspace, remap_positions, AddressMapping, RemappedStream, RemappedTrain};
pub use stream::EventStream;
