//! Spike monitors and the registry that owns them.
//!
//! A [`Monitor`] binds one address group to a stream that is built lazily from
//! raw capture data. A [`MonitorRegistry`] holds the monitors of one
//! experiment cycle and derives channel aggregates, common bounds, stacked
//! raster rows and rate summaries from them.

/// Channel-keyed merge of monitor streams.
pub mod aggregate;
/// Shared time-bound queries.
pub mod bounds;
/// Import input shapes.
pub mod import;
/// Stacked row layout.
pub mod layout;
/// The monitor and its materialization state machine.
#[allow(clippy::module_inception)]
pub mod monitor;
/// The monitor registry.
pub mod registry;
/// Plot style defaults.
pub mod style;

pub use aggregate::ChannelAggregate;
pub use bounds::{BoundsQuery, EMPTY_T_START, EMPTY_T_STOP};
pub use import::{ImportItem, MonitorImport};
pub use layout::{stack_rows, LayoutMode, RasterRow, RowSpan};
pub use monitor::{Monitor, MonitorPhase};
pub use registry::{MonitorRegistry, RateReport, RateSummary};
pub use style::PlotStyle;
