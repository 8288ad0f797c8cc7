//! The ordered collection of monitors of one experiment cycle.
//!
//! A registry is filled when populations are registered, populated once per
//! stimulation run and read afterwards. It is mutated only through
//! `import_monitors`, `create_from_populations`, `push` and `replace`; none of
//! them mutate anything when they fail. There is no internal locking.

use std::collections::BTreeSet;

use tracing::debug;

use crate::address::{AddressGroupSource, Channel};
use crate::capture::ChannelCapture;
use crate::config::MonitorConfig;
use crate::error::{AerResult, ValidationError};
use crate::rate::{BinnedRate, RateEstimator};
use crate::remap::RemappedStream;
use crate::stream::EventStream;

use super::aggregate::ChannelAggregate;
use super::bounds::{materialized_streams, BoundsQuery};
use super::import::MonitorImport;
use super::layout::{stack_rows, LayoutMode, RasterRow};
use super::monitor::Monitor;

/// Binned rate of one monitor, ready to be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct RateSummary {
    /// Short name of the monitor.
    pub label: String,
    /// Channel of the monitor.
    pub channel: Channel,
    /// Left edge of every bin.
    pub time_axis: Vec<f64>,
    /// Per-bin values.
    pub rate: BinnedRate,
}

/// Rate summaries of every monitor plus the largest value among them.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub struct RateReport {
    pub summaries: Vec<RateSummary>,
    pub max_rate: f64,
}

/// Ordered collection of monitors.
///
/// # Examples
///
/// ```
/// use aermon::{AddressGroup, BoundsQuery, ChannelCapture, Monitor, MonitorRegistry, RawCapture};
///
/// let mut registry = MonitorRegistry::new();
/// registry
///     .import_monitors(Monitor::new(AddressGroup::new("exc", 0, vec![1, 2])), true)
///     .unwrap();
///
/// let mut capture = ChannelCapture::new();
/// capture.insert(0, RawCapture::from_pairs([(1, 4.0), (2, 9.0)]));
/// registry.populate(&capture);
///
/// assert_eq!(registry.get_t_start().unwrap(), 4.0);
/// assert_eq!(registry.get_t_stop().unwrap(), 9.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MonitorRegistry {
    monitors: Vec<Monitor>,
    config: MonitorConfig,
}

impl MonitorRegistry {
    /// Creates an empty registry with the default config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry with `config`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidConfig` if `config` does not validate.
    pub fn with_config(config: MonitorConfig) -> AerResult<Self> {
        config.validate()?;
        Ok(Self {
            monitors: Vec::new(),
            config,
        })
    }

    /// Config the registry was built with.
    #[must_use]
    pub const fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Number of monitors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    /// True when the registry holds no monitor.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }

    /// Monitors in registry order.
    pub fn iter(&self) -> std::slice::Iter<'_, Monitor> {
        self.monitors.iter()
    }

    /// Mutable monitors in registry order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Monitor> {
        self.monitors.iter_mut()
    }

    /// Monitor at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Monitor> {
        self.monitors.get(index)
    }

    /// Mutable monitor at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Monitor> {
        self.monitors.get_mut(index)
    }

    /// Monitors as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Monitor] {
        &self.monitors
    }

    /// Appends one monitor.
    pub fn push(&mut self, monitor: Monitor) {
        self.monitors.push(monitor);
    }

    /// Replaces the monitor at `index`, returning the previous one.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::IndexOutOfBounds` if `index >= len`.
    pub fn replace(&mut self, index: usize, monitor: Monitor) -> AerResult<Monitor> {
        let len = self.monitors.len();
        let slot = self
            .monitors
            .get_mut(index)
            .ok_or(ValidationError::IndexOutOfBounds { index, len })?;
        Ok(std::mem::replace(slot, monitor))
    }

    /// Imports one monitor or a batch.
    ///
    /// Every item is resolved before the registry is touched. With `append`
    /// the items are added after the existing monitors, otherwise they replace
    /// them.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::TypeMismatch` if any item is neither a
    /// monitor nor a stream; the registry is left unchanged.
    pub fn import_monitors(&mut self, items: impl Into<MonitorImport>, append: bool) -> AerResult<()> {
        let monitors = items
            .into()
            .into_items()
            .into_iter()
            .map(super::import::ImportItem::into_monitor)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = monitors.len(), append, "importing monitors");
        self.install(monitors, append);
        Ok(())
    }

    /// Creates one monitor per population and returns the new monitors.
    ///
    /// Without `synapse` each monitor watches the population's soma group,
    /// otherwise the named synapse group.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::UnknownSynapse` if a population lacks the
    /// selected synapse group; the registry is left unchanged.
    pub fn create_from_populations<P: AddressGroupSource>(
        &mut self,
        populations: &[P],
        synapse: Option<&str>,
        append: bool,
    ) -> AerResult<&[Monitor]> {
        let monitors = populations
            .iter()
            .map(|pop| -> Result<Monitor, ValidationError> {
                let group = match synapse {
                    None => pop.soma(),
                    Some(kind) => pop.synapse(kind).ok_or_else(|| ValidationError::UnknownSynapse {
                        population: pop.name().to_string(),
                        synapse: kind.to_string(),
                    })?,
                };
                Ok(Monitor::new(group.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = monitors.len(), append, synapse, "creating monitors from populations");
        let start = if append { self.monitors.len() } else { 0 };
        self.install(monitors, append);
        Ok(&self.monitors[start..])
    }

    fn install(&mut self, monitors: Vec<Monitor>, append: bool) {
        if append {
            self.monitors.extend(monitors);
        } else {
            self.monitors = monitors;
        }
    }

    /// Distinct channels of all monitors.
    #[must_use]
    pub fn channels(&self) -> BTreeSet<Channel> {
        self.monitors.iter().map(Monitor::channel).collect()
    }

    /// Hands each monitor the capture of its channel.
    ///
    /// Monitors whose channel has no capture are skipped. Returns the number
    /// of monitors populated.
    pub fn populate(&mut self, capture: &ChannelCapture) -> usize {
        let mut populated = 0;
        for mon in &mut self.monitors {
            match capture.get(&mon.channel()) {
                Some(raw) => {
                    mon.populate(raw.clone());
                    populated += 1;
                }
                None => debug!(
                    monitor = %mon.name(),
                    channel = mon.channel(),
                    "no capture for channel, skipped"
                ),
            }
        }
        populated
    }

    /// Materializes every pending monitor.
    ///
    /// # Errors
    ///
    /// Propagates the first materialization failure.
    pub fn materialize_all(&mut self) -> AerResult<()> {
        materialized_streams(&mut self.monitors).map(|_| ())
    }

    /// Streams of all monitors that hold data, in registry order.
    ///
    /// # Errors
    ///
    /// Propagates materialization failures.
    pub fn streams(&mut self) -> AerResult<Vec<&EventStream>> {
        materialized_streams(&mut self.monitors)
    }

    /// Merges the streams of all monitors sharing a channel.
    ///
    /// Monitors that were never populated contribute nothing.
    ///
    /// # Errors
    ///
    /// Propagates materialization failures.
    pub fn to_channel_aggregate(&mut self) -> AerResult<ChannelAggregate> {
        self.materialize_all()?;
        let mut aggregate = ChannelAggregate::new();
        for mon in &self.monitors {
            if let Some(stream) = mon.materialized() {
                aggregate.insert(mon.channel(), stream);
            }
        }
        Ok(aggregate)
    }

    /// Extends every stream's `t_stop` to a common target.
    ///
    /// The target is `t_stop` if given, otherwise [`BoundsQuery::get_t_stop`]
    /// (`0.0` when no monitor observed an event). Bounds are only ever
    /// extended. Returns the target.
    ///
    /// # Errors
    ///
    /// Propagates materialization failures.
    pub fn normalize_bounds(&mut self, t_stop: Option<f64>) -> AerResult<f64> {
        self.materialize_all()?;
        let target = match t_stop {
            Some(t) => t,
            None => self.get_t_stop()?,
        };

        let extended = self
            .monitors
            .iter_mut()
            .filter_map(Monitor::materialized_mut)
            .map(|stream| stream.extend_t_stop(target))
            .filter(|&changed| changed)
            .count();
        debug!(target, extended, "normalized monitor bounds");
        Ok(target)
    }

    /// Every monitor's stream remapped onto its own index, `[i, i]`.
    ///
    /// # Errors
    ///
    /// Any monitor that cannot be read fails the whole call.
    pub fn remapped_streams(&mut self) -> AerResult<Vec<RemappedStream>> {
        self.monitors
            .iter_mut()
            .enumerate()
            .map(|(i, mon)| {
                #[allow(clippy::cast_precision_loss)]
                let row = i as f64;
                mon.remap(row, row)
            })
            .collect()
    }

    /// Lays the monitors out as stacked rows and remaps each into its row.
    ///
    /// `mode` defaults to the configured raster margins.
    ///
    /// # Errors
    ///
    /// Any monitor that cannot be read fails the whole call.
    pub fn raster_rows(&mut self, mode: Option<LayoutMode>) -> AerResult<Vec<RasterRow>> {
        let mode = mode.unwrap_or_else(|| {
            let (lo, hi) = self.config.raster_margins;
            LayoutMode::Margins { lo, hi }
        });

        let mut id_spans = Vec::with_capacity(self.monitors.len());
        for mon in &mut self.monitors {
            let ids = mon.stream()?.id_list();
            let span = match (ids.first(), ids.last()) {
                (Some(&lo), Some(&hi)) => f64::from(hi - lo),
                _ => 0.0,
            };
            id_spans.push(span);
        }

        stack_rows(&id_spans, mode)
            .into_iter()
            .zip(self.monitors.iter_mut())
            .map(|(span, mon)| -> AerResult<RasterRow> {
                Ok(RasterRow {
                    span,
                    label: mon.short_name().to_string(),
                    stream: mon.remap(span.s_start, span.s_stop)?,
                })
            })
            .collect()
    }

    /// Binned rate of every monitor.
    ///
    /// `time_bin` defaults to the configured bin width.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidTimeBin`, or fails if any monitor
    /// cannot be read.
    pub fn rate_summaries(&mut self, time_bin: Option<f64>, average: bool) -> AerResult<RateReport> {
        let time_bin = time_bin.unwrap_or(self.config.default_time_bin);
        let estimator = RateEstimator::from_config(&self.config);

        let mut summaries = Vec::with_capacity(self.monitors.len());
        let mut max_rate = 0.0_f64;
        for mon in &mut self.monitors {
            let rate = mon.firing_rates_with(&estimator, time_bin, average, None)?;
            max_rate = max_rate.max(rate.max());
            summaries.push(RateSummary {
                label: mon.short_name().to_string(),
                channel: mon.channel(),
                time_axis: rate.left_edges().to_vec(),
                rate,
            });
        }
        Ok(RateReport { summaries, max_rate })
    }
}

impl BoundsQuery for MonitorRegistry {
    fn bound_streams(&mut self) -> AerResult<Vec<&EventStream>> {
        materialized_streams(&mut self.monitors)
    }
}

impl<'a> IntoIterator for &'a MonitorRegistry {
    type Item = &'a Monitor;
    type IntoIter = std::slice::Iter<'a, Monitor>;

    fn into_iter(self) -> Self::IntoIter {
        self.monitors.iter()
    }
}
