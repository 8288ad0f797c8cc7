//! Time-binned rate estimation over event streams.

use serde::{Deserialize, Serialize};

use crate::config::MonitorConfig;
use crate::error::{AerResult, ValidationError};
use crate::stream::EventStream;

/// Per-bin values together with the bin edges they were computed on.
///
/// `edges` has one more entry than `values`. The last bin may be narrower
/// than the nominal bin width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinnedRate {
    edges: Vec<f64>,
    values: Vec<f64>,
}

impl BinnedRate {
    /// Bin edges, one more than there are values.
    #[must_use]
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// One value per bin.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Left edge of every bin, i.e. the time axis to plot values against.
    #[must_use]
    pub fn left_edges(&self) -> &[f64] {
        &self.edges[..self.values.len()]
    }

    /// Number of bins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when there is no bin.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Largest value, or `0.0` when there are no bins.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    /// Multiplies every value by `factor`.
    #[must_use]
    pub fn scaled(mut self, factor: f64) -> Self {
        for v in &mut self.values {
            *v *= factor;
        }
        self
    }

    /// Converts per-bin counts to Hz using the actual width of each bin.
    ///
    /// Zero-width bins report `0.0`.
    #[must_use]
    pub fn in_hz(&self, units_per_second: f64) -> Vec<f64> {
        self.values
            .iter()
            .zip(self.edges.windows(2))
            .map(|(&v, w)| {
                let width = w[1] - w[0];
                if width > 0.0 {
                    v / width * units_per_second
                } else {
                    0.0
                }
            })
            .collect()
    }
}

/// Computes binned and mean firing rates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateEstimator {
    units_per_second: f64,
}

impl Default for RateEstimator {
    fn default() -> Self {
        Self {
            units_per_second: 1000.0,
        }
    }
}

impl RateEstimator {
    /// Largest number of bins a single rate computation may produce.
    pub const MAX_BINS: usize = 1 << 20;

    /// Creates an estimator for timestamps with the given resolution.
    #[must_use]
    pub const fn new(units_per_second: f64) -> Self {
        Self { units_per_second }
    }

    /// Creates an estimator using the configured time resolution.
    #[must_use]
    pub const fn from_config(config: &MonitorConfig) -> Self {
        Self::new(config.time_units_per_second)
    }

    /// Timestamp units per second.
    #[must_use]
    pub const fn units_per_second(&self) -> f64 {
        self.units_per_second
    }

    /// Edges of fixed-width bins covering `[t_start, t_stop]`.
    ///
    /// There is always at least one bin. The last edge is exactly `t_stop`, so
    /// the last bin is narrower when the span is not a multiple of `time_bin`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidTimeBin` unless `time_bin` is finite and
    /// positive, or `ValidationError::TooManyBins` when the span would need
    /// more than [`RateEstimator::MAX_BINS`] bins.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn bin_edges(t_start: f64, t_stop: f64, time_bin: f64) -> AerResult<Vec<f64>> {
        if !(time_bin.is_finite() && time_bin > 0.0) {
            return Err(ValidationError::InvalidTimeBin { value: time_bin }.into());
        }

        let span = (t_stop - t_start).max(0.0);
        let requested = (span / time_bin).ceil();
        if requested.is_nan() || requested > Self::MAX_BINS as f64 {
            return Err(ValidationError::TooManyBins {
                time_bin,
                span,
                max_bins: Self::MAX_BINS,
            }
            .into());
        }
        let mut bins = (requested as usize).max(1);
        // Float noise can push the quotient just past an integer.
        while bins > 1 && (bins - 1) as f64 * time_bin >= span - time_bin * 1e-9 {
            bins -= 1;
        }

        let mut edges = Vec::with_capacity(bins + 1);
        edges.extend((0..bins).map(|k| t_start + k as f64 * time_bin));
        edges.push(t_start + span);
        Ok(edges)
    }

    /// Counts events per bin over `[t_start, t_stop]` of `stream`.
    ///
    /// With `average`, each bin total is divided by the number of ids in the
    /// domain. A stream with an empty domain yields all-zero bins.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidTimeBin` for a non-positive bin and
    /// `ValidationError::TooManyBins` for a bin too small for the span.
    pub fn firing_rate(
        &self,
        stream: &EventStream,
        time_bin: f64,
        average: bool,
    ) -> AerResult<BinnedRate> {
        let edges = Self::bin_edges(stream.t_start(), stream.t_stop(), time_bin)?;
        let bins = edges.len() - 1;
        let mut values = vec![0.0; bins];

        let t_start = stream.t_start();
        let t_stop = stream.t_stop();
        for (_, times) in stream.trains() {
            for &t in times {
                if t < t_start || t > t_stop {
                    continue;
                }
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let idx = (((t - t_start) / time_bin).floor() as usize).min(bins - 1);
                values[idx] += 1.0;
            }
        }

        let ids = stream.len();
        if average && ids > 0 {
            #[allow(clippy::cast_precision_loss)]
            let ids = ids as f64;
            for v in &mut values {
                *v /= ids;
            }
        }

        Ok(BinnedRate { edges, values })
    }

    /// Mean rate in Hz over `[t_start, t_stop]`, averaged over ids.
    ///
    /// The window defaults to the stream bounds. An empty domain or an empty
    /// window yields `0.0`.
    #[must_use]
    pub fn mean_rate(&self, stream: &EventStream, t_start: Option<f64>, t_stop: Option<f64>) -> f64 {
        let from = t_start.unwrap_or_else(|| stream.t_start());
        let to = t_stop.unwrap_or_else(|| stream.t_stop());
        let duration = to - from;
        if stream.is_empty() || duration <= 0.0 {
            return 0.0;
        }

        let total: usize = stream
            .trains()
            .map(|(_, times)| times.iter().filter(|&&t| t >= from && t <= to).count())
            .sum();

        #[allow(clippy::cast_precision_loss)]
        let per_id = total as f64 / stream.len() as f64;
        per_id / duration * self.units_per_second
    }
}
