//! Stacked row layout for multi-monitor raster views.
//!
//! Each monitor `i` gets a coordinate interval on the shared address axis;
//! remapping its addresses into that interval lets several populations share
//! one plot without overlapping.

use serde::{Deserialize, Serialize};

use crate::remap::RemappedStream;

/// How rows are sized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum LayoutMode {
    /// Unit-height rows; row `i` uses `[i + lo, i + hi]`.
    Margins { lo: f64, hi: f64 },

    /// Row heights proportional to each monitor's id span, scaled so the
    /// total height equals the number of rows.
    Proportional,
}

/// Interval reserved for one monitor.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RowSpan {
    pub index: usize,
    pub s_start: f64,
    pub s_stop: f64,
    /// Where a renderer should put the row label.
    pub center: f64,
}

/// A laid out row: its interval, label and remapped stream.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub struct RasterRow {
    pub span: RowSpan,
    pub label: String,
    pub stream: RemappedStream,
}

/// Computes row intervals.
///
/// `id_spans[i]` is `max id - min id` of monitor `i`; it is only read in
/// `Proportional` mode. When every span is zero, proportional rows fall back
/// to unit height.
#[must_use]
pub fn stack_rows(id_spans: &[f64], mode: LayoutMode) -> Vec<RowSpan> {
    match mode {
        LayoutMode::Margins { lo, hi } => (0..id_spans.len())
            .map(|index| {
                #[allow(clippy::cast_precision_loss)]
                let base = index as f64;
                RowSpan {
                    index,
                    s_start: base + lo,
                    s_stop: base + hi,
                    center: base + 0.5,
                }
            })
            .collect(),
        LayoutMode::Proportional => {
            let total: f64 = id_spans.iter().sum();
            #[allow(clippy::cast_precision_loss)]
            let rows = id_spans.len() as f64;
            let mut edge = 0.0;
            id_spans
                .iter()
                .enumerate()
                .map(|(index, &span)| {
                    let height = if total > 0.0 { span / total * rows } else { 1.0 };
                    let s_start = edge;
                    edge += height;
                    RowSpan {
                        index,
                        s_start,
                        s_stop: edge,
                        center: (s_start + edge) / 2.0,
                    }
                })
                .collect()
        }
    }
}
