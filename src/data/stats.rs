//! Small numeric helpers shared by the aggregate views.
//!
//! Missing values never reach these functions as zeros: callers pass
//! `Option`s or pre-filtered slices, and every ratio/mean over nothing is
//! `None` rather than `0.0` or `NaN`.

use serde::Serialize;

/// Arithmetic mean of the present values.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// `hits / total` as a percentage.
pub fn proportion(hits: usize, total: usize) -> Option<f64> {
    (total > 0).then(|| hits as f64 / total as f64 * 100.0)
}

/// Quantile of an ascending slice using linear interpolation between the
/// closest ranks. `q` is clamped to `[0, 1]`.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let pos = q.clamp(0.0, 1.0) * last as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let lo = *sorted.get(lower)?;
    let hi = *sorted.get(upper)?;
    Some(lo + (hi - lo) * (pos - lower as f64))
}

/// Five-number summary plus Tukey whiskers, the inputs of a box plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxSummary {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Smallest value within `1.5 * IQR` below `q1`.
    pub lower_whisker: f64,
    /// Largest value within `1.5 * IQR` above `q3`.
    pub upper_whisker: f64,
}

impl BoxSummary {
    pub fn from_values(mut values: Vec<f64>) -> Option<Self> {
        values.retain(|v| v.is_finite());
        values.sort_by(f64::total_cmp);

        let min = *values.first()?;
        let max = *values.last()?;
        let q1 = quantile(&values, 0.25)?;
        let median = quantile(&values, 0.5)?;
        let q3 = quantile(&values, 0.75)?;

        let fence = 1.5 * (q3 - q1);
        let lower_whisker = values
            .iter()
            .copied()
            .find(|v| *v >= q1 - fence)
            .unwrap_or(min);
        let upper_whisker = values
            .iter()
            .rev()
            .copied()
            .find(|v| *v <= q3 + fence)
            .unwrap_or(max);

        Some(Self {
            count: values.len(),
            min,
            q1,
            median,
            q3,
            max,
            lower_whisker,
            upper_whisker,
        })
    }
}

/// Equal-width bins spanning `[min, max]`, returned as `(lower, upper)` edges.
///
/// A degenerate range is widened by 0.5 on each side so a single repeated
/// value falls in the middle bin.
pub fn equal_width_bins(min: f64, max: f64, count: usize) -> Vec<(f64, f64)> {
    if count == 0 || !min.is_finite() || !max.is_finite() || max < min {
        return Vec::new();
    }
    let (lo, hi) = if max > min {
        (min, max)
    } else {
        (min - 0.5, max + 0.5)
    };
    let width = (hi - lo) / count as f64;
    (0..count)
        .map(|i| {
            let lower = lo + width * i as f64;
            let upper = if i + 1 == count {
                hi
            } else {
                lo + width * (i + 1) as f64
            };
            (lower, upper)
        })
        .collect()
}

/// Index of the bin holding `value`; the last bin is closed on the right.
pub fn bin_index(bins: &[(f64, f64)], value: f64) -> Option<usize> {
    let (lo, _) = *bins.first()?;
    let (_, hi) = *bins.last()?;
    if value < lo || value > hi {
        return None;
    }
    let width = (hi - lo) / bins.len() as f64;
    let idx = ((value - lo) / width).floor() as usize;
    Some(idx.min(bins.len() - 1))
}
