use itertools::{Itertools, MinMaxResult};

/// Smallest and largest value, ignoring ordering quirks of NaN
pub fn span(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    match values.into_iter().minmax_by(|a, b| a.total_cmp(b)) {
        MinMaxResult::NoElements => None,
        MinMaxResult::OneElement(v) => Some((v, v)),
        MinMaxResult::MinMax(lo, hi) => Some((lo, hi)),
    }
}

/// Vertical distance between stacked traces so the widest one does not
/// overlap its neighbours
pub fn channel_spacing(spans: impl IntoIterator<Item = (f64, f64)>) -> f64 {
    let widest = spans
        .into_iter()
        .map(|(lo, hi)| hi - lo)
        .fold(0.0, f64::max);
    if widest > 0.0 {
        widest * 1.1
    } else {
        1.0
    }
}

/// Y bounds covering every trace, padded a little and never empty
pub fn y_bounds<'a>(traces: impl IntoIterator<Item = &'a [(f64, f64)]>) -> [f64; 2] {
    let Some((lo, hi)) = span(traces.into_iter().flatten().map(|&(_, y)| y)) else {
        return [-1.0, 1.0];
    };
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 1.0 };
    [lo - pad, hi + pad]
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
