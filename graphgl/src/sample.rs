//! Adaptive sampling along a single axis
//!
//! Sampling starts from an evenly spaced base grid, then recursively bisects
//! any interval where the secant slope on either side of its midpoint is
//! steeper than a threshold.  This concentrates samples where the function
//! changes quickly, with total work bounded by the maximum depth.
use log::trace;

/// Added to the denominator of each secant slope estimate
pub const SLOPE_EPSILON: f64 = 1e-6;

/// Settings for adaptive sampling
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SampleSettings {
    /// Number of evenly spaced points in the base grid (at least 2)
    pub base_count: usize,

    /// Maximum number of bisections applied to a single base interval
    pub max_depth: usize,

    /// Slope magnitude above which an interval is subdivided
    pub derivative_threshold: f64,
}

impl Default for SampleSettings {
    fn default() -> Self {
        Self {
            base_count: 100,
            max_depth: 6,
            derivative_threshold: 5.0,
        }
    }
}

/// Adaptively samples `f` over `[min, max]`
///
/// Returns sample coordinates sorted in ascending order, always including
/// `min` and `max` themselves.  Exact duplicates are removed, but nearby
/// subdivisions may still produce near-duplicates.
///
/// `f` may return `NaN`; a `NaN` at either end of an interval never triggers
/// subdivision, so the interval's left endpoint is recorded as-is.
///
/// If either bound is not finite, the result is empty.
///
/// ```
/// use graphgl::sample::{adaptive_sample, SampleSettings};
///
/// let settings = SampleSettings::default();
/// let flat = adaptive_sample(|_| 1.0, 0.0, 1.0, &settings);
/// assert_eq!(flat.len(), 100);
///
/// let steep = adaptive_sample(|x| 100.0 * x, 0.0, 1.0, &settings);
/// assert!(steep.len() > flat.len());
/// ```
pub fn adaptive_sample<F: FnMut(f64) -> f64>(
    mut f: F,
    min: f64,
    max: f64,
    settings: &SampleSettings,
) -> Vec<f64> {
    if !min.is_finite() || !max.is_finite() {
        return vec![];
    }
    let n = settings.base_count.max(2);
    let base: Vec<f64> = (0..n)
        .map(|i| min + (max - min) * (i as f64 / (n - 1) as f64))
        .collect();

    let mut out = vec![];
    let mut y0 = f(base[0]);
    for w in base.windows(2) {
        let y1 = f(w[1]);
        subdivide(&mut f, (w[0], y0), (w[1], y1), 0, settings, &mut out);
        y0 = y1;
    }
    out.push(max);

    out.sort_by(f64::total_cmp);
    out.dedup();
    trace!(
        "sampled [{min}, {max}] with {} points ({} base)",
        out.len(),
        n
    );
    out
}

/// Records samples for the interval between `a` and `b`, given as `(x, f(x))`
fn subdivide<F: FnMut(f64) -> f64>(
    f: &mut F,
    a: (f64, f64),
    b: (f64, f64),
    depth: usize,
    settings: &SampleSettings,
    out: &mut Vec<f64>,
) {
    let (x0, y0) = a;
    let (x1, y1) = b;
    if depth >= settings.max_depth {
        out.push(x0);
        return;
    }

    let xm = (x0 + x1) * 0.5;
    let ym = f(xm);

    let left = ((ym - y0) / (xm - x0 + SLOPE_EPSILON)).abs();
    let right = ((y1 - ym) / (x1 - xm + SLOPE_EPSILON)).abs();

    // Comparisons against NaN are false, so invalid regions are not refined
    if left > settings.derivative_threshold
        || right > settings.derivative_threshold
    {
        subdivide(f, a, (xm, ym), depth + 1, settings, out);
        subdivide(f, (xm, ym), b, depth + 1, settings, out);
    } else {
        out.push(x0);
    }
}
