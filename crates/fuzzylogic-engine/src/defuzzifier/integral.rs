//! Defuzzifiers that sample the fuzzy output over the variable's range.
//!
//! The range is split into `resolution` equal slices and the fuzzy output is
//! evaluated at the midpoint of each slice. Each method returns `None` when
//! the range is not finite, nothing was activated, or the sampled memberships
//! are all zero.

use crate::term::FuzzyOutput;

/// Midpoints `(x, μ(x))` of `resolution` slices of `[minimum, maximum]`.
fn samples<'a>(
    output: &'a FuzzyOutput<'a>,
    minimum: f64,
    maximum: f64,
    resolution: usize,
) -> Option<impl Iterator<Item = (f64, f64)> + 'a> {
    if !(minimum + maximum).is_finite() || resolution == 0 || output.is_empty() {
        return None;
    }
    let dx = (maximum - minimum) / resolution as f64;
    Some((0..resolution).map(move |i| {
        let x = minimum + (i as f64 + 0.5) * dx;
        (x, output.membership(x))
    }))
}

/// Centroid (Center of Area) defuzzification.
///
/// Computes: Σx·μ(x) / Σμ(x)
pub fn centroid(
    output: &FuzzyOutput<'_>,
    minimum: f64,
    maximum: f64,
    resolution: usize,
) -> Option<f64> {
    let mut area = 0.0;
    let mut moment = 0.0;
    for (x, y) in samples(output, minimum, maximum, resolution)? {
        area += y;
        moment += x * y;
    }
    if area == 0.0 {
        return None;
    }
    Some(moment / area)
}

/// Bisector of Area defuzzification.
///
/// Sweeps inwards from both ends, always extending the side with the smaller
/// accumulated area, and interpolates where the two sweeps meet.
pub fn bisector(
    output: &FuzzyOutput<'_>,
    minimum: f64,
    maximum: f64,
    resolution: usize,
) -> Option<f64> {
    if !(minimum + maximum).is_finite() || resolution == 0 || output.is_empty() {
        return None;
    }
    let config = output.config();
    let dx = (maximum - minimum) / resolution as f64;
    let (mut left, mut right) = (0usize, 0usize);
    let (mut left_area, mut right_area) = (0.0, 0.0);
    let (mut x_left, mut x_right) = (minimum, maximum);
    for _ in 0..resolution {
        if config.is_le(left_area, right_area) {
            x_left = minimum + (left as f64 + 0.5) * dx;
            left_area += output.membership(x_left);
            left += 1;
        } else {
            x_right = maximum - (right as f64 + 0.5) * dx;
            right_area += output.membership(x_right);
            right += 1;
        }
    }
    let total = left_area + right_area;
    if total == 0.0 {
        return None;
    }
    // The side with more area is pulled towards the other one.
    Some((left_area * x_right + right_area * x_left) / total)
}

/// Smallest (leftmost) of Maximum defuzzification.
pub fn smallest_of_maximum(
    output: &FuzzyOutput<'_>,
    minimum: f64,
    maximum: f64,
    resolution: usize,
) -> Option<f64> {
    let config = output.config();
    let mut best: Option<(f64, f64)> = None;
    for (x, y) in samples(output, minimum, maximum, resolution)? {
        if best.map_or(true, |(_, ymax)| config.is_gt(y, ymax)) {
            best = Some((x, y));
        }
    }
    best.filter(|&(_, ymax)| config.is_gt(ymax, 0.0))
        .map(|(x, _)| x)
}

/// Largest (rightmost) of Maximum defuzzification.
pub fn largest_of_maximum(
    output: &FuzzyOutput<'_>,
    minimum: f64,
    maximum: f64,
    resolution: usize,
) -> Option<f64> {
    let config = output.config();
    let mut best: Option<(f64, f64)> = None;
    for (x, y) in samples(output, minimum, maximum, resolution)? {
        if best.map_or(true, |(_, ymax)| config.is_ge(y, ymax)) {
            best = Some((x, y));
        }
    }
    best.filter(|&(_, ymax)| config.is_gt(ymax, 0.0))
        .map(|(x, _)| x)
}

/// Mean of Maximum defuzzification.
///
/// Returns the middle of the first plateau that reaches the maximum
/// membership.
pub fn mean_of_maximum(
    output: &FuzzyOutput<'_>,
    minimum: f64,
    maximum: f64,
    resolution: usize,
) -> Option<f64> {
    let config = output.config();
    let mut ymax = f64::NEG_INFINITY;
    let (mut x_smallest, mut x_largest) = (minimum, maximum);
    let mut same_plateau = false;
    for (x, y) in samples(output, minimum, maximum, resolution)? {
        if config.is_gt(y, ymax) {
            ymax = y;
            x_smallest = x;
            x_largest = x;
            same_plateau = true;
        } else if same_plateau && config.is_eq(y, ymax) {
            x_largest = x;
        } else if y < ymax {
            same_plateau = false;
        }
    }
    if !config.is_gt(ymax, 0.0) {
        return None;
    }
    Some((x_smallest + x_largest) / 2.0)
}
