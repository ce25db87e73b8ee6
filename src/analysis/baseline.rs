//! Baseline removal for a single spectrum.
//!
//! Two independent methods are available:
//!
//! 1. **Linear regression**: an ordinary least-squares line is fitted to the
//!    points inside the wavenumber window and subtracted from the whole
//!    series. Negative results are clamped to zero.
//!
//! 2. **Rubberband**: the lower convex envelope of the whole series is used
//!    as a piecewise-linear baseline. Hull vertices end up exactly at zero;
//!    nothing is clamped.
//!
//! Both return a new [`Spectrum`]; the input is never modified.

use serde::{Deserialize, Serialize};

use crate::data::filter::{check_window, inclusive_window};
use crate::data::model::Spectrum;
use crate::error::{Result, SpectralError};

/// Baseline removal method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineMethod {
    LinearRegression,
    Rubberband,
}

/// Remove the baseline of `spectrum` with `method`.
///
/// The rubberband method always works on the full series; the window is
/// still validated so both methods reject the same bad input.
pub fn correct(spectrum: &Spectrum, w_low: f64, w_high: f64, method: BaselineMethod) -> Result<Spectrum> {
    match method {
        BaselineMethod::LinearRegression => linear_regression_correct(spectrum, w_low, w_high),
        BaselineMethod::Rubberband => {
            check_window(w_low, w_high)?;
            rubberband_correct(spectrum)
        }
    }
}

// ---------------------------------------------------------------------------
// Linear regression
// ---------------------------------------------------------------------------

/// Subtract the least-squares line fitted over `[w_low, w_high]`, clamping
/// at zero.
pub fn linear_regression_correct(spectrum: &Spectrum, w_low: f64, w_high: f64) -> Result<Spectrum> {
    check_window(w_low, w_high)?;
    let (w, y) = inclusive_window(spectrum.wavenumbers(), spectrum.intensities(), w_low, w_high);
    let insufficient = SpectralError::InsufficientRange {
        w_low,
        w_high,
        found: w.len(),
        required: 2,
    };
    if w.len() < 2 {
        return Err(insufficient);
    }
    let (slope, intercept) = linear_fit(w, y).ok_or(insufficient)?;
    log::debug!(
        "spectrum ({}, {}): regression baseline slope {slope}, intercept {intercept}",
        spectrum.x,
        spectrum.y
    );

    let corrected = spectrum
        .series()
        .map(|(wn, i)| (i - (slope * wn + intercept)).max(0.0))
        .collect();
    Ok(spectrum.with_intensities(corrected))
}

/// Ordinary least squares `y = slope * x + intercept`.
///
/// `None` when the x values have no spread.
fn linear_fit(x: &[f64], y: &[f64]) -> Option<(f64, f64)> {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;
    let sxx: f64 = x.iter().map(|xi| (xi - mean_x).powi(2)).sum();
    let sxy: f64 = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| (xi - mean_x) * (yi - mean_y))
        .sum();
    if sxx <= 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    Some((slope, mean_y - slope * mean_x))
}

// ---------------------------------------------------------------------------
// Rubberband (convex hull)
// ---------------------------------------------------------------------------

/// Subtract the rubberband baseline from the full series.
pub fn rubberband_correct(spectrum: &Spectrum) -> Result<Spectrum> {
    let baseline = rubberband_baseline(spectrum.wavenumbers(), spectrum.intensities())?;
    let corrected = spectrum
        .intensities()
        .iter()
        .zip(&baseline)
        .map(|(i, b)| i - b)
        .collect();
    Ok(spectrum.with_intensities(corrected))
}

/// Lower convex envelope of the series, evaluated at every wavenumber.
pub fn rubberband_baseline(wavenumbers: &[f64], intensities: &[f64]) -> Result<Vec<f64>> {
    let points: Vec<(f64, f64)> = wavenumbers
        .iter()
        .copied()
        .zip(intensities.iter().copied())
        .collect();
    let mut hull = convex_hull(&points)?;

    // Start at the smallest wavenumber; walking counter-clockwise from there
    // the lower envelope is the run of increasing wavenumbers.
    let start = hull
        .iter()
        .enumerate()
        .min_by(|a, b| points[*a.1].0.total_cmp(&points[*b.1].0))
        .map_or(0, |(pos, _)| pos);
    hull.rotate_left(start);

    let mut knots_x = vec![points[hull[0]].0];
    let mut knots_y = vec![points[hull[0]].1];
    for &v in &hull[1..] {
        let (x, y) = points[v];
        if x <= knots_x[knots_x.len() - 1] {
            break;
        }
        knots_x.push(x);
        knots_y.push(y);
    }
    log::debug!("rubberband: {} hull vertices, {} on the lower envelope", hull.len(), knots_x.len());

    Ok(wavenumbers
        .iter()
        .map(|&w| interpolate(&knots_x, &knots_y, w))
        .collect())
}

/// Convex hull of `points` as vertex indices in counter-clockwise order,
/// starting from the lowest point among those with the smallest x.
///
/// Collinear points on an edge are not reported as vertices. Fails when the
/// hull has no area.
pub fn convex_hull(points: &[(f64, f64)]) -> Result<Vec<usize>> {
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| {
        points[a]
            .0
            .total_cmp(&points[b].0)
            .then(points[a].1.total_cmp(&points[b].1))
    });
    order.dedup_by(|a, b| points[*a] == points[*b]);
    if order.len() < 3 {
        return Err(SpectralError::DegenerateGeometry(format!(
            "{} distinct point(s), need at least 3",
            order.len()
        )));
    }

    let cross = |o: usize, a: usize, b: usize| {
        let (po, pa, pb) = (points[o], points[a], points[b]);
        (pa.0 - po.0) * (pb.1 - po.1) - (pa.1 - po.1) * (pb.0 - po.0)
    };
    let half_hull = |indices: &mut dyn Iterator<Item = usize>| {
        let mut chain: Vec<usize> = Vec::new();
        for i in indices {
            while chain.len() >= 2 && cross(chain[chain.len() - 2], chain[chain.len() - 1], i) <= 0.0 {
                chain.pop();
            }
            chain.push(i);
        }
        chain
    };

    let mut lower = half_hull(&mut order.iter().copied());
    let mut upper = half_hull(&mut order.iter().rev().copied());
    lower.pop();
    upper.pop();
    lower.extend(upper);

    if lower.len() < 3 {
        return Err(SpectralError::DegenerateGeometry("points are collinear".into()));
    }
    Ok(lower)
}

/// Piecewise-linear interpolation through ascending knots, held constant
/// beyond the ends. Exact at knot positions.
fn interpolate(knots_x: &[f64], knots_y: &[f64], x: f64) -> f64 {
    let last = knots_x.len() - 1;
    let j = knots_x.partition_point(|&k| k < x);
    if j > last {
        return knots_y[last];
    }
    if knots_x[j] == x || j == 0 {
        return knots_y[j];
    }
    let (x0, x1) = (knots_x[j - 1], knots_x[j]);
    let (y0, y1) = (knots_y[j - 1], knots_y[j]);
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spectrum(points: impl IntoIterator<Item = (f64, f64)>) -> Spectrum {
        Spectrum::from_records(0.0, 0.0, points, false).unwrap()
    }

    #[test]
    fn regression_flattens_linear_series() {
        let sp = spectrum((0..20).map(|i| {
            let w = 400.0 + 10.0 * i as f64;
            (w, 0.25 * w - 3.0)
        }));
        let corrected = linear_regression_correct(&sp, 450.0, 550.0).unwrap();
        assert!(corrected.intensities().iter().all(|v| v.abs() < 1e-9));
    }

    #[test]
    fn regression_subtracts_over_full_series_and_clamps() {
        // Flat baseline of 1 with a peak at 300; window covers only the baseline.
        let sp = spectrum(vec![(100.0, 1.0), (200.0, 1.0), (300.0, 6.0), (400.0, 0.5)]);
        let corrected = linear_regression_correct(&sp, 100.0, 200.0).unwrap();
        assert_eq!(corrected.intensities(), &[0.0, 0.0, 5.0, 0.0]);
        assert_eq!(sp.intensities(), &[1.0, 1.0, 6.0, 0.5]);
    }

    #[test]
    fn regression_needs_two_points() {
        let sp = spectrum(vec![(100.0, 1.0), (200.0, 2.0), (300.0, 3.0)]);
        assert!(matches!(
            linear_regression_correct(&sp, 150.0, 250.0),
            Err(SpectralError::InsufficientRange { found: 1, .. })
        ));
        assert!(matches!(
            linear_regression_correct(&sp, 250.0, 150.0),
            Err(SpectralError::InvalidRange { .. })
        ));
    }

    #[test]
    fn hull_is_counter_clockwise_from_leftmost() {
        let pts = [(0.0, 0.0), (1.0, 1.0), (2.0, 0.0), (1.0, -1.0), (1.0, 0.0)];
        let hull = convex_hull(&pts).unwrap();
        assert_eq!(hull, vec![0, 3, 2, 1]);
    }

    #[test]
    fn hull_rejects_degenerate_input() {
        assert!(matches!(
            convex_hull(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]),
            Err(SpectralError::DegenerateGeometry(_))
        ));
        assert!(convex_hull(&[(0.0, 0.0), (1.0, 1.0), (0.0, 0.0)]).is_err());
    }

    #[test]
    fn rubberband_on_convex_series_touches_zero() {
        let sp = spectrum((0..11).map(|i| {
            let w = i as f64;
            (w, (w - 5.0).powi(2) + 2.0)
        }));
        let corrected = rubberband_correct(&sp).unwrap();
        assert!(corrected.intensities().iter().all(|&v| v >= 0.0));
        assert!(corrected.intensities().iter().filter(|&&v| v == 0.0).count() >= 2);
    }

    #[test]
    fn rubberband_removes_sloped_background_under_peak() {
        // Background 0.1 * w with a bump at w = 3.
        let intensities = [0.0, 0.1, 0.7, 1.3, 0.6, 0.5, 0.6];
        let sp = spectrum(intensities.iter().enumerate().map(|(i, &y)| (i as f64, y)));
        let corrected = rubberband_correct(&sp).unwrap();
        let c = corrected.intensities();
        assert_eq!(c[0], 0.0);
        assert_eq!(c[6], 0.0);
        assert!((c[3] - 1.0).abs() < 1e-9, "got {}", c[3]);
        assert!(c.iter().all(|&v| v > -1e-12));
    }

    #[test]
    fn rubberband_rejects_straight_line() {
        let sp = spectrum((0..5).map(|i| (i as f64, 2.0 * i as f64)));
        assert!(matches!(
            correct(&sp, 0.0, 4.0, BaselineMethod::Rubberband),
            Err(SpectralError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn interpolation_is_exact_at_knots_and_flat_outside() {
        let kx = [0.0, 2.0, 4.0];
        let ky = [1.0, 3.0, 1.0];
        assert_eq!(interpolate(&kx, &ky, 2.0), 3.0);
        assert_eq!(interpolate(&kx, &ky, 1.0), 2.0);
        assert_eq!(interpolate(&kx, &ky, -1.0), 1.0);
        assert_eq!(interpolate(&kx, &ky, 9.0), 1.0);
    }
}
