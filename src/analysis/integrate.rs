use serde::{Deserialize, Serialize};

use crate::data::filter::{check_window, inclusive_window};
use crate::error::{Result, SpectralError};

// ---------------------------------------------------------------------------
// Chord subtraction strategies
// ---------------------------------------------------------------------------

/// How the area below the peak's end points is computed before it is
/// subtracted from the trapezoidal sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChordStrategy {
    /// Rectangle plus triangle built from `|Δintensity| * |Δwavenumber|`.
    /// Reproduces the numbers of existing analyses; it is not the area under
    /// the chord.
    #[default]
    Legacy,
    /// Trapezoid between the chord and the zero line.
    Geometric,
}

impl ChordStrategy {
    /// Area to subtract, given the first and last `(wavenumber, intensity)`
    /// points of the culled window.
    pub fn chord_area(self, first: (f64, f64), last: (f64, f64)) -> f64 {
        match self {
            ChordStrategy::Legacy => {
                let horiz = (last.1 - first.1).abs();
                let vert = (last.0 - first.0).abs();
                let area_rec = horiz * vert;
                let area_tri = 0.5 * horiz * vert;
                area_rec + area_tri
            }
            ChordStrategy::Geometric => 0.5 * (first.1 + last.1) * (last.0 - first.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Knobs for [`Spectrum::area_under`](crate::data::model::Spectrum::area_under).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegratorOptions {
    /// When exactly one point falls in the window, return its intensity
    /// instead of failing.
    pub single_point_fallback: bool,
    /// Baseline term subtracted from the trapezoidal sum.
    pub chord_strategy: ChordStrategy,
}

// ---------------------------------------------------------------------------
// Trapezoidal peak area
// ---------------------------------------------------------------------------

/// Peak area over the inclusive window `[w_low, w_high]`.
///
/// Sums the trapezoids between consecutive points in the window, then
/// subtracts the chord term chosen in `options`. The result is not clamped
/// and may be negative. `wavenumbers` must be ascending and aligned with
/// `intensities`; [`Spectrum::area_under`] is the public entry point and
/// guarantees both.
///
/// [`Spectrum::area_under`]: crate::data::model::Spectrum::area_under
pub(crate) fn area_between(
    wavenumbers: &[f64],
    intensities: &[f64],
    w_low: f64,
    w_high: f64,
    options: &IntegratorOptions,
) -> Result<f64> {
    check_window(w_low, w_high)?;
    let (w, y) = inclusive_window(wavenumbers, intensities, w_low, w_high);

    match w.len() {
        1 if options.single_point_fallback => {
            log::warn!("single point in [{w_low}, {w_high}], returning its intensity");
            return Ok(y[0]);
        }
        n if n < 2 => {
            return Err(SpectralError::InsufficientRange {
                w_low,
                w_high,
                found: n,
                required: 2,
            });
        }
        _ => {}
    }

    let mut total_area = 0.0;
    for i in 0..w.len() - 1 {
        let dx = w[i + 1] - w[i];
        let r_y = y[i];
        let t_y = y[i + 1] - r_y;
        total_area += r_y * dx + 0.5 * dx * t_y;
    }

    let last = w.len() - 1;
    let chord = options
        .chord_strategy
        .chord_area((w[0], y[0]), (w[last], y[last]));
    log::trace!(
        "{} points in [{w_low}, {w_high}]: sum {total_area}, chord {chord}",
        w.len()
    );
    Ok(total_area - chord)
}
