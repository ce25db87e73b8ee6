use crate::error::{Result, SpectralError};

// ---------------------------------------------------------------------------
// Wavenumber window: validation and culling
// ---------------------------------------------------------------------------

/// Reject windows whose bounds are out of order (or NaN).
pub fn check_window(w_low: f64, w_high: f64) -> Result<()> {
    if w_low <= w_high {
        Ok(())
    } else {
        Err(SpectralError::InvalidRange { w_low, w_high })
    }
}

/// Index range of the points with `w_low <= w <= w_high`.
///
/// `wavenumbers` must be sorted ascending. The returned range may be empty.
pub fn window_indices(wavenumbers: &[f64], w_low: f64, w_high: f64) -> std::ops::Range<usize> {
    let start = wavenumbers.partition_point(|&w| w < w_low);
    let end = wavenumbers.partition_point(|&w| w <= w_high);
    start..end.max(start)
}

/// Points inside the inclusive window, as `(wavenumbers, intensities)` slices.
pub fn inclusive_window<'a>(
    wavenumbers: &'a [f64],
    intensities: &'a [f64],
    w_low: f64,
    w_high: f64,
) -> (&'a [f64], &'a [f64]) {
    let range = window_indices(wavenumbers, w_low, w_high);
    (&wavenumbers[range.clone()], &intensities[range])
}

/// Points strictly inside `(w_low, w_high)`.
///
/// The integrator uses inclusive bounds; callers reproducing the older
/// exclusive behaviour pre-filter with this before integrating.
pub fn exclusive_window(
    wavenumbers: &[f64],
    intensities: &[f64],
    w_low: f64,
    w_high: f64,
) -> (Vec<f64>, Vec<f64>) {
    wavenumbers
        .iter()
        .zip(intensities)
        .filter(|(w, _)| **w > w_low && **w < w_high)
        .map(|(&w, &i)| (w, i))
        .unzip()
}

/// Drop records whose wavenumber is negative.
pub fn drop_negative_wavenumbers(records: &mut Vec<(f64, f64)>) {
    records.retain(|&(w, _)| w >= 0.0);
}
