/// Algorithms over spectra and grids.
///
/// * `integrate`   – trapezoidal peak area with chord subtraction
/// * `baseline`    – linear-regression and rubberband baseline removal
/// * `reconstruct` – heatmaps and intensity slices over a `SpectrumGrid`

pub mod baseline;
pub mod integrate;
pub mod reconstruct;
