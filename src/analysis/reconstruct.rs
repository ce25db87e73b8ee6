use crate::analysis::integrate::IntegratorOptions;
use crate::data::filter::check_window;
use crate::data::grid::{Heatmap, SpectrumGrid};
use crate::data::model::NearestPolicy;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Heatmap and slice reconstruction
// ---------------------------------------------------------------------------

/// Peak area over `[w_low, w_high]` for every spectrum, placed at its grid
/// coordinate.
///
/// Cells without a spectrum are `0.0`. Any spectrum that cannot be
/// integrated or resolved fails the whole call; no partial array is
/// returned.
pub fn area_heatmap(
    grid: &SpectrumGrid,
    w_low: f64,
    w_high: f64,
    options: &IntegratorOptions,
) -> Result<Heatmap> {
    check_window(w_low, w_high)?;
    let map = grid.to_dense_array(|sp| sp.area_under(w_low, w_high, options))?;
    log::info!(
        "area heatmap [{w_low}, {w_high}]: {} x {} from {} spectra",
        map.width(),
        map.height(),
        grid.len()
    );
    Ok(map)
}

/// Intensity at `wavenumber` for every spectrum, placed at its grid
/// coordinate.
///
/// One call produces one slice; building an image stack means calling this
/// for each wavenumber of [`SpectrumGrid::wavenumber_axis`].
pub fn intensity_slice(grid: &SpectrumGrid, wavenumber: f64, nearest: NearestPolicy) -> Result<Heatmap> {
    let map = grid.to_dense_array(|sp| sp.intensity_at(wavenumber, nearest))?;
    log::debug!("intensity slice at {wavenumber}: {} x {}", map.width(), map.height());
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Spectrum;
    use crate::error::SpectralError;

    const SERIES: [(f64, f64); 3] = [(100.0, 1.0), (200.0, 3.0), (300.0, 2.0)];

    fn grid_of(coords: &[(f64, f64)]) -> SpectrumGrid {
        let spectra = coords
            .iter()
            .map(|&(x, y)| Spectrum::from_records(x, y, SERIES, false).unwrap())
            .collect();
        SpectrumGrid::from_spectra(spectra).unwrap()
    }

    #[test]
    fn heatmap_places_areas_and_keeps_empty_cell_zero() {
        let grid = grid_of(&[(0.0, 0.0), (0.0, 1.0), (1.0, 0.0)]);
        let map = area_heatmap(&grid, 100.0, 300.0, &IntegratorOptions::default()).unwrap();
        assert_eq!((map.width(), map.height()), (2, 2));

        for &(x, y) in &[(0.0, 0.0), (0.0, 1.0), (1.0, 0.0)] {
            let c = grid.resolve(x, y).unwrap();
            let v = map.get(c.row, c.column).unwrap();
            assert!((v - 150.0).abs() < 1e-9, "({x}, {y}) -> {v}");
        }
        assert_eq!(map.get(1, 1), Some(0.0));
    }

    #[test]
    fn heatmap_fails_whole_call_on_one_bad_spectrum() {
        let mut spectra = vec![
            Spectrum::from_records(0.0, 0.0, SERIES, false).unwrap(),
            Spectrum::from_records(1.0, 0.0, vec![(100.0, 1.0)], false).unwrap(),
        ];
        spectra.reverse();
        let grid = SpectrumGrid::from_spectra(spectra).unwrap();
        let err = area_heatmap(&grid, 100.0, 300.0, &IntegratorOptions::default()).unwrap_err();
        assert!(matches!(err, SpectralError::InsufficientRange { found: 1, .. }));
    }

    #[test]
    fn heatmap_accepts_mixed_signed_zero_coordinates() {
        let grid = grid_of(&[(-0.0, 0.0), (0.0, 1.0), (1.0, -0.0)]);
        let map = area_heatmap(&grid, 100.0, 300.0, &IntegratorOptions::default()).unwrap();
        assert_eq!((map.width(), map.height()), (2, 2));
        assert_eq!(map.get(1, 1), Some(0.0));
        assert!((map.get(1, 0).unwrap() - 150.0).abs() < 1e-9);
    }

    #[test]
    fn heatmap_rejects_reversed_window() {
        let grid = grid_of(&[(0.0, 0.0)]);
        assert!(matches!(
            area_heatmap(&grid, 300.0, 100.0, &IntegratorOptions::default()),
            Err(SpectralError::InvalidRange { .. })
        ));
    }

    #[test]
    fn slice_reads_intensity_per_cell() {
        let grid = grid_of(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]);
        let map = intensity_slice(&grid, 200.0, NearestPolicy::ExactOrLower).unwrap();
        assert_eq!(map.to_rows(), vec![vec![3.0, 3.0], vec![0.0, 3.0]]);

        let shifted = intensity_slice(&grid, 200.0, NearestPolicy::ExactOrHigher).unwrap();
        assert_eq!(shifted.to_rows(), vec![vec![1.0, 1.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn slice_outside_axis_fails() {
        let grid = grid_of(&[(0.0, 0.0)]);
        assert!(matches!(
            intensity_slice(&grid, 50.0, NearestPolicy::ExactOrLower),
            Err(SpectralError::OutOfRange { .. })
        ));
    }
}
