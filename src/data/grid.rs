use super::model::Spectrum;
use crate::error::{Result, SpectralError};

// ---------------------------------------------------------------------------
// GridCoordinate – pixel address of a stage position
// ---------------------------------------------------------------------------

/// Pixel address of a spectrum: `column` indexes X, `row` indexes Y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCoordinate {
    pub column: usize,
    pub row: usize,
}

// ---------------------------------------------------------------------------
// SpectrumGrid – canonical 2-D arrangement of spectra
// ---------------------------------------------------------------------------

/// Spectra arranged by stage coordinate.
///
/// Canonical order is X ascending, then Y ascending. `columns` holds the
/// distinct X values; `rows[c]` holds the Y values of column `c` in the
/// order they were encountered after sorting. Read-only once built.
#[derive(Debug, Clone)]
pub struct SpectrumGrid {
    spectra: Vec<Spectrum>,
    columns: Vec<f64>,
    rows: Vec<Vec<f64>>,
    /// Index into `spectra` of the first spectrum of each column.
    offsets: Vec<usize>,
}

impl SpectrumGrid {
    /// Build the grid from a finalized list of spectra.
    pub fn from_spectra(mut spectra: Vec<Spectrum>) -> Result<Self> {
        if let Some(sp) = spectra
            .iter()
            .find(|sp| !sp.x.is_finite() || !sp.y.is_finite())
        {
            return Err(SpectralError::MalformedRecord {
                x: sp.x,
                y: sp.y,
                reason: "non-finite stage coordinate".into(),
            });
        }

        // -0.0 and 0.0 are the same stage position; fold them before
        // sorting so the order agrees with `==` grouping and lookups.
        for sp in &mut spectra {
            sp.x += 0.0;
            sp.y += 0.0;
        }

        // Two stable passes: Y first, then X, so Y order survives inside
        // each X group. Row indexing depends on this order.
        spectra.sort_by(|a, b| a.y.total_cmp(&b.y));
        spectra.sort_by(|a, b| a.x.total_cmp(&b.x));

        let mut columns: Vec<f64> = Vec::new();
        let mut rows: Vec<Vec<f64>> = Vec::new();
        let mut offsets: Vec<usize> = Vec::new();

        for (idx, sp) in spectra.iter().enumerate() {
            if columns.last() != Some(&sp.x) {
                columns.push(sp.x);
                rows.push(Vec::new());
                offsets.push(idx);
            }
            if let Some(column_rows) = rows.last_mut() {
                if column_rows.last() == Some(&sp.y) {
                    return Err(SpectralError::DuplicateCoordinate { x: sp.x, y: sp.y });
                }
                column_rows.push(sp.y);
            }
        }

        let grid = SpectrumGrid {
            spectra,
            columns,
            rows,
            offsets,
        };
        log::debug!(
            "built grid of {} spectra: {} x {}",
            grid.spectra.len(),
            grid.width(),
            grid.height()
        );
        Ok(grid)
    }

    /// Spectra in canonical order.
    pub fn spectra(&self) -> &[Spectrum] {
        &self.spectra
    }

    /// Distinct X values, ascending.
    pub fn columns(&self) -> &[f64] {
        &self.columns
    }

    /// Y values recorded for column `x`, if `x` is a known column.
    pub fn rows_for(&self, x: f64) -> Option<&[f64]> {
        self.column_index(x).map(|c| self.rows[c].as_slice())
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Length of the longest column.
    pub fn height(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.spectra.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spectra.is_empty()
    }

    fn column_index(&self, x: f64) -> Option<usize> {
        let c = self.columns.partition_point(|&cx| cx < x);
        (self.columns.get(c) == Some(&x)).then_some(c)
    }

    /// Pixel address of stage position (`x`, `y`).
    ///
    /// Both lookups are binary searches. Rows are sorted because
    /// construction sorts the spectra; the row search relies on that.
    pub fn resolve(&self, x: f64, y: f64) -> Result<GridCoordinate> {
        let not_found = || SpectralError::CoordinateNotFound { x, y };
        let column = self.column_index(x).ok_or_else(not_found)?;
        let ys = &self.rows[column];
        let row = ys.partition_point(|&ry| ry < y);
        if ys.get(row) != Some(&y) {
            return Err(not_found());
        }
        Ok(GridCoordinate { column, row })
    }

    /// The spectrum recorded at (`x`, `y`).
    pub fn spectrum_at(&self, x: f64, y: f64) -> Result<&Spectrum> {
        let coord = self.resolve(x, y)?;
        Ok(&self.spectra[self.offsets[coord.column] + coord.row])
    }

    /// Wavenumber axis of the first spectrum in canonical order.
    pub fn wavenumber_axis(&self) -> Option<&[f64]> {
        self.spectra.first().map(Spectrum::wavenumbers)
    }

    /// Dense `height x width` array with `value_fn(spectrum)` at each
    /// spectrum's coordinate; cells without a spectrum stay `0.0`.
    ///
    /// Row 0 is the lowest Y index. The first error from `value_fn` or from
    /// resolution aborts the whole array.
    pub fn to_dense_array<F>(&self, mut value_fn: F) -> Result<Heatmap>
    where
        F: FnMut(&Spectrum) -> Result<f64>,
    {
        let mut map = Heatmap::zeros(self.width(), self.height());
        for sp in &self.spectra {
            let coord = self.resolve(sp.x, sp.y)?;
            map.set(coord.row, coord.column, value_fn(sp)?);
        }
        Ok(map)
    }
}

// ---------------------------------------------------------------------------
// Heatmap – dense row-major 2-D array
// ---------------------------------------------------------------------------

/// Dense 2-D array of one scalar per grid cell, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    width: usize,
    height: usize,
    values: Vec<f64>,
}

impl Heatmap {
    pub fn zeros(width: usize, height: usize) -> Self {
        Heatmap {
            width,
            height,
            values: vec![0.0; width * height],
        }
    }

    /// Build from row vectors. Returns `None` if rows differ in length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Option<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != width) {
            return None;
        }
        Some(Heatmap {
            width,
            height,
            values: rows.into_iter().flatten().collect(),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        (row < self.height && column < self.width).then(|| self.values[row * self.width + column])
    }

    fn set(&mut self, row: usize, column: usize, value: f64) {
        self.values[row * self.width + column] = value;
    }

    /// Row slices, top (row 0) first.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.height).map(move |r| &self.values[r * self.width..(r + 1) * self.width])
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.rows().map(<[f64]>::to_vec).collect()
    }

    /// Largest cell value, `None` for an empty array.
    pub fn max(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::max)
    }

    /// Every cell divided by the maximum. Left unchanged when the maximum
    /// is not positive.
    pub fn normalized(&self) -> Heatmap {
        match self.max() {
            Some(max) if max > 0.0 => Heatmap {
                width: self.width,
                height: self.height,
                values: self.values.iter().map(|v| v / max).collect(),
            },
            _ => self.clone(),
        }
    }

    /// Swap rows and columns.
    pub fn transpose(&self) -> Heatmap {
        self.remap(self.height, self.width, |r, c| (c, r))
    }

    /// Reverse the row order.
    pub fn flip_vertical(&self) -> Heatmap {
        let h = self.height;
        self.remap(self.width, h, |r, c| (h - 1 - r, c))
    }

    /// Rotate 90 degrees counter-clockwise.
    pub fn rotate90(&self) -> Heatmap {
        let w = self.width;
        self.remap(self.height, w, |r, c| (c, w - 1 - r))
    }

    /// New array of `width x height` whose cell (r, c) is read from
    /// `self` at `source(r, c)`.
    fn remap<F>(&self, width: usize, height: usize, source: F) -> Heatmap
    where
        F: Fn(usize, usize) -> (usize, usize),
    {
        let mut values = Vec::with_capacity(width * height);
        for r in 0..height {
            for c in 0..width {
                let (sr, sc) = source(r, c);
                values.push(self.values[sr * self.width + sc]);
            }
        }
        Heatmap {
            width,
            height,
            values,
        }
    }
}
