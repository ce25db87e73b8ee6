use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::grid::SpectrumGrid;
use super::model::Spectrum;

// ---------------------------------------------------------------------------
// Raw ingestion output
// ---------------------------------------------------------------------------

/// Unsorted records for one stage position, as read from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSpectrum {
    pub x: f64,
    pub y: f64,
    /// `(wavenumber, intensity)` in file order.
    pub records: Vec<(f64, f64)>,
}

/// How spectra are laid out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanLayout {
    /// Directory → area scan, file → line scan.
    #[default]
    Auto,
    /// One file of `X  Y  wavenumber  intensity` rows.
    LineScan,
    /// A directory of `wavenumber  intensity` files, one per stage position,
    /// with `X_<x>` and `Y_<y>` in the file name.
    AreaScan,
}

impl ScanLayout {
    /// Replace `Auto` with the concrete layout for `path`.
    pub fn resolve_for(self, path: &Path) -> ScanLayout {
        match self {
            ScanLayout::Auto if path.is_dir() => ScanLayout::AreaScan,
            ScanLayout::Auto => ScanLayout::LineScan,
            other => other,
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Read raw spectra from `path` using `layout`.
pub fn load_raw(path: &Path, layout: ScanLayout) -> Result<Vec<RawSpectrum>> {
    match layout.resolve_for(path) {
        ScanLayout::AreaScan => read_area_scan(path),
        _ => read_line_scan(path),
    }
}

/// Read `path` and build the spectrum grid in one go.
pub fn load_grid(path: &Path, layout: ScanLayout, filter_negative_wavenumbers: bool) -> Result<SpectrumGrid> {
    let raw = load_raw(path, layout)?;
    let spectra = raw
        .into_iter()
        .map(|r| {
            Spectrum::from_records(r.x, r.y, r.records, filter_negative_wavenumbers)
                .with_context(|| format!("building spectrum at ({}, {})", r.x, r.y))
        })
        .collect::<Result<Vec<_>>>()?;
    let grid = SpectrumGrid::from_spectra(spectra)
        .with_context(|| format!("building grid from {}", path.display()))?;
    log::info!(
        "Loaded {} spectra from {} ({} columns, {} rows)",
        grid.len(),
        path.display(),
        grid.width(),
        grid.height()
    );
    Ok(grid)
}

// ---------------------------------------------------------------------------
// Line scan: one tab-separated file, four columns
// ---------------------------------------------------------------------------

/// Line-scan layout: every row is `X <tab> Y <tab> wavenumber <tab> intensity`.
/// Consecutive rows sharing (X, Y) form one spectrum; a change of (X, Y)
/// starts the next one.
pub fn read_line_scan(path: &Path) -> Result<Vec<RawSpectrum>> {
    let mut reader = tab_reader(path)?;
    let mut spectra: Vec<RawSpectrum> = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("{} row {row_no}", path.display()))?;
        let [x, y, wavenumber, intensity] = parse_fields::<4>(&record, row_no)
            .with_context(|| format!("in {}", path.display()))?;

        match spectra.last_mut() {
            Some(current) if current.x == x && current.y == y => {
                current.records.push((wavenumber, intensity));
            }
            _ => spectra.push(RawSpectrum {
                x,
                y,
                records: vec![(wavenumber, intensity)],
            }),
        }
    }

    log::debug!("{}: {} line-scan positions", path.display(), spectra.len());
    Ok(spectra)
}

// ---------------------------------------------------------------------------
// Area scan: directory of two-column files
// ---------------------------------------------------------------------------

/// Area-scan layout: every `*.txt` file in `dir` (sorted by name) holds one
/// spectrum as `wavenumber <tab> intensity` rows.
pub fn read_area_scan(dir: &Path) -> Result<Vec<RawSpectrum>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("listing {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()
        .with_context(|| format!("listing {}", dir.display()))?;
    files.retain(|p| p.is_file() && p.extension().and_then(|e| e.to_str()) == Some("txt"));
    files.sort();

    if files.is_empty() {
        bail!("No .txt spectra found in {}", dir.display());
    }

    files
        .iter()
        .map(|file| {
            let name = file
                .file_name()
                .and_then(|n| n.to_str())
                .with_context(|| format!("non UTF-8 file name {}", file.display()))?;
            let (x, y) = stage_coordinates(name)
                .with_context(|| format!("no X_/Y_ coordinates in file name '{name}'"))?;
            let records = read_spectrum_file(file)?;
            Ok(RawSpectrum { x, y, records })
        })
        .collect()
}

/// Two-column `wavenumber <tab> intensity` file.
pub fn read_spectrum_file(path: &Path) -> Result<Vec<(f64, f64)>> {
    let mut reader = tab_reader(path)?;
    reader
        .records()
        .enumerate()
        .map(|(row_no, result)| {
            let record = result.with_context(|| format!("{} row {row_no}", path.display()))?;
            let [wavenumber, intensity] = parse_fields::<2>(&record, row_no)
                .with_context(|| format!("in {}", path.display()))?;
            Ok((wavenumber, intensity))
        })
        .collect()
}

/// Stage coordinates embedded in a file name, e.g.
/// `map_X_-12.500_Y_+3.250.txt` → `(-12.5, 3.25)`. The last occurrence of
/// each token wins.
pub fn stage_coordinates(file_name: &str) -> Option<(f64, f64)> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN.get_or_init(|| {
        Regex::new(r"([XY])_([+-]?[0-9]+(?:\.[0-9]+)?)").expect("coordinate pattern is valid")
    });

    let mut x = None;
    let mut y = None;
    for caps in re.captures_iter(file_name) {
        let value = caps[2].parse::<f64>().ok()?;
        match &caps[1] {
            "X" => x = Some(value),
            _ => y = Some(value),
        }
    }
    Some((x?, y?))
}

// -- helpers --

fn tab_reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))
}

/// First `N` fields of a record as floats; extra columns are ignored.
fn parse_fields<const N: usize>(record: &csv::StringRecord, row: usize) -> Result<[f64; N]> {
    if record.len() < N {
        bail!("Row {row}: expected {N} columns, found {}", record.len());
    }
    let mut out = [0.0; N];
    for (j, slot) in out.iter_mut().enumerate() {
        let tok = &record[j];
        *slot = tok
            .parse::<f64>()
            .with_context(|| format!("Row {row}, column {j}: '{tok}' is not a number"))?;
    }
    Ok(out)
}
