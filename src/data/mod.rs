/// Data layer: spectra, the stage-coordinate grid, and ingestion.
///
/// Architecture:
/// ```text
///  line-scan file / area-scan directory
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse records → (x, y, records)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  model    │  Spectrum::from_records (sorted, deduplicated axis)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ SpectrumGrid  │  canonical order, (x, y) → (column, row)
///   └──────────────┘
/// ```

pub mod filter;
pub mod grid;
pub mod loader;
pub mod model;
