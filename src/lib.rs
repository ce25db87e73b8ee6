//! Reconstruct 2-D intensity maps from spectra recorded at (X, Y) stage
//! positions.
//!
//! Spectra are arranged on a [`SpectrumGrid`]; [`area_heatmap`] integrates a
//! wavenumber window per spectrum ([`Spectrum::area_under`]) and
//! [`intensity_slice`] reads a single wavenumber. [`analysis::baseline`] removes the background of one spectrum.

pub mod analysis;
pub mod config;
pub mod data;
pub mod error;

pub use analysis::baseline::BaselineMethod;
pub use analysis::integrate::{ChordStrategy, IntegratorOptions};
pub use analysis::reconstruct::{area_heatmap, intensity_slice};
pub use config::MapperConfig;
pub use data::grid::{GridCoordinate, Heatmap, SpectrumGrid};
pub use data::loader::{RawSpectrum, ScanLayout};
pub use data::model::{NearestPolicy, Spectrum};
pub use error::{Result, SpectralError};
