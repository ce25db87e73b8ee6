use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::analysis::integrate::IntegratorOptions;
use crate::data::loader::ScanLayout;
use crate::data::model::NearestPolicy;

// ---------------------------------------------------------------------------
// Mapper configuration
// ---------------------------------------------------------------------------

/// Settings shared by every `raman-map` command. Missing keys fall back to
/// [`MapperConfig::default`].
///
/// ```json
/// {
///   "layout": "line_scan",
///   "filter_negative_wavenumbers": true,
///   "integrator": { "single_point_fallback": false, "chord_strategy": "legacy" },
///   "nearest": "exact_or_lower",
///   "normalize_slices": false
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    pub layout: ScanLayout,
    pub filter_negative_wavenumbers: bool,
    pub integrator: IntegratorOptions,
    pub nearest: NearestPolicy,
    /// Divide every intensity slice by its maximum before writing it.
    pub normalize_slices: bool,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            layout: ScanLayout::Auto,
            filter_negative_wavenumbers: true,
            integrator: IntegratorOptions::default(),
            nearest: NearestPolicy::ExactOrLower,
            normalize_slices: false,
        }
    }
}

impl MapperConfig {
    /// Parse a JSON configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::integrate::ChordStrategy;

    #[test]
    fn empty_object_gives_defaults() {
        assert_eq!(MapperConfig::from_json("{}").unwrap(), MapperConfig::default());
    }

    #[test]
    fn partial_config_overrides_named_keys() {
        let cfg = MapperConfig::from_json(
            r#"{
                "layout": "area_scan",
                "integrator": { "chord_strategy": "geometric" },
                "nearest": "exact_or_higher"
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.layout, ScanLayout::AreaScan);
        assert_eq!(cfg.integrator.chord_strategy, ChordStrategy::Geometric);
        assert!(!cfg.integrator.single_point_fallback);
        assert_eq!(cfg.nearest, NearestPolicy::ExactOrHigher);
        assert!(cfg.filter_negative_wavenumbers);
    }

    #[test]
    fn unknown_enum_value_is_an_error() {
        assert!(MapperConfig::from_json(r#"{ "layout": "spiral" }"#).is_err());
    }
}
