use serde::{Deserialize, Serialize};

use super::filter::drop_negative_wavenumbers;
use crate::analysis::integrate::{area_between, IntegratorOptions};
use crate::error::{Result, SpectralError};

// ---------------------------------------------------------------------------
// NearestPolicy – how an intensity lookup snaps to the wavenumber axis
// ---------------------------------------------------------------------------

/// Index convention for [`Spectrum::intensity_at`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NearestPolicy {
    /// Intensity at the insertion point: the first sample at or after the
    /// requested wavenumber.
    #[default]
    ExactOrLower,
    /// Insertion point shifted back by one sample (line-scan convention).
    ExactOrHigher,
}

// ---------------------------------------------------------------------------
// Spectrum – one (X, Y) stage position
// ---------------------------------------------------------------------------

/// A single spectrum sampled at stage position (`x`, `y`).
///
/// The wavenumber axis is strictly increasing. The series is never mutated
/// after construction; baseline correction produces a new `Spectrum`.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    /// Stage X coordinate.
    pub x: f64,
    /// Stage Y coordinate.
    pub y: f64,
    wavenumbers: Vec<f64>,
    intensities: Vec<f64>,
}

impl Spectrum {
    /// Build a spectrum from unordered `(wavenumber, intensity)` records.
    ///
    /// Records are sorted by wavenumber; repeated wavenumbers keep the first
    /// record seen. With `filter_negative_wavenumbers` set, records with a
    /// negative wavenumber are dropped first.
    pub fn from_records<I>(x: f64, y: f64, records: I, filter_negative_wavenumbers: bool) -> Result<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut records: Vec<(f64, f64)> = records.into_iter().collect();
        if filter_negative_wavenumbers {
            drop_negative_wavenumbers(&mut records);
        }
        if records.is_empty() {
            return Err(SpectralError::MalformedRecord {
                x,
                y,
                reason: "no records left after filtering".into(),
            });
        }
        if let Some((w, _)) = records.iter().find(|(w, _)| !w.is_finite()) {
            return Err(SpectralError::MalformedRecord {
                x,
                y,
                reason: format!("non-finite wavenumber {w}"),
            });
        }

        // Fold -0.0 into 0.0 so the sort below agrees with `==`.
        for record in &mut records {
            record.0 += 0.0;
        }

        // Stable: among equal wavenumbers the load order survives, so
        // dedup keeps the first occurrence.
        records.sort_by(|a, b| a.0.total_cmp(&b.0));
        let before = records.len();
        records.dedup_by(|later, earlier| later.0 == earlier.0);
        if records.len() != before {
            log::warn!(
                "spectrum ({x}, {y}): collapsed {} duplicate wavenumber record(s)",
                before - records.len()
            );
        }

        let (wavenumbers, intensities) = records.into_iter().unzip();
        Ok(Spectrum {
            x,
            y,
            wavenumbers,
            intensities,
        })
    }

    /// Same stage position and axis, new intensities.
    pub(crate) fn with_intensities(&self, intensities: Vec<f64>) -> Self {
        debug_assert_eq!(intensities.len(), self.wavenumbers.len());
        Spectrum {
            x: self.x,
            y: self.y,
            wavenumbers: self.wavenumbers.clone(),
            intensities,
        }
    }

    /// Wavenumber axis, ascending.
    pub fn wavenumbers(&self) -> &[f64] {
        &self.wavenumbers
    }

    /// Intensities, aligned with [`Spectrum::wavenumbers`].
    pub fn intensities(&self) -> &[f64] {
        &self.intensities
    }

    /// `(wavenumber, intensity)` pairs in ascending wavenumber order.
    pub fn series(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.wavenumbers
            .iter()
            .copied()
            .zip(self.intensities.iter().copied())
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.wavenumbers.len()
    }

    /// Always false for a constructed spectrum.
    pub fn is_empty(&self) -> bool {
        self.wavenumbers.is_empty()
    }

    /// Intensity at `wavenumber` using a binary search over the axis.
    pub fn intensity_at(&self, wavenumber: f64, nearest: NearestPolicy) -> Result<f64> {
        let first = self.wavenumbers[0];
        let last = self.wavenumbers[self.wavenumbers.len() - 1];
        if !(first <= wavenumber && wavenumber <= last) {
            return Err(SpectralError::OutOfRange {
                wavenumber,
                first,
                last,
            });
        }

        let idx = self.wavenumbers.partition_point(|&w| w < wavenumber);
        let idx = match nearest {
            NearestPolicy::ExactOrLower => idx,
            // At the first sample there is nothing to step back to.
            NearestPolicy::ExactOrHigher => idx.saturating_sub(1),
        };
        Ok(self.intensities[idx])
    }

    /// Peak area over the inclusive window `[w_low, w_high]`: trapezoidal
    /// sum minus the chord term selected in `options`. May be negative.
    pub fn area_under(&self, w_low: f64, w_high: f64, options: &IntegratorOptions) -> Result<f64> {
        area_between(&self.wavenumbers, &self.intensities, w_low, w_high, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Spectrum {
        Spectrum::from_records(
            0.0,
            0.0,
            vec![(300.0, 2.0), (100.0, 1.0), (200.0, 3.0)],
            true,
        )
        .unwrap()
    }

    #[test]
    fn records_are_sorted_by_wavenumber() {
        let sp = sample();
        assert_eq!(sp.wavenumbers(), &[100.0, 200.0, 300.0]);
        assert_eq!(sp.intensities(), &[1.0, 3.0, 2.0]);
        assert!(sp.wavenumbers().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn duplicate_wavenumbers_keep_first_record() {
        let sp = Spectrum::from_records(
            1.0,
            2.0,
            vec![(200.0, 5.0), (100.0, 1.0), (200.0, 9.0)],
            false,
        )
        .unwrap();
        assert_eq!(sp.wavenumbers(), &[100.0, 200.0]);
        assert_eq!(sp.intensities(), &[1.0, 5.0]);
    }

    #[test]
    fn signed_zero_wavenumbers_collapse_to_first_record() {
        let sp = Spectrum::from_records(0.0, 0.0, vec![(0.0, 7.0), (-0.0, 9.0), (5.0, 1.0)], false).unwrap();
        assert_eq!(sp.wavenumbers(), &[0.0, 5.0]);
        assert_eq!(sp.intensities(), &[7.0, 1.0]);
        assert!(sp.wavenumbers()[0].is_sign_positive());
        assert_eq!(sp.intensity_at(0.0, NearestPolicy::ExactOrLower).unwrap(), 7.0);
        assert_eq!(sp.intensity_at(-0.0, NearestPolicy::ExactOrLower).unwrap(), 7.0);
    }

    #[test]
    fn area_follows_sorted_axis() {
        // Intensities stay attached to their wavenumbers through sorting.
        let sp = Spectrum::from_records(0.0, 0.0, vec![(2.0, 3.0), (0.0, 1.0), (1.0, 5.0)], false).unwrap();
        let area = sp.area_under(0.0, 2.0, &IntegratorOptions::default()).unwrap();
        assert!((area - 1.0).abs() < 1e-9, "got {area}");
    }

    #[test]
    fn negative_filter_is_optional() {
        let records = vec![(-10.0, 4.0), (10.0, 1.0)];
        let kept = Spectrum::from_records(0.0, 0.0, records.clone(), false).unwrap();
        assert_eq!(kept.len(), 2);
        let filtered = Spectrum::from_records(0.0, 0.0, records, true).unwrap();
        assert_eq!(filtered.series().collect::<Vec<_>>(), vec![(10.0, 1.0)]);
    }

    #[test]
    fn empty_after_filtering_is_malformed() {
        let err = Spectrum::from_records(3.0, 4.0, vec![(-1.0, 1.0)], true).unwrap_err();
        assert!(matches!(err, SpectralError::MalformedRecord { x, y, .. } if x == 3.0 && y == 4.0));
        assert!(Spectrum::from_records(0.0, 0.0, Vec::new(), false).is_err());
    }

    #[test]
    fn nan_wavenumber_is_malformed() {
        let err = Spectrum::from_records(0.0, 0.0, vec![(f64::NAN, 1.0)], false).unwrap_err();
        assert!(matches!(err, SpectralError::MalformedRecord { .. }));
    }

    #[test]
    fn intensity_lookup_policies() {
        let sp = sample();
        assert_eq!(sp.intensity_at(200.0, NearestPolicy::ExactOrLower).unwrap(), 3.0);
        assert_eq!(sp.intensity_at(150.0, NearestPolicy::ExactOrLower).unwrap(), 3.0);
        assert_eq!(sp.intensity_at(200.0, NearestPolicy::ExactOrHigher).unwrap(), 1.0);
        assert_eq!(sp.intensity_at(300.0, NearestPolicy::ExactOrHigher).unwrap(), 3.0);
        assert_eq!(sp.intensity_at(100.0, NearestPolicy::ExactOrHigher).unwrap(), 1.0);
    }

    #[test]
    fn intensity_lookup_outside_axis_fails() {
        let sp = sample();
        for w in [99.9, 300.1, f64::NAN] {
            assert!(matches!(
                sp.intensity_at(w, NearestPolicy::ExactOrLower),
                Err(SpectralError::OutOfRange { .. })
            ));
        }
    }

    #[test]
    fn corrected_copy_leaves_original_untouched() {
        let sp = sample();
        let copy = sp.with_intensities(vec![0.0, 0.0, 0.0]);
        assert_eq!(sp.intensities(), &[1.0, 3.0, 2.0]);
        assert_eq!(copy.wavenumbers(), sp.wavenumbers());
        assert_eq!((copy.x, copy.y), (sp.x, sp.y));
    }
}
