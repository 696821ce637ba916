#![forbid(unsafe_code)]

use fopt_runtime::RuntimeMode;
use serde::{Deserialize, Serialize};

use crate::error::CanonError;

/// Multiplier on `max(m, n)·ε` for the default relative pivot tolerance.
pub const DEFAULT_RTOL_FACTOR: f64 = 128.0;
/// Default relative tolerance for the hardened-mode invariant check.
pub const DEFAULT_DRIFT_RTOL: f64 = 1e-8;
pub const DEFAULT_EVIDENCE_CAPACITY: usize = 64;

/// Construction options for a [`Canonicalizer`](crate::Canonicalizer).
///
/// The pivot threshold is `atol + rtol * max|A|`. When `rtol` is `None` it
/// defaults to `DEFAULT_RTOL_FACTOR * max(m, n) * f64::EPSILON`. Entries at
/// or below the threshold are treated as zero, both when detecting dependent
/// rows and when validating swap pivots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalizerOptions {
    pub mode: RuntimeMode,
    pub check_finite: bool,
    pub atol: Option<f64>,
    pub rtol: Option<f64>,
    pub drift_rtol: f64,
    pub evidence_capacity: usize,
}

impl Default for CanonicalizerOptions {
    fn default() -> Self {
        Self {
            mode: RuntimeMode::Strict,
            check_finite: true,
            atol: None,
            rtol: None,
            drift_rtol: DEFAULT_DRIFT_RTOL,
            evidence_capacity: DEFAULT_EVIDENCE_CAPACITY,
        }
    }
}

impl CanonicalizerOptions {
    #[must_use]
    pub fn hardened() -> Self {
        Self {
            mode: RuntimeMode::Hardened,
            ..Self::default()
        }
    }

    /// Parse options from JSON; missing fields take their defaults.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub(crate) fn must_check_finite(&self) -> bool {
        self.check_finite || self.mode.forces_finite_checks()
    }

    /// Absolute pivot threshold for an `rows x cols` matrix with largest
    /// entry magnitude `scale`.
    pub(crate) fn pivot_threshold(
        &self,
        rows: usize,
        cols: usize,
        scale: f64,
    ) -> Result<f64, CanonError> {
        let atol = self.atol.unwrap_or(0.0);
        let rtol = self
            .rtol
            .unwrap_or(DEFAULT_RTOL_FACTOR * (rows.max(cols) as f64) * f64::EPSILON);
        if !(atol.is_finite() && rtol.is_finite()) || atol < 0.0 || rtol < 0.0 {
            return Err(CanonError::InvalidTolerance);
        }
        if !(self.drift_rtol.is_finite() && self.drift_rtol >= 0.0) {
            return Err(CanonError::InvalidTolerance);
        }
        Ok(atol + rtol * scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_threshold_scales_with_matrix() {
        let options = CanonicalizerOptions::default();
        let small = options.pivot_threshold(4, 10, 1.0).expect("threshold");
        let large = options.pivot_threshold(4, 10, 1e6).expect("threshold");
        assert!(small > 0.0 && small < 1e-12);
        assert!((large / small - 1e6).abs() < 1e-3);
    }

    #[test]
    fn explicit_tolerances_are_used() {
        let options = CanonicalizerOptions {
            atol: Some(1e-3),
            rtol: Some(0.0),
            ..CanonicalizerOptions::default()
        };
        assert_eq!(options.pivot_threshold(2, 2, 50.0), Ok(1e-3));
    }

    #[test]
    fn negative_tolerances_are_rejected() {
        let options = CanonicalizerOptions {
            rtol: Some(-1.0),
            ..CanonicalizerOptions::default()
        };
        assert_eq!(
            options.pivot_threshold(2, 2, 1.0),
            Err(CanonError::InvalidTolerance)
        );
        let options = CanonicalizerOptions {
            drift_rtol: f64::NAN,
            ..CanonicalizerOptions::default()
        };
        assert_eq!(
            options.pivot_threshold(2, 2, 1.0),
            Err(CanonError::InvalidTolerance)
        );
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let options =
            CanonicalizerOptions::from_json(r#"{"mode":"hardened","atol":1e-9}"#).expect("parse");
        assert_eq!(options.mode, RuntimeMode::Hardened);
        assert_eq!(options.atol, Some(1e-9));
        assert_eq!(options.rtol, None);
        assert!(options.check_finite);
        assert_eq!(options.evidence_capacity, DEFAULT_EVIDENCE_CAPACITY);
        assert!(options.must_check_finite());
    }
}
