#![forbid(unsafe_code)]

//! Runtime mode definitions for Strict and Hardened operation.

use serde::{Deserialize, Serialize};

/// Operational mode governing the cost/safety trade-off of canonical-form updates.
///
/// - **Strict**: trust the arithmetic; finite checks follow the caller's
///   `check_finite` flag and updates are not re-verified against `A`.
/// - **Hardened**: always reject non-finite input and re-verify
///   `R·A[:,Q] ≈ C` after every update, rolling the update back on drift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeMode {
    #[default]
    Strict,
    Hardened,
}

impl RuntimeMode {
    /// Whether finite checks are mandatory regardless of caller preference.
    #[must_use]
    pub const fn forces_finite_checks(self) -> bool {
        matches!(self, Self::Hardened)
    }

    /// Whether updates must be verified against the reference matrix.
    #[must_use]
    pub const fn verifies_updates(self) -> bool {
        matches!(self, Self::Hardened)
    }
}
