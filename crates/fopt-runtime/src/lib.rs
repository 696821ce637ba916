#![forbid(unsafe_code)]

//! FrankenOpt runtime: operating modes, condition classification and the
//! evidence ledger shared by the solver crates.
//!
//! ## Module layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | `mode`      | [`RuntimeMode`] enum (Strict / Hardened)                    |
//! | `condition` | [`MatrixConditionState`], [`classify_condition`]            |
//! | `evidence`  | [`EvidenceLedger`] bounded FIFO with JSONL export           |

pub mod condition;
pub mod evidence;
pub mod mode;

// ── Re-exports: preserve the flat public API ────────────────────────
pub use condition::{MatrixConditionState, classify_condition, pivot_ratio};
pub use evidence::EvidenceLedger;
pub use mode::RuntimeMode;

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Timestamp utility for evidence entries.
#[must_use]
pub fn now_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}

// ═══════════════════════════════════════════════════════════════════
// Test helpers: shared assertion and logging utilities
// ═══════════════════════════════════════════════════════════════════

/// Structured test log entry for forensic comparison across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestLogEntry {
    pub test_id: String,
    pub timestamp_ms: u64,
    pub level: TestLogLevel,
    pub module: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<RuntimeMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<TestResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestLogLevel {
    Info,
    Warn,
    Error,
    Debug,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestResult {
    Pass,
    Fail,
    Skip,
}

impl TestLogEntry {
    #[must_use]
    pub fn new(
        test_id: impl Into<String>,
        module: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            test_id: test_id.into(),
            timestamp_ms: now_unix_ms(),
            level: TestLogLevel::Info,
            module: module.into(),
            message: message.into(),
            seed: None,
            mode: None,
            result: None,
        }
    }

    #[must_use]
    pub fn with_result(mut self, result: TestResult) -> Self {
        self.result = Some(result);
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: RuntimeMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Serialize to JSON line for structured logging.
    #[must_use]
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }
}

/// `|actual - expected| <= atol + rtol·|expected|`.
#[must_use]
pub fn within_tolerance(actual: f64, expected: f64, atol: f64, rtol: f64) -> bool {
    (actual - expected).abs() <= atol + rtol * expected.abs()
}

/// Panics unless [`within_tolerance`] holds.
pub fn assert_close(actual: f64, expected: f64, atol: f64, rtol: f64) {
    assert!(
        within_tolerance(actual, expected, atol, rtol),
        "{actual} is not within atol={atol}, rtol={rtol} of {expected}"
    );
}

/// Element-wise [`assert_close`] over row-major matrices of equal shape.
pub fn assert_close_matrix(actual: &[Vec<f64>], expected: &[Vec<f64>], atol: f64, rtol: f64) {
    assert_eq!(actual.len(), expected.len(), "row count differs");
    for (i, (got, want)) in actual.iter().zip(expected).enumerate() {
        assert_eq!(got.len(), want.len(), "column count differs in row {i}");
        for (j, (&g, &w)) in got.iter().zip(want).enumerate() {
            assert!(
                within_tolerance(g, w, atol, rtol),
                "entry ({i},{j}): {g} is not within atol={atol}, rtol={rtol} of {w}"
            );
        }
    }
}
