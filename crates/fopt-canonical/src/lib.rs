#![forbid(unsafe_code)]

//! Canonical-form maintenance for simplex-family solvers.
//!
//! For an `m×n` coefficient matrix `A` this crate computes and incrementally
//! maintains `R·A[:,Q] = C`, where `R` (m×m) accumulates row operations, `Q`
//! permutes the variables and `C = [I S; 0 0]` exposes an identity block over
//! the `r = rank(A)` basic variables.
//!
//! | Operation                                             | Free function             |
//! |-------------------------------------------------------|---------------------------|
//! | [`Canonicalizer::new`]                                | [`factorize`]             |
//! | [`Canonicalizer::update_with_swap_basic_variable`]    | [`swap_basic_variable`]   |
//! | [`Canonicalizer::update_with_new_ordering`]           | [`reorder`]               |
//! | [`Canonicalizer::update_with_priority_weights`]       | [`prioritize`]            |
//! | [`Canonicalizer::rationalize`]                        | [`rationalize`]           |
//!
//! The free functions take a [`CanonicalState`] by value and hand it back
//! untouched inside [`UpdateRejected`] on failure. [`Canonicalizer`] wraps
//! them with options, hardened-mode verification and an evidence ledger.
//!
//! ```
//! use fopt_canonical::{BasicPosition, Canonicalizer, CanonicalizerOptions, NonBasicPosition};
//!
//! let a = vec![vec![4.0, 1.0, 2.0], vec![1.0, 3.0, 0.0]];
//! let mut canon = Canonicalizer::new(&a, CanonicalizerOptions::default()).unwrap();
//! assert_eq!(canon.num_basic_variables(), 2);
//! canon
//!     .update_with_swap_basic_variable(BasicPosition(0), NonBasicPosition(0))
//!     .unwrap();
//! assert_eq!(canon.num_non_basic_variables(), 1);
//! ```

mod canonicalizer;
mod elimination;
pub mod error;
pub mod evidence;
mod factorize;
pub mod index;
pub mod options;
mod partition;
mod rational;
mod reorder;
pub mod state;
mod swap;
mod weights;

pub use canonicalizer::Canonicalizer;
pub use error::{CanonError, UpdateRejected};
pub use evidence::{CanonEvidenceEntry, CanonOperation, UpdateOutcome};
pub use factorize::factorize;
pub use index::{BasicPosition, NonBasicPosition, VariableIndex, variables};
pub use options::CanonicalizerOptions;
pub use rational::{nearest_rational, rationalize};
pub use reorder::reorder;
pub use state::{CanonicalState, rows_from_dmatrix};
pub use swap::swap_basic_variable;
pub use weights::prioritize;
