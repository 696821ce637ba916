#![forbid(unsafe_code)]

//! Index types for the three coordinate systems of a canonical form.
//!
//! A [`VariableIndex`] names a column of `A`. A [`BasicPosition`] is a slot in
//! `Q[0..r]` and a [`NonBasicPosition`] is a slot in `Q[r..n]`, counted from
//! `r`. Swap requests address positions, never variables.

use serde::{Deserialize, Serialize};

macro_rules! index_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub usize);

        impl $name {
            #[must_use]
            pub const fn get(self) -> usize {
                self.0
            }
        }

        impl From<usize> for $name {
            fn from(value: usize) -> Self {
                Self(value)
            }
        }

        impl From<$name> for usize {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

index_newtype!(
    /// Column of the coefficient matrix `A`.
    VariableIndex
);
index_newtype!(
    /// Position within the basic block `Q[0..r]`.
    BasicPosition
);
index_newtype!(
    /// Position within the non-basic block `Q[r..n]`, zero-based from `r`.
    NonBasicPosition
);

/// Wrap plain column numbers, e.g. a permutation built with `(0..n).rev()`.
#[must_use]
pub fn variables<I: IntoIterator<Item = usize>>(indices: I) -> Vec<VariableIndex> {
    indices.into_iter().map(VariableIndex).collect()
}
