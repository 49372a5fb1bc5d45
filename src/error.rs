// SPDX-License-Identifier: AGPL-3.0-only

//! Typed errors for pair-style configuration and compute-call setup.
//!
//! All configuration problems (missing coefficients, missing atom
//! attributes, malformed cutoffs) surface here once, at setup time. The
//! per-neighbor hot loop assumes validated inputs and never constructs
//! errors.

use std::fmt;

/// Errors arising from pair-style setup or compute-call preconditions.
#[derive(Debug, Clone, PartialEq)]
pub enum RiptideError {
    /// Coefficients for a type pair were never set and no mixing rule
    /// applies. Type indices are 1-based.
    MissingPairCoeff { itype: usize, jtype: usize },

    /// The selected pair style needs per-atom charges but the atom system
    /// carries none.
    MissingCharge { style: &'static str },

    /// A cutoff was non-finite or not positive.
    InvalidCutoff { itype: usize, jtype: usize, cut: f64 },

    /// A type index fell outside 1..=ntypes.
    TypeOutOfRange { type_id: usize, ntypes: usize },

    /// `compute` was called before the pair style finished `init`.
    Uninitialized { style: &'static str },

    /// Per-atom array lengths disagree with the declared atom counts.
    ShapeMismatch { what: &'static str, expected: usize, got: usize },
}

impl fmt::Display for RiptideError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPairCoeff { itype, jtype } => {
                write!(
                    f,
                    "Pair coefficients for types ({itype},{jtype}) are not set and cannot be mixed"
                )
            }
            Self::MissingCharge { style } => {
                write!(f, "Pair style {style} requires atom charges")
            }
            Self::InvalidCutoff { itype, jtype, cut } => {
                write!(f, "Invalid cutoff {cut} for type pair ({itype},{jtype})")
            }
            Self::TypeOutOfRange { type_id, ntypes } => {
                write!(f, "Atom type {type_id} outside 1..={ntypes}")
            }
            Self::Uninitialized { style } => {
                write!(f, "Pair style {style} used before init")
            }
            Self::ShapeMismatch { what, expected, got } => {
                write!(f, "Shape mismatch for {what}: expected {expected}, got {got}")
            }
        }
    }
}

impl std::error::Error for RiptideError {}
