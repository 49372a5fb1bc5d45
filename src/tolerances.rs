// SPDX-License-Identifier: AGPL-3.0-only

//! Centralized validation tolerances with numerical justification.
//!
//! Every threshold used by the test suite is defined here with its origin.
//! No ad-hoc magic numbers in assertions.

/// Newton's third law residual for a single mutual interaction.
///
/// Both endpoint contributions are computed from the same `fpair` and
/// separation vector, so the pairwise sum cancels exactly in f64. 1e-14
/// absolute leaves headroom for a compiler reassociating the negation.
pub const NEWTON_PAIR_ABS: f64 = 1e-14;

/// Relative tolerance for worker-count invariance of forces and tallies.
///
/// Splitting the same workload across 1/2/4/16 workers changes only the
/// floating-point summation order. For O(10³) pair terms the reordering
/// error is bounded well below 1e-12 relative at f64 precision.
pub const REDUCTION_INVARIANCE_REL: f64 = 1e-12;

/// Absolute floor used when a reduction-invariance reference value is near
/// zero and relative error is meaningless.
pub const REDUCTION_INVARIANCE_ABS: f64 = 1e-12;

/// Energy continuity at the cutoff for shifted potentials.
///
/// Evaluating at r = rc·(1 − 1e-8) leaves a residual of order
/// |dU/dr(rc)|·rc·1e-8. For the O(1) reduced-unit systems in the tests,
/// 1e-6 bounds that residual comfortably.
pub const CUTOFF_CONTINUITY_ABS: f64 = 1e-6;

/// Agreement between `evaluate` and `single` on one pair.
///
/// Both paths execute the same arithmetic on the same inputs; any
/// difference is a logic defect, not rounding. Exact-comparison tolerance.
pub const SINGLE_EVAL_ABS: f64 = 0.0;

/// Linear vs fan-in reduction agreement.
///
/// The two strategies sum the same worker tallies in different orders;
/// the result may differ only at rounding level.
pub const STRATEGY_AGREEMENT_REL: f64 = 1e-12;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerances_are_ordered() {
        assert!(NEWTON_PAIR_ABS < REDUCTION_INVARIANCE_REL);
        assert!(REDUCTION_INVARIANCE_REL < CUTOFF_CONTINUITY_ABS);
    }

    #[test]
    fn single_eval_is_exact() {
        assert_eq!(SINGLE_EVAL_ABS, 0.0, "single must reproduce evaluate exactly");
    }
}
