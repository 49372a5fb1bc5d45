// SPDX-License-Identifier: AGPL-3.0-only

//! The contract every pair style implements.
//!
//! A pair style is stateless with respect to atom mutation: it reads its
//! own coefficient tables plus the scalars handed to it per pair, and
//! returns force and energy terms. The worker loop owns the surrounding
//! protocol — cutoff gating, exclusion decoding, Newton handling, and
//! energy/virial tallying — and is written once against this trait.
//!
//! `evaluate` is gated: it is called only when `rsq` is strictly below
//! `cutoff_squared` for the pair, so styles are free to be singular or
//! undefined outside that domain.

use crate::error::RiptideError;

/// Inputs for one pair evaluation. Exclusion factors arrive pre-decoded
/// from the neighbor list; charges are zero for charge-less systems (only
/// styles with `requires_charge() == false` ever see those).
#[derive(Clone, Copy, Debug)]
pub struct PairSample {
    /// Squared separation |r_i - r_j|².
    pub rsq: f64,
    /// 1-based type of atom i.
    pub itype: usize,
    /// 1-based type of atom j.
    pub jtype: usize,
    /// Charge of atom i.
    pub qi: f64,
    /// Charge of atom j.
    pub qj: f64,
    /// Van-der-Waals exclusion multiplier in [0, 1].
    pub factor_lj: f64,
    /// Coulomb exclusion multiplier in [0, 1].
    pub factor_coul: f64,
}

/// Output of one pair evaluation. `fpair` is force-over-r: the force on
/// atom i is `fpair * (r_i - r_j)`, and atom j receives the negation.
/// Energies are zero unless evaluation was asked for them.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PairForce {
    pub fpair: f64,
    pub evdwl: f64,
    pub ecoul: f64,
}

/// Result of the diagnostics-path `single` evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SingleResult {
    /// Force-over-r, identical in meaning to [`PairForce::fpair`].
    pub fforce: f64,
    /// Total pair energy (both channels, exclusion-scaled, shift applied).
    pub energy: f64,
}

/// A pairwise interatomic potential.
pub trait PairPotential: Sync {
    /// Style name used in error messages.
    fn style(&self) -> &'static str;

    /// Whether this style reads per-atom charges.
    fn requires_charge(&self) -> bool {
        false
    }

    /// Whether `init` has completed successfully.
    fn initialized(&self) -> bool;

    /// Validate coefficients, apply mixing for unset pairs where a rule
    /// exists, mirror tables, and precompute derived constants (including
    /// energy-shift offsets). Must succeed before any compute call.
    ///
    /// # Errors
    ///
    /// [`RiptideError::MissingPairCoeff`] for an unset pair with no mixing
    /// rule, [`RiptideError::InvalidCutoff`] for a malformed cutoff.
    fn init(&mut self) -> Result<(), RiptideError>;

    /// Squared interaction cutoff for a type pair. Finite and non-negative
    /// after `init`.
    fn cutoff_squared(&self, itype: usize, jtype: usize) -> f64;

    /// Force and (optionally) energy for one in-range pair.
    fn evaluate(&self, s: &PairSample, need_energy: bool) -> PairForce;

    /// On-demand recomputation of one pair outside the bulk loop. Must be
    /// numerically identical to the force and summed energy `evaluate`
    /// produces for the same sample.
    fn single(&self, s: &PairSample) -> SingleResult;
}
