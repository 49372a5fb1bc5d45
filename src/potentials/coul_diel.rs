// SPDX-License-Identifier: AGPL-3.0-only

//! Coulomb pair style with a distance-dependent dielectric continuum.
//!
//! The relative permittivity ramps between the near-field value 5.2 and
//! the solvent value ε_s through a tanh sigmoid centered at `rme` with
//! width `sigmae`:
//!
//! ```text
//! ε(r)  = a + b·tanh((r - rme)/sigmae),  a = (5.2 + ε_s)/2, b = (ε_s - 5.2)/2
//! U(r)  = C q_i q_j (ε_s/ε(r) - 1) / r
//! ```
//!
//! Reference: Jusufi, Hynninen, Panagiotopoulos, J. Phys. Chem. B 112,
//! 13783 (2008) (implicit-solvent screened interactions near interfaces).
//!
//! With the energy shift enabled, the offset is stored per unit charge
//! product, so U is continuous at the cutoff for every charge pair, not
//! just the one sampled at setup.
//!
//! Every type pair must be set explicitly; no mixing rule applies.

use serde::{Deserialize, Serialize};

use crate::error::RiptideError;
use crate::potential::{PairForce, PairPotential, PairSample, SingleResult};
use crate::potentials::{tri, tri_len};
use crate::table::{PairRecord, TypePairTable};

/// Near-field permittivity the tanh ramp starts from.
const EPS_NEAR: f64 = 5.2;

/// Explicit per-pair input coefficients.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct DielCoeff {
    /// Sigmoid midpoint (contact distance).
    pub rme: f64,
    /// Sigmoid width.
    pub sigmae: f64,
    /// Cutoff override; `None` means the global cutoff.
    pub cut: Option<f64>,
}

#[derive(Clone, Copy, Debug)]
struct Derived {
    cutsq: f64,
    rme: f64,
    sigmae: f64,
    /// Energy shift per unit charge product (divided out of C q_i q_j).
    offset_unit: f64,
}

/// Distance-dependent dielectric Coulomb.
#[derive(Clone, Debug)]
pub struct CoulDiel {
    ntypes: usize,
    /// Solvent permittivity ε_s.
    eps_s: f64,
    a_eps: f64,
    b_eps: f64,
    cut_global: f64,
    qqrd2e: f64,
    shift: bool,
    coeffs: TypePairTable<DielCoeff>,
    derived: Vec<Derived>,
    ready: bool,
}

impl CoulDiel {
    /// New style with solvent permittivity and global cutoff.
    #[must_use]
    pub fn new(ntypes: usize, eps_s: f64, cut_global: f64) -> Self {
        Self {
            ntypes,
            eps_s,
            a_eps: 0.5 * (EPS_NEAR + eps_s),
            b_eps: 0.5 * (eps_s - EPS_NEAR),
            cut_global,
            qqrd2e: 1.0,
            shift: false,
            coeffs: TypePairTable::new(ntypes),
            derived: Vec::new(),
            ready: false,
        }
    }

    /// Override the Coulomb conversion factor (defaults to 1.0).
    #[must_use]
    pub fn with_qqrd2e(mut self, qqrd2e: f64) -> Self {
        self.qqrd2e = qqrd2e;
        self
    }

    /// Enable the energy shift making U continuous at the cutoff.
    #[must_use]
    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// Set coefficients for one pair.
    pub fn set_coeff(&mut self, itype: usize, jtype: usize, coeff: DielCoeff) {
        self.coeffs.set(itype, jtype, coeff);
        self.ready = false;
    }

    /// Restart-boundary records for the coefficient table.
    #[must_use]
    pub fn records(&self) -> Vec<PairRecord<DielCoeff>> {
        self.coeffs.records()
    }

    /// Rebuild from restart records; `init` must still be called.
    #[must_use]
    pub fn from_records(
        ntypes: usize,
        eps_s: f64,
        cut_global: f64,
        records: &[PairRecord<DielCoeff>],
    ) -> Self {
        let mut style = Self::new(ntypes, eps_s, cut_global);
        style.coeffs = TypePairTable::from_records(ntypes, records);
        style
    }

    #[inline]
    fn epsr(&self, r: f64, rme: f64, sigmae: f64) -> (f64, f64) {
        let th = ((r - rme) / sigmae).tanh();
        let epsr = self.a_eps + self.b_eps * th;
        let depsdr = self.b_eps * (1.0 - th * th) / sigmae;
        (epsr, depsdr)
    }
}

impl PairPotential for CoulDiel {
    fn style(&self) -> &'static str {
        "coul/diel"
    }

    fn requires_charge(&self) -> bool {
        true
    }

    fn initialized(&self) -> bool {
        self.ready
    }

    fn init(&mut self) -> Result<(), RiptideError> {
        let mut derived = vec![
            Derived {
                cutsq: 0.0,
                rme: 0.0,
                sigmae: 0.0,
                offset_unit: 0.0
            };
            tri_len(self.ntypes)
        ];
        for itype in 1..=self.ntypes {
            for jtype in itype..=self.ntypes {
                // No mixing rule for this style: every pair explicit.
                let c = *self.coeffs.require(itype, jtype)?;
                let cut = c.cut.unwrap_or(self.cut_global);
                if !cut.is_finite() || cut <= 0.0 {
                    return Err(RiptideError::InvalidCutoff { itype, jtype, cut });
                }
                let offset_unit = if self.shift {
                    let (epsr_cut, _) = self.epsr(cut, c.rme, c.sigmae);
                    (self.eps_s / epsr_cut - 1.0) / cut
                } else {
                    0.0
                };
                derived[tri(self.ntypes, itype, jtype)] = Derived {
                    cutsq: cut * cut,
                    rme: c.rme,
                    sigmae: c.sigmae,
                    offset_unit,
                };
            }
        }
        self.derived = derived;
        self.ready = true;
        Ok(())
    }

    fn cutoff_squared(&self, itype: usize, jtype: usize) -> f64 {
        self.derived[tri(self.ntypes, itype, jtype)].cutsq
    }

    fn evaluate(&self, s: &PairSample, need_energy: bool) -> PairForce {
        let c = &self.derived[tri(self.ntypes, s.itype, s.jtype)];
        let r = s.rsq.sqrt();
        let (epsr, depsdr) = self.epsr(r, c.rme, c.sigmae);

        let forcecoul = self.qqrd2e
            * s.qi
            * s.qj
            * (self.eps_s * (epsr + r * depsdr) / (epsr * epsr) - 1.0)
            / s.rsq;
        let fpair = s.factor_coul * forcecoul / r;

        let ecoul = if need_energy {
            s.factor_coul
                * self.qqrd2e
                * s.qi
                * s.qj
                * ((self.eps_s / epsr - 1.0) / r - c.offset_unit)
        } else {
            0.0
        };

        PairForce {
            fpair,
            evdwl: 0.0,
            ecoul,
        }
    }

    fn single(&self, s: &PairSample) -> SingleResult {
        let c = &self.derived[tri(self.ntypes, s.itype, s.jtype)];
        let r = s.rsq.sqrt();
        let (epsr, depsdr) = self.epsr(r, c.rme, c.sigmae);

        let forcedielec = self.qqrd2e
            * s.qi
            * s.qj
            * (self.eps_s * (epsr + r * depsdr) / (epsr * epsr) - 1.0)
            / s.rsq;
        let phidielec =
            self.qqrd2e * s.qi * s.qj * ((self.eps_s / epsr - 1.0) / r - c.offset_unit);

        SingleResult {
            fforce: s.factor_coul * forcedielec / r,
            energy: s.factor_coul * phidielec,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tolerances::{CUTOFF_CONTINUITY_ABS, SINGLE_EVAL_ABS};

    fn ready_style(shift: bool) -> CoulDiel {
        let mut pot = CoulDiel::new(1, 78.5, 4.0);
        if shift {
            pot = pot.with_shift();
        }
        pot.set_coeff(
            1,
            1,
            DielCoeff {
                rme: 1.5,
                sigmae: 0.5,
                cut: None,
            },
        );
        pot.init().unwrap();
        pot
    }

    fn sample(rsq: f64, qi: f64, qj: f64) -> PairSample {
        PairSample {
            rsq,
            itype: 1,
            jtype: 1,
            qi,
            qj,
            factor_lj: 1.0,
            factor_coul: 1.0,
        }
    }

    #[test]
    fn permittivity_ramps_between_limits() {
        let pot = ready_style(false);
        let (eps_close, _) = pot.epsr(0.1, 1.5, 0.5);
        let (eps_far, _) = pot.epsr(20.0, 1.5, 0.5);
        assert!(eps_close < 6.0, "near field approaches 5.2: {eps_close}");
        assert!((eps_far - 78.5).abs() < 0.1, "far field approaches ε_s: {eps_far}");
    }

    #[test]
    fn missing_pair_is_config_error() {
        let mut pot = CoulDiel::new(2, 78.5, 4.0);
        pot.set_coeff(
            1,
            1,
            DielCoeff {
                rme: 1.5,
                sigmae: 0.5,
                cut: None,
            },
        );
        assert!(matches!(
            pot.init(),
            Err(RiptideError::MissingPairCoeff { .. })
        ));
    }

    #[test]
    fn shift_zeroes_energy_at_cutoff() {
        let pot = ready_style(true);
        let r = 4.0 * (1.0 - 1e-8);
        let out = pot.evaluate(&sample(r * r, 1.0, -1.0), true);
        assert!(
            out.ecoul.abs() < CUTOFF_CONTINUITY_ABS,
            "shifted energy vanishes at cutoff: {}",
            out.ecoul
        );
    }

    #[test]
    fn shift_is_exact_for_any_charge_pair() {
        // Offset is per unit charge product, so continuity holds for
        // charges other than the ones present at setup.
        let pot = ready_style(true);
        for (qi, qj) in [(1.0, -1.0), (2.0, 0.5), (-3.0, -0.25)] {
            let r = 4.0 * (1.0 - 1e-9);
            let out = pot.evaluate(&sample(r * r, qi, qj), true);
            assert!(
                out.ecoul.abs() < CUTOFF_CONTINUITY_ABS,
                "continuity for q=({qi},{qj}): {}",
                out.ecoul
            );
        }
    }

    #[test]
    fn unshifted_energy_nonzero_at_cutoff() {
        let pot = ready_style(false);
        let r = 4.0 * (1.0 - 1e-8);
        let out = pot.evaluate(&sample(r * r, 1.0, -1.0), true);
        assert!(out.ecoul.abs() > 1e-6, "no shift, no continuity");
    }

    #[test]
    fn single_matches_evaluate() {
        let pot = ready_style(true);
        let s = sample(2.89, 1.5, -0.5);
        let bulk = pot.evaluate(&s, true);
        let one = pot.single(&s);
        assert!((one.fforce - bulk.fpair).abs() <= SINGLE_EVAL_ABS);
        assert!((one.energy - bulk.ecoul).abs() <= SINGLE_EVAL_ABS);
    }

    #[test]
    fn factor_coul_scales_both_terms() {
        let pot = ready_style(false);
        let full = pot.evaluate(&sample(1.44, 1.0, 1.0), true);
        let mut s = sample(1.44, 1.0, 1.0);
        s.factor_coul = 0.5;
        let half = pot.evaluate(&s, true);
        assert!((half.fpair - 0.5 * full.fpair).abs() < 1e-15);
        assert!((half.ecoul - 0.5 * full.ecoul).abs() < 1e-15);
    }

    #[test]
    fn records_round_trip() {
        let mut pot = CoulDiel::new(1, 78.5, 4.0);
        pot.set_coeff(
            1,
            1,
            DielCoeff {
                rme: 1.5,
                sigmae: 0.5,
                cut: Some(3.0),
            },
        );
        let json = serde_json::to_string(&pot.records()).unwrap();
        let records: Vec<PairRecord<DielCoeff>> = serde_json::from_str(&json).unwrap();
        let mut rebuilt = CoulDiel::from_records(1, 78.5, 4.0, &records);
        rebuilt.init().unwrap();
        assert!((rebuilt.cutoff_squared(1, 1) - 9.0).abs() < 1e-15);
    }
}
