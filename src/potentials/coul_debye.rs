// SPDX-License-Identifier: AGPL-3.0-only

//! Debye-screened Coulomb pair style.
//!
//! U(r) = C q_i q_j exp(-κr) / r, the Debye-Hückel screened interaction,
//! with C the Coulomb conversion factor (1.0 in reduced units). The force
//! magnitude is C q_i q_j exp(-κr) (κ + 1/r) / r², attractive for opposite
//! charges. Screening length is 1/κ.
//!
//! Per-pair coefficients carry only the cutoff; an unset off-diagonal pair
//! mixes the arithmetic mean of the two diagonal cutoffs.

use serde::{Deserialize, Serialize};

use crate::error::RiptideError;
use crate::potential::{PairForce, PairPotential, PairSample, SingleResult};
use crate::potentials::{tri, tri_len};
use crate::table::{PairRecord, TypePairTable};

/// Explicit per-pair input: the interaction cutoff, `None` meaning the
/// global cutoff.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct DebyeCoeff {
    pub cut: Option<f64>,
}

#[derive(Clone, Copy, Debug)]
struct Derived {
    cutsq: f64,
}

/// Debye-screened Coulomb with per-type-pair cutoffs.
#[derive(Clone, Debug)]
pub struct CoulDebye {
    ntypes: usize,
    /// Inverse screening length κ.
    kappa: f64,
    cut_global: f64,
    qqrd2e: f64,
    coeffs: TypePairTable<DebyeCoeff>,
    derived: Vec<Derived>,
    ready: bool,
}

impl CoulDebye {
    /// New style with global settings; call [`CoulDebye::set_coeff`] per
    /// pair, then [`PairPotential::init`].
    #[must_use]
    pub fn new(ntypes: usize, kappa: f64, cut_global: f64) -> Self {
        Self {
            ntypes,
            kappa,
            cut_global,
            qqrd2e: 1.0,
            coeffs: TypePairTable::new(ntypes),
            derived: Vec::new(),
            ready: false,
        }
    }

    /// Override the Coulomb conversion factor (defaults to 1.0, reduced
    /// units).
    #[must_use]
    pub fn with_qqrd2e(mut self, qqrd2e: f64) -> Self {
        self.qqrd2e = qqrd2e;
        self
    }

    /// Mark a pair set, with an optional cutoff override.
    pub fn set_coeff(&mut self, itype: usize, jtype: usize, cut: Option<f64>) {
        self.coeffs.set(itype, jtype, DebyeCoeff { cut });
        self.ready = false;
    }

    /// Restart-boundary records for the coefficient table.
    #[must_use]
    pub fn records(&self) -> Vec<PairRecord<DebyeCoeff>> {
        self.coeffs.records()
    }

    /// Rebuild the style from restart records and the original global
    /// settings. `init` must still be called.
    #[must_use]
    pub fn from_records(
        ntypes: usize,
        kappa: f64,
        cut_global: f64,
        records: &[PairRecord<DebyeCoeff>],
    ) -> Self {
        let mut style = Self::new(ntypes, kappa, cut_global);
        style.coeffs = TypePairTable::from_records(ntypes, records);
        style
    }

    fn pair_cut(&self, itype: usize, jtype: usize) -> Result<f64, RiptideError> {
        if let Some(c) = self.coeffs.get(itype, jtype) {
            return Ok(c.cut.unwrap_or(self.cut_global));
        }
        // Mix unset off-diagonals from the diagonal cutoffs.
        match (self.coeffs.get(itype, itype), self.coeffs.get(jtype, jtype)) {
            (Some(ci), Some(cj)) => {
                let cut_i = ci.cut.unwrap_or(self.cut_global);
                let cut_j = cj.cut.unwrap_or(self.cut_global);
                Ok(0.5 * (cut_i + cut_j))
            }
            _ => Err(RiptideError::MissingPairCoeff { itype, jtype }),
        }
    }
}

impl PairPotential for CoulDebye {
    fn style(&self) -> &'static str {
        "coul/debye"
    }

    fn requires_charge(&self) -> bool {
        true
    }

    fn initialized(&self) -> bool {
        self.ready
    }

    fn init(&mut self) -> Result<(), RiptideError> {
        let mut derived = vec![Derived { cutsq: 0.0 }; tri_len(self.ntypes)];
        for itype in 1..=self.ntypes {
            for jtype in itype..=self.ntypes {
                let cut = self.pair_cut(itype, jtype)?;
                if !cut.is_finite() || cut <= 0.0 {
                    return Err(RiptideError::InvalidCutoff { itype, jtype, cut });
                }
                derived[tri(self.ntypes, itype, jtype)] = Derived { cutsq: cut * cut };
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
        let r2inv = 1.0 / s.rsq;
        let r = s.rsq.sqrt();
        let rinv = 1.0 / r;
        let screening = (-self.kappa * r).exp();
        let forcecoul = self.qqrd2e * s.qi * s.qj * screening * (self.kappa + rinv);
        let fpair = s.factor_coul * forcecoul * r2inv;

        let ecoul = if need_energy {
            s.factor_coul * self.qqrd2e * s.qi * s.qj * rinv * screening
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
        let r2inv = 1.0 / s.rsq;
        let r = s.rsq.sqrt();
        let rinv = 1.0 / r;
        let screening = (-self.kappa * r).exp();
        let forcecoul = self.qqrd2e * s.qi * s.qj * screening * (self.kappa + rinv);
        let phicoul = self.qqrd2e * s.qi * s.qj * rinv * screening;
        SingleResult {
            fforce: s.factor_coul * forcecoul * r2inv,
            energy: s.factor_coul * phicoul,
        }
    }
}
