// SPDX-License-Identifier: AGPL-3.0-only

//! Per-atom state shared by every pair style.
//!
//! Positions, charges, and types are read-only for the duration of a
//! compute call. The force array is the single piece of mutable shared
//! state, and workers never touch it directly — contributions arrive only
//! through the final buffer reduction.
//!
//! Indexing convention: atoms `0..nlocal` are owned, `nlocal..nlocal+nghost`
//! are ghost copies of remote atoms replicated for cross-boundary pairs.
//! Type ids are 1-based, matching the per-type-pair coefficient tables.

use crate::error::RiptideError;

/// Atom state for one spatial domain: owned atoms followed by ghosts.
#[derive(Clone, Debug)]
pub struct AtomSystem {
    /// Number of owned atoms.
    pub nlocal: usize,
    /// Number of ghost atoms appended after the owned block.
    pub nghost: usize,
    /// Number of atom types; type ids run 1..=ntypes.
    pub ntypes: usize,
    /// Positions, flat xyz per atom, length `3 * (nlocal + nghost)`.
    pub x: Vec<f64>,
    /// Per-atom charges; `None` for charge-less systems. Coulomb-family
    /// styles reject such systems at setup.
    pub q: Option<Vec<f64>>,
    /// 1-based type id per atom.
    pub type_id: Vec<usize>,
    /// Global force accumulator, flat xyz per atom. Additive per call.
    pub f: Vec<f64>,
}

impl AtomSystem {
    /// Create a system with zeroed forces and no charges.
    #[must_use]
    pub fn new(nlocal: usize, nghost: usize, ntypes: usize, x: Vec<f64>, type_id: Vec<usize>) -> Self {
        let nall = nlocal + nghost;
        Self {
            nlocal,
            nghost,
            ntypes,
            x,
            q: None,
            type_id,
            f: vec![0.0; nall * 3],
        }
    }

    /// Attach per-atom charges.
    #[must_use]
    pub fn with_charges(mut self, q: Vec<f64>) -> Self {
        self.q = Some(q);
        self
    }

    /// Total atom count, owned plus ghost.
    #[must_use]
    pub fn nall(&self) -> usize {
        self.nlocal + self.nghost
    }

    /// Check array shapes and type-id ranges once, before any compute call.
    ///
    /// # Errors
    ///
    /// [`RiptideError::ShapeMismatch`] if any per-atom array disagrees with
    /// the declared counts, [`RiptideError::TypeOutOfRange`] if a type id
    /// falls outside `1..=ntypes`.
    pub fn validate(&self) -> Result<(), RiptideError> {
        let nall = self.nall();
        if self.x.len() != nall * 3 {
            return Err(RiptideError::ShapeMismatch {
                what: "positions",
                expected: nall * 3,
                got: self.x.len(),
            });
        }
        if self.f.len() != nall * 3 {
            return Err(RiptideError::ShapeMismatch {
                what: "forces",
                expected: nall * 3,
                got: self.f.len(),
            });
        }
        if self.type_id.len() != nall {
            return Err(RiptideError::ShapeMismatch {
                what: "type ids",
                expected: nall,
                got: self.type_id.len(),
            });
        }
        if let Some(q) = &self.q {
            if q.len() != nall {
                return Err(RiptideError::ShapeMismatch {
                    what: "charges",
                    expected: nall,
                    got: q.len(),
                });
            }
        }
        for &t in &self.type_id {
            if t == 0 || t > self.ntypes {
                return Err(RiptideError::TypeOutOfRange {
                    type_id: t,
                    ntypes: self.ntypes,
                });
            }
        }
        Ok(())
    }

    /// Zero the global force accumulator.
    pub fn zero_forces(&mut self) {
        self.f.iter_mut().for_each(|v| *v = 0.0);
    }

    /// Force vector of one atom.
    #[must_use]
    pub fn force(&self, i: usize) -> [f64; 3] {
        [self.f[i * 3], self.f[i * 3 + 1], self.f[i * 3 + 2]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_atom_system() -> AtomSystem {
        AtomSystem::new(
            2,
            0,
            1,
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0],
            vec![1, 1],
        )
    }

    #[test]
    fn validate_accepts_consistent_system() {
        let sys = two_atom_system();
        assert!(sys.validate().is_ok());
    }

    #[test]
    fn validate_rejects_short_positions() {
        let mut sys = two_atom_system();
        sys.x.pop();
        assert!(matches!(
            sys.validate(),
            Err(RiptideError::ShapeMismatch { what: "positions", .. })
        ));
    }

    #[test]
    fn validate_rejects_zero_type() {
        let mut sys = two_atom_system();
        sys.type_id[0] = 0;
        assert!(matches!(
            sys.validate(),
            Err(RiptideError::TypeOutOfRange { type_id: 0, .. })
        ));
    }

    #[test]
    fn validate_rejects_type_above_ntypes() {
        let mut sys = two_atom_system();
        sys.type_id[1] = 2;
        assert!(sys.validate().is_err());
    }

    #[test]
    fn validate_rejects_short_charges() {
        let sys = two_atom_system().with_charges(vec![1.0]);
        assert!(matches!(
            sys.validate(),
            Err(RiptideError::ShapeMismatch { what: "charges", .. })
        ));
    }

    #[test]
    fn nall_counts_ghosts() {
        let sys = AtomSystem::new(
            1,
            1,
            1,
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0],
            vec![1, 1],
        );
        assert_eq!(sys.nall(), 2);
        assert!(sys.validate().is_ok());
    }

    #[test]
    fn zero_forces_clears_accumulator() {
        let mut sys = two_atom_system();
        sys.f[3] = 7.5;
        sys.zero_forces();
        assert_eq!(sys.force(1), [0.0, 0.0, 0.0]);
    }
}
