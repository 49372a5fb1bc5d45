// SPDX-License-Identifier: AGPL-3.0-only

//! Concrete pair styles.
//!
//! Each style owns its coefficient tables, validates and mirrors them in
//! `init`, and precomputes the derived constants the hot loop reads
//! (squared cutoffs, force prefactors, energy-shift offsets). All three
//! plug into the same worker loop through [`crate::potential::PairPotential`].

pub mod coul_debye;
pub mod coul_diel;
pub mod lj_cut_coul_cut;

pub use coul_debye::CoulDebye;
pub use coul_diel::CoulDiel;
pub use lj_cut_coul_cut::LjCutCoulCut;

/// Triangular index for the unordered type pair (1-based, i and j in
/// either order) into a dense derived-constant vector.
#[inline]
pub(crate) fn tri(ntypes: usize, itype: usize, jtype: usize) -> usize {
    let (lo, hi) = if itype <= jtype {
        (itype, jtype)
    } else {
        (jtype, itype)
    };
    let row = lo - 1;
    row * ntypes - row * (row + 1) / 2 + (hi - 1)
}

/// Dense derived-vector length for `ntypes` types.
pub(crate) fn tri_len(ntypes: usize) -> usize {
    ntypes * (ntypes + 1) / 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tri_is_symmetric_and_dense() {
        let n = 5;
        let mut seen = vec![false; tri_len(n)];
        for i in 1..=n {
            for j in i..=n {
                let s = tri(n, i, j);
                assert_eq!(s, tri(n, j, i), "({i},{j}) mirrors");
                assert!(!seen[s], "slot {s} reused");
                seen[s] = true;
            }
        }
        assert!(seen.iter().all(|&b| b), "every slot covered");
    }
}
