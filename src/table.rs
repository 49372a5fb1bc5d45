// SPDX-License-Identifier: AGPL-3.0-only

//! Symmetric per-type-pair coefficient tables.
//!
//! Type ids are 1-based; a table over `ntypes` types stores one slot per
//! unordered pair (i, j) with i ≤ j, so setting (i, j) and reading (j, i)
//! see the same coefficients. Each slot carries a was-explicitly-set flag,
//! which the restart boundary preserves: a restarted run reconstructs the
//! table from the flat record sequence without re-running mixing rules.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::RiptideError;

/// Symmetric table over type pairs 1..=ntypes, with set-flags.
#[derive(Clone, Debug)]
pub struct TypePairTable<T> {
    ntypes: usize,
    slots: Vec<Option<T>>,
    explicit: Vec<bool>,
}

/// One restart-boundary record: an unordered type pair, whether it was
/// explicitly set, and its coefficients if so.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PairRecord<T> {
    pub itype: usize,
    pub jtype: usize,
    pub set: bool,
    pub coeff: Option<T>,
}

impl<T: Clone> TypePairTable<T> {
    /// Empty table for `ntypes` atom types.
    #[must_use]
    pub fn new(ntypes: usize) -> Self {
        let n = ntypes * (ntypes + 1) / 2;
        Self {
            ntypes,
            slots: vec![None; n],
            explicit: vec![false; n],
        }
    }

    /// Number of atom types covered.
    #[must_use]
    pub fn ntypes(&self) -> usize {
        self.ntypes
    }

    // Triangular index for the unordered pair. Callers guarantee 1-based
    // indices in range; out-of-range panics are programmer errors.
    fn slot(&self, itype: usize, jtype: usize) -> usize {
        debug_assert!(itype >= 1 && itype <= self.ntypes, "itype out of range");
        debug_assert!(jtype >= 1 && jtype <= self.ntypes, "jtype out of range");
        let (lo, hi) = if itype <= jtype { (itype, jtype) } else { (jtype, itype) };
        let row = lo - 1;
        row * self.ntypes - row * (row + 1) / 2 + (hi - 1)
    }

    /// Set coefficients for a pair, marking it explicitly set.
    pub fn set(&mut self, itype: usize, jtype: usize, coeff: T) {
        let s = self.slot(itype, jtype);
        self.slots[s] = Some(coeff);
        self.explicit[s] = true;
    }

    /// Fill a pair produced by a mixing rule; the set-flag stays false so
    /// restart records re-derive it rather than persisting it.
    pub fn fill_mixed(&mut self, itype: usize, jtype: usize, coeff: T) {
        let s = self.slot(itype, jtype);
        self.slots[s] = Some(coeff);
    }

    /// Coefficients for a pair, if present (explicit or mixed).
    #[must_use]
    pub fn get(&self, itype: usize, jtype: usize) -> Option<&T> {
        self.slots[self.slot(itype, jtype)].as_ref()
    }

    /// Whether the pair was explicitly set (not mixed).
    #[must_use]
    pub fn is_explicit(&self, itype: usize, jtype: usize) -> bool {
        self.explicit[self.slot(itype, jtype)]
    }

    /// Coefficients for a pair, or the configuration error the caller
    /// reports at init time.
    ///
    /// # Errors
    ///
    /// [`RiptideError::MissingPairCoeff`] when the pair is empty.
    pub fn require(&self, itype: usize, jtype: usize) -> Result<&T, RiptideError> {
        self.get(itype, jtype)
            .ok_or(RiptideError::MissingPairCoeff { itype, jtype })
    }

    /// Iterate unordered pairs (i ≤ j) with their contents.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize, Option<&T>)> {
        let n = self.ntypes;
        (1..=n).flat_map(move |i| (i..=n).map(move |j| (i, j, self.get(i, j))))
    }
}

impl<T: Clone + Serialize + DeserializeOwned> TypePairTable<T> {
    /// Flat record sequence for the restart boundary. Only explicitly set
    /// pairs carry coefficients; mixed pairs are re-derived on restart.
    #[must_use]
    pub fn records(&self) -> Vec<PairRecord<T>> {
        let n = self.ntypes;
        let mut out = Vec::with_capacity(n * (n + 1) / 2);
        for i in 1..=n {
            for j in i..=n {
                let set = self.is_explicit(i, j);
                out.push(PairRecord {
                    itype: i,
                    jtype: j,
                    set,
                    coeff: if set { self.get(i, j).cloned() } else { None },
                });
            }
        }
        out
    }

    /// Rebuild a table from restart records.
    #[must_use]
    pub fn from_records(ntypes: usize, records: &[PairRecord<T>]) -> Self {
        let mut table = Self::new(ntypes);
        for rec in records {
            if rec.set {
                if let Some(coeff) = &rec.coeff {
                    table.set(rec.itype, rec.jtype, coeff.clone());
                }
            }
        }
        table
    }
}
