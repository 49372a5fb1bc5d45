// SPDX-License-Identifier: AGPL-3.0-only

//! Half neighbor list with packed bonded-exclusion encoding.
//!
//! List construction (binning, ghost exchange) happens upstream; this
//! module only defines the consumed layout. Each listed atom `i` owns a
//! slice of raw partner values. The top two bits of a raw value name one
//! of four special-exclusion classes (0 = plain pair, 1..3 = 1-2/1-3/1-4
//! bonded topology); the low 30 bits are the partner index.
//!
//! The packed form exists only at the storage boundary. [`SpecialScales::decode`]
//! turns a raw value into an explicit `{index, factor_lj, factor_coul}`
//! before any physics sees it — raw values are never dereferenced directly.

/// Mask stripping the special-class bits from a raw neighbor value.
pub const NEIGHMASK: u32 = 0x3FFF_FFFF;

/// Shift placing a special class into the top bits of a raw value.
pub const SPECIAL_SHIFT: u32 = 30;

/// Per-class exclusion multipliers for the Coulomb and van-der-Waals
/// channels. Class 0 is the plain-pair identity and is pinned to 1.0.
#[derive(Clone, Copy, Debug)]
pub struct SpecialScales {
    pub lj: [f64; 4],
    pub coul: [f64; 4],
}

impl Default for SpecialScales {
    fn default() -> Self {
        Self {
            lj: [1.0; 4],
            coul: [1.0; 4],
        }
    }
}

/// One decoded neighbor-list entry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NeighborEntry {
    /// Partner atom index into the local+ghost space.
    pub j: usize,
    /// Van-der-Waals exclusion multiplier in [0, 1].
    pub factor_lj: f64,
    /// Coulomb exclusion multiplier in [0, 1].
    pub factor_coul: f64,
}

impl SpecialScales {
    /// Bonded-topology scales: classes 1..3 take the given factors for
    /// both channels, class 0 stays 1.0.
    #[must_use]
    pub fn bonded(one_two: f64, one_three: f64, one_four: f64) -> Self {
        Self {
            lj: [1.0, one_two, one_three, one_four],
            coul: [1.0, one_two, one_three, one_four],
        }
    }

    /// Decode a raw packed value into an explicit entry.
    #[inline]
    #[must_use]
    pub fn decode(&self, raw: u32) -> NeighborEntry {
        let class = (raw >> SPECIAL_SHIFT) as usize;
        NeighborEntry {
            j: (raw & NEIGHMASK) as usize,
            factor_lj: self.lj[class],
            factor_coul: self.coul[class],
        }
    }
}

/// Pack a partner index and special class into the raw storage form.
#[must_use]
pub fn encode(j: usize, class: u32) -> u32 {
    debug_assert!(class < 4, "special class must be 0..4");
    debug_assert!(j <= NEIGHMASK as usize);
    (j as u32 & NEIGHMASK) | (class << SPECIAL_SHIFT)
}

/// Half neighbor list in CSR layout: `ilist[ii]` is the atom owning the
/// slice `neighbors[first[ii]..first[ii + 1]]` of raw packed partners.
#[derive(Clone, Debug, Default)]
pub struct NeighborList {
    ilist: Vec<usize>,
    first: Vec<usize>,
    neighbors: Vec<u32>,
    /// Exclusion multipliers applied during decode.
    pub special: SpecialScales,
}

impl NeighborList {
    /// Empty list with the given exclusion scales.
    #[must_use]
    pub fn new(special: SpecialScales) -> Self {
        Self {
            ilist: Vec::new(),
            first: vec![0],
            neighbors: Vec::new(),
            special,
        }
    }

    /// Append atom `i` with its raw packed partner values.
    pub fn push(&mut self, i: usize, raw_neighbors: &[u32]) {
        self.ilist.push(i);
        self.neighbors.extend_from_slice(raw_neighbors);
        self.first.push(self.neighbors.len());
    }

    /// Append atom `i` with plain (class-0) partners.
    pub fn push_plain(&mut self, i: usize, partners: &[usize]) {
        let raw: Vec<u32> = partners.iter().map(|&j| encode(j, 0)).collect();
        self.push(i, &raw);
    }

    /// Number of listed atoms.
    #[must_use]
    pub fn inum(&self) -> usize {
        self.ilist.len()
    }

    /// Atom index owning list slot `ii`.
    #[must_use]
    pub fn atom(&self, ii: usize) -> usize {
        self.ilist[ii]
    }

    /// Raw packed partner slice for list slot `ii`.
    #[must_use]
    pub fn raw_neighbors(&self, ii: usize) -> &[u32] {
        &self.neighbors[self.first[ii]..self.first[ii + 1]]
    }

    /// Total stored pair entries.
    #[must_use]
    pub fn total_pairs(&self) -> usize {
        self.neighbors.len()
    }

    /// Fully connected half list over `n` atoms: pair (i, j) with i < j is
    /// stored once, under i. Test and benchmark scaffolding.
    #[must_use]
    pub fn fully_connected(n: usize) -> Self {
        let mut list = Self::new(SpecialScales::default());
        for i in 0..n {
            let partners: Vec<usize> = (i + 1..n).collect();
            list.push_plain(i, &partners);
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trip() {
        let scales = SpecialScales::bonded(0.0, 0.5, 0.75);
        for class in 0..4u32 {
            let raw = encode(12345, class);
            let entry = scales.decode(raw);
            assert_eq!(entry.j, 12345, "index survives class {class}");
        }
    }

    #[test]
    fn class_zero_is_identity() {
        let scales = SpecialScales::bonded(0.0, 0.5, 0.75);
        let entry = scales.decode(encode(7, 0));
        assert_eq!(entry.factor_lj, 1.0);
        assert_eq!(entry.factor_coul, 1.0);
    }

    #[test]
    fn bonded_classes_map_to_factors() {
        let scales = SpecialScales::bonded(0.0, 0.5, 0.75);
        assert_eq!(scales.decode(encode(0, 1)).factor_coul, 0.0);
        assert_eq!(scales.decode(encode(0, 2)).factor_lj, 0.5);
        assert_eq!(scales.decode(encode(0, 3)).factor_lj, 0.75);
    }

    #[test]
    fn decode_strips_high_bits() {
        let scales = SpecialScales::default();
        let raw = encode(NEIGHMASK as usize, 3);
        assert_eq!(scales.decode(raw).j, NEIGHMASK as usize);
    }

    #[test]
    fn csr_layout_preserves_slices() {
        let mut list = NeighborList::new(SpecialScales::default());
        list.push_plain(0, &[1, 2, 3]);
        list.push_plain(1, &[2]);
        list.push_plain(2, &[]);
        assert_eq!(list.inum(), 3);
        assert_eq!(list.raw_neighbors(0).len(), 3);
        assert_eq!(list.raw_neighbors(1).len(), 1);
        assert_eq!(list.raw_neighbors(2).len(), 0, "empty slice is a no-op");
        assert_eq!(list.atom(1), 1);
        assert_eq!(list.total_pairs(), 4);
    }

    #[test]
    fn fully_connected_counts() {
        let list = NeighborList::fully_connected(5);
        assert_eq!(list.inum(), 5);
        // C(5,2) = 10 half-list pairs
        assert_eq!(list.total_pairs(), 10);
        assert_eq!(list.raw_neighbors(4).len(), 0, "last atom owns no pairs");
    }

    #[test]
    fn default_scales_are_unity() {
        let scales = SpecialScales::default();
        for class in 0..4u32 {
            let e = scales.decode(encode(1, class));
            assert_eq!(e.factor_lj, 1.0);
            assert_eq!(e.factor_coul, 1.0);
        }
    }
}
