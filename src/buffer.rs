// SPDX-License-Identifier: AGPL-3.0-only

//! Per-worker accumulation buffers.
//!
//! Each worker owns one buffer for the duration of a compute call. Force
//! storage spans the full local+ghost index space so both endpoints of any
//! interaction can be written without synchronization — the write-race-free
//! core of the whole concurrency design. Buffers are allocated once per
//! pool and reused across calls; `reset` re-zeroes them at call start.

/// One worker's private force and energy/virial accumulation state.
#[derive(Clone, Debug, Default)]
pub struct WorkerBuffer {
    /// Private force accumulator, flat xyz over local+ghost atoms.
    pub force: Vec<f64>,
    /// Van-der-Waals energy tally.
    pub eng_vdwl: f64,
    /// Coulomb energy tally.
    pub eng_coul: f64,
    /// Virial tally: xx, yy, zz, xy, xz, yz.
    pub virial: [f64; 6],
}

impl WorkerBuffer {
    /// Size for `nall` atoms and zero every accumulator.
    pub fn reset(&mut self, nall: usize) {
        self.force.clear();
        self.force.resize(nall * 3, 0.0);
        self.eng_vdwl = 0.0;
        self.eng_coul = 0.0;
        self.virial = [0.0; 6];
    }

    /// Fold another worker's accumulators into this one (fan-in step).
    pub fn absorb(&mut self, other: &Self) {
        debug_assert_eq!(self.force.len(), other.force.len());
        for (a, b) in self.force.iter_mut().zip(other.force.iter()) {
            *a += b;
        }
        self.eng_vdwl += other.eng_vdwl;
        self.eng_coul += other.eng_coul;
        for (a, b) in self.virial.iter_mut().zip(other.virial.iter()) {
            *a += b;
        }
    }

    /// Add a force contribution to atom `i`.
    #[inline]
    pub fn add_force(&mut self, i: usize, fx: f64, fy: f64, fz: f64) {
        self.force[i * 3] += fx;
        self.force[i * 3 + 1] += fy;
        self.force[i * 3 + 2] += fz;
    }
}
