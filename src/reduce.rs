// SPDX-License-Identifier: AGPL-3.0-only

//! Merging per-worker buffers into global results.
//!
//! Two strategies sit behind one contract:
//!
//! - `Linear`: each output slice accumulates every worker's contribution
//!   in worker order. The natural choice for a handful of CPU threads.
//! - `FanIn`: rounds of pairwise halving fold the upper half of the live
//!   buffers into the lower half until one remains. This mirrors how a
//!   lock-step execution group accumulates through fast shared memory and
//!   is exact for power-of-two worker counts (uneven counts fold the
//!   remainder in the last round).
//!
//! Both produce the same mathematical sum; they may differ only at
//! floating-point rounding level. The force merge is parallel over
//! disjoint slices of the atom index space — never over the worker
//! dimension — so each global location is written by exactly one reducing
//! worker.

use rayon::prelude::*;

use crate::buffer::WorkerBuffer;

/// Atoms per parallel reduction slice. Large enough to amortize task
/// overhead, small enough to spread uneven tails.
const REDUCE_SLICE_ATOMS: usize = 256;

/// How per-worker buffers are merged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReduceStrategy {
    /// Straight accumulation across workers.
    #[default]
    Linear,
    /// Pairwise halving, shared-memory style.
    FanIn,
}

/// Merge worker force buffers into the global force array (additive).
///
/// `FanIn` folds buffers pairwise first, leaving the total in buffer 0,
/// then adds that into `global`; `Linear` adds every buffer directly.
/// Either way the per-slice parallelism keeps write targets disjoint.
pub fn reduce_forces(strategy: ReduceStrategy, workers: &mut [WorkerBuffer], global: &mut [f64]) {
    if workers.is_empty() {
        return;
    }
    match strategy {
        ReduceStrategy::Linear => {
            global
                .par_chunks_mut(REDUCE_SLICE_ATOMS * 3)
                .enumerate()
                .for_each(|(slice_idx, out)| {
                    let base = slice_idx * REDUCE_SLICE_ATOMS * 3;
                    for w in workers.iter() {
                        let src = &w.force[base..base + out.len()];
                        for (o, s) in out.iter_mut().zip(src.iter()) {
                            *o += s;
                        }
                    }
                });
        }
        ReduceStrategy::FanIn => {
            fan_in(workers);
            let total = &workers[0];
            global
                .par_chunks_mut(REDUCE_SLICE_ATOMS * 3)
                .enumerate()
                .for_each(|(slice_idx, out)| {
                    let base = slice_idx * REDUCE_SLICE_ATOMS * 3;
                    let src = &total.force[base..base + out.len()];
                    for (o, s) in out.iter_mut().zip(src.iter()) {
                        *o += s;
                    }
                });
        }
    }
}

/// Sum worker energy/virial tallies. Returns `(eng_vdwl, eng_coul, virial)`.
///
/// For `FanIn` the fold order matches the force fan-in; for `Linear` it is
/// worker order. Scalar cost is negligible either way; the two orders
/// agree to rounding.
#[must_use]
pub fn reduce_tallies(strategy: ReduceStrategy, workers: &[WorkerBuffer]) -> (f64, f64, [f64; 6]) {
    match strategy {
        ReduceStrategy::Linear => {
            let mut eng_vdwl = 0.0;
            let mut eng_coul = 0.0;
            let mut virial = [0.0; 6];
            for w in workers {
                eng_vdwl += w.eng_vdwl;
                eng_coul += w.eng_coul;
                for (v, t) in virial.iter_mut().zip(w.virial.iter()) {
                    *v += t;
                }
            }
            (eng_vdwl, eng_coul, virial)
        }
        ReduceStrategy::FanIn => {
            let mut vdwl: Vec<f64> = workers.iter().map(|w| w.eng_vdwl).collect();
            let mut coul: Vec<f64> = workers.iter().map(|w| w.eng_coul).collect();
            let mut vir: Vec<[f64; 6]> = workers.iter().map(|w| w.virial).collect();
            let mut active = workers.len();
            while active > 1 {
                let half = active.div_ceil(2);
                for k in 0..active - half {
                    vdwl[k] += vdwl[half + k];
                    coul[k] += coul[half + k];
                    for d in 0..6 {
                        vir[k][d] += vir[half + k][d];
                    }
                }
                active = half;
            }
            (
                vdwl.first().copied().unwrap_or(0.0),
                coul.first().copied().unwrap_or(0.0),
                vir.first().copied().unwrap_or([0.0; 6]),
            )
        }
    }
}

// Pairwise-halving fold of force buffers: each round folds the upper half
// into the lower half in parallel, mirroring a shared-memory tree sum.
fn fan_in(workers: &mut [WorkerBuffer]) {
    let mut active = workers.len();
    while active > 1 {
        let half = active.div_ceil(2);
        let (lo, hi) = workers.split_at_mut(half);
        lo[..active - half]
            .par_iter_mut()
            .zip(hi[..active - half].par_iter())
            .for_each(|(dst, src)| {
                for (a, b) in dst.force.iter_mut().zip(src.force.iter()) {
                    *a += b;
                }
            });
        active = half;
    }
}
