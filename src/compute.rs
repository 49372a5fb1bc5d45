// SPDX-License-Identifier: AGPL-3.0-only

//! Compute-call orchestration: worker pool, variant dispatch, reduction.
//!
//! Three independent flags — need-energy, need-virial, Newton's third law —
//! select one of eight monomorphized evaluation variants once per compute
//! call, so the per-neighbor loop carries no bookkeeping branches it does
//! not need. The const-generic instantiation is the zero-cost equivalent
//! of selecting a specialized kernel at dispatch time.
//!
//! A call forks the pool's workers over contiguous disjoint ranges of the
//! listed atoms, joins them at the reduction barrier, and merges private
//! buffers into the global force array plus one energy/virial total. A
//! call is a bounded, non-blocking unit of work: it either completes or
//! fails its setup checks before any force mutation.

use log::debug;
use rayon::prelude::*;

use crate::atoms::AtomSystem;
use crate::buffer::WorkerBuffer;
use crate::error::RiptideError;
use crate::neighbor::NeighborList;
use crate::potential::{PairForce, PairPotential, PairSample};
use crate::reduce::{reduce_forces, reduce_tallies, ReduceStrategy};

/// Per-call accounting switches. Variant selection happens once per call,
/// never per pair.
#[derive(Clone, Copy, Debug, Default)]
pub struct ComputeFlags {
    /// Tally pair energies.
    pub eflag: bool,
    /// Tally the 6 virial components.
    pub vflag: bool,
    /// Write the j-side force even for ghost atoms. Off, ghost forces are
    /// left for the owning domain's own pass.
    pub newton_pair: bool,
}

impl ComputeFlags {
    /// Energy + virial + Newton, the common full-accounting step.
    #[must_use]
    pub fn full() -> Self {
        Self {
            eflag: true,
            vflag: true,
            newton_pair: true,
        }
    }
}

/// Global scalar results of one compute call. Additive with respect to
/// other force contributions in the same timestep.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EnergyVirial {
    /// Van-der-Waals channel energy.
    pub eng_vdwl: f64,
    /// Coulomb channel energy.
    pub eng_coul: f64,
    /// Virial: xx, yy, zz, xy, xz, yz.
    pub virial: [f64; 6],
}

impl EnergyVirial {
    /// Total pair energy, both channels.
    #[must_use]
    pub fn energy(&self) -> f64 {
        self.eng_vdwl + self.eng_coul
    }
}

/// Fixed-size pool of logical workers with reusable private buffers.
///
/// Buffers are allocated on first use and zeroed at the start of every
/// call; worker count is fixed for the pool's lifetime so reduction order
/// is stable run to run.
#[derive(Debug)]
pub struct PairComputePool {
    nworkers: usize,
    strategy: ReduceStrategy,
    buffers: Vec<WorkerBuffer>,
}

impl PairComputePool {
    /// Pool with `nworkers` logical workers (at least one) and linear
    /// reduction.
    #[must_use]
    pub fn new(nworkers: usize) -> Self {
        let nworkers = nworkers.max(1);
        Self {
            nworkers,
            strategy: ReduceStrategy::Linear,
            buffers: vec![WorkerBuffer::default(); nworkers],
        }
    }

    /// Select the reduction strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: ReduceStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Number of logical workers.
    #[must_use]
    pub fn nworkers(&self) -> usize {
        self.nworkers
    }

    /// One compute call: evaluate every listed pair, accumulate forces
    /// into `atoms.f` (additive), and return the energy/virial totals.
    ///
    /// # Errors
    ///
    /// [`RiptideError::Uninitialized`] if the style's `init` has not run,
    /// [`RiptideError::MissingCharge`] if the style needs charges the
    /// system lacks, plus the shape errors from [`AtomSystem::validate`].
    /// No error path mutates forces.
    pub fn compute<P: PairPotential + ?Sized>(
        &mut self,
        pot: &P,
        atoms: &mut AtomSystem,
        list: &NeighborList,
        flags: ComputeFlags,
    ) -> Result<EnergyVirial, RiptideError> {
        if !pot.initialized() {
            return Err(RiptideError::Uninitialized { style: pot.style() });
        }
        if pot.requires_charge() && atoms.q.is_none() {
            return Err(RiptideError::MissingCharge { style: pot.style() });
        }
        atoms.validate()?;

        let nall = atoms.nall();
        for buf in &mut self.buffers {
            buf.reset(nall);
        }

        debug!(
            "pair compute: style={} inum={} workers={} eflag={} vflag={} newton={}",
            pot.style(),
            list.inum(),
            self.nworkers,
            flags.eflag,
            flags.vflag,
            flags.newton_pair
        );

        match (flags.eflag, flags.vflag, flags.newton_pair) {
            (false, false, false) => self.fork::<P, false, false, false>(pot, atoms, list),
            (false, false, true) => self.fork::<P, false, false, true>(pot, atoms, list),
            (false, true, false) => self.fork::<P, false, true, false>(pot, atoms, list),
            (false, true, true) => self.fork::<P, false, true, true>(pot, atoms, list),
            (true, false, false) => self.fork::<P, true, false, false>(pot, atoms, list),
            (true, false, true) => self.fork::<P, true, false, true>(pot, atoms, list),
            (true, true, false) => self.fork::<P, true, true, false>(pot, atoms, list),
            (true, true, true) => self.fork::<P, true, true, true>(pot, atoms, list),
        }

        reduce_forces(self.strategy, &mut self.buffers, &mut atoms.f);
        let (eng_vdwl, eng_coul, virial) = reduce_tallies(self.strategy, &self.buffers);
        Ok(EnergyVirial {
            eng_vdwl,
            eng_coul,
            virial,
        })
    }

    // Fork the monomorphized variant across the pool: one contiguous
    // range of listed atoms per worker, joined at the reduction barrier.
    fn fork<P: PairPotential + ?Sized, const EFLAG: bool, const VFLAG: bool, const NEWTON: bool>(
        &mut self,
        pot: &P,
        atoms: &AtomSystem,
        list: &NeighborList,
    ) {
        let inum = list.inum();
        let nworkers = self.nworkers;
        let ranges: Vec<(usize, usize)> = (0..nworkers)
            .map(|tid| (tid * inum / nworkers, (tid + 1) * inum / nworkers))
            .collect();

        self.buffers
            .par_iter_mut()
            .zip(ranges.par_iter())
            .for_each(|(buf, &(from, to))| {
                eval_range::<P, EFLAG, VFLAG, NEWTON>(pot, atoms, list, from, to, buf);
            });
    }
}

// One worker's scan over its range of listed atoms. Atom i state is loaded
// once per i; every neighbor entry is decoded before use; the cutoff gate
// is strict so a partner exactly at the cutoff never evaluates.
fn eval_range<P: PairPotential + ?Sized, const EFLAG: bool, const VFLAG: bool, const NEWTON: bool>(
    pot: &P,
    atoms: &AtomSystem,
    list: &NeighborList,
    from: usize,
    to: usize,
    buf: &mut WorkerBuffer,
) {
    let x = &atoms.x;
    let q = atoms.q.as_deref();
    let type_id = &atoms.type_id;
    let nlocal = atoms.nlocal;

    for ii in from..to {
        let i = list.atom(ii);
        let xtmp = x[i * 3];
        let ytmp = x[i * 3 + 1];
        let ztmp = x[i * 3 + 2];
        let qtmp = q.map_or(0.0, |q| q[i]);
        let itype = type_id[i];

        for &raw in list.raw_neighbors(ii) {
            let entry = list.special.decode(raw);
            let j = entry.j;

            let delx = xtmp - x[j * 3];
            let dely = ytmp - x[j * 3 + 1];
            let delz = ztmp - x[j * 3 + 2];
            let rsq = delx * delx + dely * dely + delz * delz;
            let jtype = type_id[j];

            if rsq < pot.cutoff_squared(itype, jtype) {
                let s = PairSample {
                    rsq,
                    itype,
                    jtype,
                    qi: qtmp,
                    qj: q.map_or(0.0, |q| q[j]),
                    factor_lj: entry.factor_lj,
                    factor_coul: entry.factor_coul,
                };
                let out = pot.evaluate(&s, EFLAG);

                let fx = delx * out.fpair;
                let fy = dely * out.fpair;
                let fz = delz * out.fpair;
                buf.add_force(i, fx, fy, fz);
                if NEWTON || j < nlocal {
                    buf.add_force(j, -fx, -fy, -fz);
                }

                if EFLAG || VFLAG {
                    ev_tally::<EFLAG, VFLAG, NEWTON>(buf, j, nlocal, &out, delx, dely, delz);
                }
            }
        }
    }
}

// Atom i is always owned, so its half of the pair is always tallied here.
// The j half belongs to this tally only when j is owned or Newton says
// this pass accounts for both endpoints; otherwise the ghost's owner
// tallies it in its own pass.
#[inline]
fn ev_tally<const EFLAG: bool, const VFLAG: bool, const NEWTON: bool>(
    buf: &mut WorkerBuffer,
    j: usize,
    nlocal: usize,
    out: &PairForce,
    delx: f64,
    dely: f64,
    delz: f64,
) {
    let weight = if NEWTON || j < nlocal { 1.0 } else { 0.5 };
    if EFLAG {
        buf.eng_vdwl += weight * out.evdwl;
        buf.eng_coul += weight * out.ecoul;
    }
    if VFLAG {
        let fp = weight * out.fpair;
        buf.virial[0] += delx * delx * fp;
        buf.virial[1] += dely * dely * fp;
        buf.virial[2] += delz * delz * fp;
        buf.virial[3] += delx * dely * fp;
        buf.virial[4] += delx * delz * fp;
        buf.virial[5] += dely * delz * fp;
    }
}
