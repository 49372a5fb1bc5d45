// SPDX-License-Identifier: AGPL-3.0-only

#![deny(clippy::expect_used, clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

//! riptide — short-range pairwise interaction core for molecular dynamics.
//!
//! Computes pairwise forces, potential energies, and virial stresses over a
//! precomputed neighbor list, concurrently across a fixed pool of workers,
//! with results independent of worker count. Neighbor-list construction,
//! domain decomposition, and trajectory output live upstream/downstream;
//! this crate is the per-timestep inner loop between them.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `atoms` | Read-mostly per-atom state (positions, charges, types) and the global force accumulator |
//! | `neighbor` | Half neighbor list with packed bonded-exclusion encoding |
//! | `table` | Symmetric per-type-pair coefficient tables with restart records |
//! | `potential` | The `PairPotential` contract every pair style implements |
//! | `potentials` | Concrete styles: LJ+Coulomb cutoff, Debye-screened Coulomb, dielectric Coulomb |
//! | `buffer` | Per-worker force/energy/virial accumulation buffers |
//! | `reduce` | Linear and fan-in merge of per-worker buffers |
//! | `compute` | Worker pool, 2×2×2 variant dispatch, compute-call entry point |
//! | `error` | Typed configuration and consistency errors |
//! | `tolerances` | Documented f64 validation tolerances |
//!
//! # Concurrency model
//!
//! Each compute call partitions the listed atoms into contiguous disjoint
//! ranges, one per worker. Workers write only to their private buffers,
//! sized over the full local+ghost index space, so both endpoints of any
//! interaction can be accumulated without synchronization. A final
//! reduction — itself parallel over disjoint slices of the atom index
//! space — merges private buffers into the global force array. No locks,
//! no atomics.

pub mod atoms;
pub mod buffer;
pub mod compute;
pub mod error;
pub mod neighbor;
pub mod potential;
pub mod potentials;
pub mod reduce;
pub mod table;
pub mod tolerances;

pub use atoms::AtomSystem;
pub use compute::{ComputeFlags, EnergyVirial, PairComputePool};
pub use error::RiptideError;
pub use neighbor::{NeighborList, SpecialScales};
pub use potential::{PairForce, PairPotential, PairSample};
pub use reduce::ReduceStrategy;
