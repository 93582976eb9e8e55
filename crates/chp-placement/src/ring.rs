//! Immutable consistent hashing ring.
//!
//! A [`Ring`] holds `num_servers * virtual_factor` virtual nodes sorted by
//! position on a `u64` circle. Positions and owners live in two parallel
//! vectors so the binary search touches only the position array.

use chp_types::{Placement, ServerIdx};
use rayon::prelude::*;

use crate::error::PlacementError;
use crate::hash::vnode_position;

/// Largest ring a single instance may build.
pub const MAX_VNODES: usize = 1 << 28;

/// A virtual node while the ring is under construction.
///
/// Field order defines the sort order: position, then server, then seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Entry {
    position: u64,
    server: ServerIdx,
    seed: u64,
}

/// Sorted virtual-node positions, each tagged with its physical server.
///
/// Built once and never mutated, so any number of threads may look up
/// against a shared reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ring {
    /// Strictly ascending virtual-node positions.
    positions: Vec<u64>,
    /// `servers[i]` owns `positions[i]`.
    servers: Vec<ServerIdx>,
    num_servers: u32,
    virtual_factor: u32,
}

impl Ring {
    /// Build a ring where virtual node `v` of server `s` sits at `hash(s, v)`.
    pub fn build(num_servers: u32, virtual_factor: u32) -> Result<Self, PlacementError> {
        Self::build_with(num_servers, virtual_factor, vnode_position)
    }

    /// Build a ring with a custom position function `(server, seed) -> position`.
    ///
    /// Entries sharing a position are ordered by server, then seed. The first
    /// keeps the position; each later one is re-placed with
    /// `seed + virtual_factor` until every position on the ring is unique.
    pub(crate) fn build_with<F>(
        num_servers: u32,
        virtual_factor: u32,
        position: F,
    ) -> Result<Self, PlacementError>
    where
        F: Fn(ServerIdx, u64) -> u64 + Sync,
    {
        let total = ring_size(num_servers, virtual_factor)?;
        let per_server = virtual_factor as usize;

        // Each vnode hashes independently.
        let mut entries: Vec<Entry> = (0..total)
            .into_par_iter()
            .map(|i| {
                let server = (i / per_server) as ServerIdx;
                let seed = (i % per_server) as u64;
                Entry {
                    position: position(server, seed),
                    server,
                    seed,
                }
            })
            .collect();
        entries.par_sort_unstable();

        while displace_collisions(&mut entries, u64::from(virtual_factor), &position) {
            entries.par_sort_unstable();
        }

        let (positions, servers) = entries.into_iter().map(|e| (e.position, e.server)).unzip();

        Ok(Self {
            positions,
            servers,
            num_servers,
            virtual_factor,
        })
    }

    /// Number of virtual nodes.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Always false for a built ring; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of physical servers.
    pub fn num_servers(&self) -> u32 {
        self.num_servers
    }

    /// Virtual nodes per physical server.
    pub fn virtual_factor(&self) -> u32 {
        self.virtual_factor
    }

    /// Position of the `i`-th virtual node.
    pub fn position(&self, i: usize) -> u64 {
        self.positions[i]
    }

    /// Owner of the `i`-th virtual node.
    pub fn server(&self, i: usize) -> ServerIdx {
        self.servers[i]
    }

    /// All positions in ring order.
    pub fn positions(&self) -> &[u64] {
        &self.positions
    }

    /// Index of the first virtual node at or after `target`, wrapping to 0.
    #[inline]
    pub fn successor(&self, target: u64) -> usize {
        let idx = self.positions.partition_point(|&p| p < target);
        if idx == self.positions.len() { 0 } else { idx }
    }

    /// Server owning the arc that contains `target`.
    #[inline]
    pub fn owner_at(&self, target: u64) -> ServerIdx {
        self.servers[self.successor(target)]
    }

    /// Walk clockwise from virtual node `start`, appending servers not yet in
    /// `out` until it holds `until` entries or one full lap is done.
    #[inline]
    pub fn walk(&self, start: usize, until: usize, out: &mut Placement) {
        let len = self.servers.len();
        let mut idx = start;
        for _ in 0..len {
            if out.len() >= until {
                return;
            }
            let server = self.servers[idx];
            if !out.contains(server) {
                out.push(server);
            }
            idx += 1;
            if idx == len {
                idx = 0;
            }
        }
    }
}

/// Reject zero servers and a zero virtual factor.
pub(crate) fn check_params(num_servers: u32, virtual_factor: u32) -> Result<(), PlacementError> {
    if num_servers == 0 {
        return Err(PlacementError::InvalidParameter {
            reason: "num_servers must be greater than zero",
        });
    }
    if virtual_factor == 0 {
        return Err(PlacementError::InvalidParameter {
            reason: "virtual_factor must be greater than zero",
        });
    }
    Ok(())
}

/// Validate construction parameters and return the virtual node count.
fn ring_size(num_servers: u32, virtual_factor: u32) -> Result<usize, PlacementError> {
    check_params(num_servers, virtual_factor)?;
    (num_servers as usize)
        .checked_mul(virtual_factor as usize)
        .filter(|&total| total <= MAX_VNODES)
        .ok_or(PlacementError::InvalidParameter {
            reason: "num_servers * virtual_factor exceeds the ring size limit",
        })
}

/// Re-place every entry that shares a position with an earlier one.
///
/// Expects `entries` sorted. Returns whether anything moved.
fn displace_collisions<F>(entries: &mut [Entry], virtual_factor: u64, position: &F) -> bool
where
    F: Fn(ServerIdx, u64) -> u64,
{
    let mut moved = false;
    let mut kept: Option<u64> = None;
    for entry in entries.iter_mut() {
        if kept == Some(entry.position) {
            // Seeds stay congruent mod virtual_factor, so (server, seed) stays unique.
            entry.seed += virtual_factor;
            entry.position = position(entry.server, entry.seed);
            moved = true;
        } else {
            kept = Some(entry.position);
        }
    }
    moved
}
