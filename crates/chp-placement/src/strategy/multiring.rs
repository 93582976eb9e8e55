//! Several independent rings, one consulted per replica.
//!
//! Replica `i` is drawn from sub-ring `i % MULTIRING_SUB_RINGS`, starting at
//! `hash(oid, i % MULTIRING_SUB_RINGS)`. Neighbouring replicas therefore come
//! from unrelated arcs instead of adjacent vnodes on one ring, which spreads
//! the load of a failed server's replicas across more survivors.

use chp_types::{ObjectId, Placement};
use rayon::prelude::*;

use super::{Layout, PlacementStrategy};
use crate::error::PlacementError;
use crate::hash::{hash, object_position, vnode_position};
use crate::ring::Ring;

/// Number of sub-rings built per instance.
pub const MULTIRING_SUB_RINGS: usize = 4;

/// The multi-ring strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiRing;

impl PlacementStrategy for MultiRing {
    fn name(&self) -> &'static str {
        "multiring"
    }

    fn build_ring(
        &self,
        num_servers: u32,
        virtual_factor: u32,
    ) -> Result<Box<dyn Layout>, PlacementError> {
        // Sub-ring 0 is exactly the baseline ring.
        let rings = (0..MULTIRING_SUB_RINGS as u64)
            .into_par_iter()
            .map(|j| {
                if j == 0 {
                    Ring::build(num_servers, virtual_factor)
                } else {
                    Ring::build_with(num_servers, virtual_factor, |s, seed| {
                        hash(vnode_position(s, seed), j)
                    })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Box::new(MultiRingLayout {
            rings,
            num_servers,
        }))
    }
}

#[derive(Debug, Clone)]
struct MultiRingLayout {
    rings: Vec<Ring>,
    num_servers: u32,
}

impl Layout for MultiRingLayout {
    #[inline]
    fn find_placement(&self, object_id: ObjectId, replication: usize, out: &mut Placement) {
        for i in 0..replication {
            let j = i % self.rings.len();
            let ring = &self.rings[j];
            let start = ring.successor(object_position(object_id, j as u64));
            ring.walk(start, i + 1, out);
        }
    }

    fn num_servers(&self) -> u32 {
        self.num_servers
    }

    fn vnode_count(&self) -> usize {
        self.rings.iter().map(Ring::len).sum()
    }
}
