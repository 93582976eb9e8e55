//! Consistent hashing with virtual nodes.

use chp_types::{ObjectId, Placement};

use super::{Layout, PlacementStrategy};
use crate::error::PlacementError;
use crate::hash::object_position;
use crate::ring::Ring;

/// The baseline strategy: one ring, clockwise probe from `hash(oid, 0)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Baseline;

impl PlacementStrategy for Baseline {
    fn name(&self) -> &'static str {
        "baseline"
    }

    fn build_ring(
        &self,
        num_servers: u32,
        virtual_factor: u32,
    ) -> Result<Box<dyn Layout>, PlacementError> {
        Ok(Box::new(RingLayout {
            ring: Ring::build(num_servers, virtual_factor)?,
        }))
    }
}

/// A single [`Ring`] probed clockwise.
#[derive(Debug, Clone)]
pub struct RingLayout {
    ring: Ring,
}

impl RingLayout {
    /// The underlying ring.
    pub fn ring(&self) -> &Ring {
        &self.ring
    }
}

impl Layout for RingLayout {
    #[inline]
    fn find_placement(&self, object_id: ObjectId, replication: usize, out: &mut Placement) {
        let start = self.ring.successor(object_position(object_id, 0));
        self.ring.walk(start, replication, out);
    }

    fn num_servers(&self) -> u32 {
        self.ring.num_servers()
    }

    fn vnode_count(&self) -> usize {
        self.ring.len()
    }
}
