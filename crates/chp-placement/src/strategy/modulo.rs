//! Ring-less modulo strategies.
//!
//! Cheap to build and to query, but resizing the cluster remaps almost every
//! object. Useful as a reference point against the ring strategies.

use chp_types::{ObjectId, Placement, ServerIdx};

use super::{Layout, PlacementStrategy};
use crate::error::PlacementError;
use crate::hash::object_position;
use crate::ring::check_params;

/// `oid % n`, replicas on the following servers.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticModulo;

impl PlacementStrategy for StaticModulo {
    fn name(&self) -> &'static str {
        "static_modulo"
    }

    fn build_ring(
        &self,
        num_servers: u32,
        virtual_factor: u32,
    ) -> Result<Box<dyn Layout>, PlacementError> {
        check_params(num_servers, virtual_factor)?;
        Ok(Box::new(StaticModuloLayout { num_servers }))
    }
}

#[derive(Debug, Clone, Copy)]
struct StaticModuloLayout {
    num_servers: u32,
}

impl Layout for StaticModuloLayout {
    #[inline]
    fn find_placement(&self, object_id: ObjectId, replication: usize, out: &mut Placement) {
        let n = u64::from(self.num_servers);
        let primary = object_id.as_u64() % n;
        for i in 0..replication as u64 {
            out.push(((primary + i) % n) as ServerIdx);
        }
    }

    fn num_servers(&self) -> u32 {
        self.num_servers
    }

    fn vnode_count(&self) -> usize {
        0
    }
}

/// `hash(oid, i) % n` per replica, probing forward past duplicates.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashModulo;

impl PlacementStrategy for HashModulo {
    fn name(&self) -> &'static str {
        "hash_modulo"
    }

    fn build_ring(
        &self,
        num_servers: u32,
        virtual_factor: u32,
    ) -> Result<Box<dyn Layout>, PlacementError> {
        check_params(num_servers, virtual_factor)?;
        Ok(Box::new(HashModuloLayout { num_servers }))
    }
}

#[derive(Debug, Clone, Copy)]
struct HashModuloLayout {
    num_servers: u32,
}

impl Layout for HashModuloLayout {
    #[inline]
    fn find_placement(&self, object_id: ObjectId, replication: usize, out: &mut Placement) {
        let n = u64::from(self.num_servers);
        for i in 0..replication as u64 {
            let mut candidate = (object_position(object_id, i) % n) as ServerIdx;
            // Terminates: fewer than n servers are taken.
            while out.contains(candidate) {
                candidate = (candidate + 1) % self.num_servers;
            }
            out.push(candidate);
        }
    }

    fn num_servers(&self) -> u32 {
        self.num_servers
    }

    fn vnode_count(&self) -> usize {
        0
    }
}
