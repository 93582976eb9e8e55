//! Pluggable placement strategies.
//!
//! A strategy knows how to build a [`Layout`] for a cluster shape; a layout
//! answers lookups. Call sites only ever see these two traits, so adding a
//! strategy means implementing them and registering it in a
//! [`Registry`](crate::Registry).

mod baseline;
mod modulo;
mod multiring;

use std::fmt;

use chp_types::{ObjectId, Placement};

use crate::error::PlacementError;

pub use baseline::{Baseline, RingLayout};
pub use modulo::{HashModulo, StaticModulo};
pub use multiring::{MULTIRING_SUB_RINGS, MultiRing};

/// A named ring-construction algorithm.
pub trait PlacementStrategy: Send + Sync {
    /// Name the strategy is registered under.
    fn name(&self) -> &'static str;

    /// Build the immutable lookup structure for `num_servers` servers.
    ///
    /// Implementations must reject zero servers and a zero virtual factor
    /// with [`PlacementError::InvalidParameter`], even if they ignore the
    /// virtual factor otherwise.
    fn build_ring(
        &self,
        num_servers: u32,
        virtual_factor: u32,
    ) -> Result<Box<dyn Layout>, PlacementError>;
}

/// A built, read-only placement structure.
pub trait Layout: Send + Sync + fmt::Debug {
    /// Append `replication` distinct servers for `object_id` to `out`.
    ///
    /// `out` is empty and `1 <= replication <= num_servers` has already
    /// been checked; implementations must not allocate.
    fn find_placement(&self, object_id: ObjectId, replication: usize, out: &mut Placement);

    /// Physical servers covered.
    fn num_servers(&self) -> u32;

    /// Virtual nodes held across all rings (0 for ring-less layouts).
    fn vnode_count(&self) -> usize;
}
