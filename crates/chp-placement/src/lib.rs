//! Deterministic replica placement for a storage cluster.
//!
//! Given a server count and a virtualization factor, a [`PlacementInstance`]
//! maps any 64-bit object identifier to an ordered list of distinct server
//! indices. The baseline strategy is consistent hashing with virtual nodes:
//! each server owns `virtual_factor` positions `hash(server, v)` on a `u64`
//! ring, an object starts at `hash(oid, 0)`, and replicas are the next
//! distinct owners clockwise. Growing the cluster by one server moves only
//! about `1 / num_servers` of the primaries.
//!
//! Strategies are pluggable through [`PlacementStrategy`] and resolved by
//! name from a [`Registry`]. Instances are immutable once built, so lookups
//! from many threads need no locking.
//!
//! ```
//! use chp_placement::PlacementInstance;
//! use chp_types::ObjectId;
//!
//! let instance = PlacementInstance::initialize("baseline", 4, 16).unwrap();
//! let servers = instance.find_placement(ObjectId::new(42), 2).unwrap();
//! assert_eq!(servers.len(), 2);
//! instance.release();
//! ```

mod config;
mod error;
pub mod hash;
mod instance;
pub mod registry;
mod ring;
mod stats;
pub mod strategy;

pub use config::PlacementConfig;
pub use error::{ConfigError, PlacementError};
pub use instance::PlacementInstance;
pub use registry::Registry;
pub use ring::{MAX_VNODES, Ring};
pub use stats::{LoadStats, remap_fraction};
pub use strategy::{Layout, PlacementStrategy};
