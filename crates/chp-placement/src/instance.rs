//! Placement instance lifecycle.
//!
//! An instance is created by [`PlacementInstance::initialize`] (or
//! [`Registry::initialize`](crate::Registry::initialize)), queried any number
//! of times through a shared reference, and torn down by
//! [`PlacementInstance::release`]. Release consumes the instance, so using
//! it afterwards is rejected by the compiler rather than at runtime.

use std::time::Instant;

use chp_types::{CH_MAX_REPLICATION, Migration, ObjectId, Placement};
use tracing::debug;

use crate::error::PlacementError;
use crate::registry;
use crate::strategy::{Layout, PlacementStrategy};

/// A ready-to-query placement engine for one cluster shape.
///
/// Immutable after construction and `Send + Sync`: share it by reference or
/// through an `Arc` with as many lookup threads as needed.
#[derive(Debug)]
pub struct PlacementInstance {
    strategy_name: String,
    num_servers: u32,
    virtual_factor: u32,
    layout: Box<dyn Layout>,
}

impl PlacementInstance {
    /// Build an instance using the global strategy registry.
    ///
    /// Fails with [`PlacementError::UnknownStrategy`] for unregistered names
    /// and [`PlacementError::InvalidParameter`] for zero servers, a zero
    /// virtual factor, or a ring larger than [`MAX_VNODES`](crate::MAX_VNODES)
    /// virtual nodes.
    pub fn initialize(
        strategy_name: &str,
        num_servers: u32,
        virtual_factor: u32,
    ) -> Result<Self, PlacementError> {
        registry::global().initialize(strategy_name, num_servers, virtual_factor)
    }

    pub(crate) fn build(
        strategy: &dyn PlacementStrategy,
        strategy_name: &str,
        num_servers: u32,
        virtual_factor: u32,
    ) -> Result<Self, PlacementError> {
        let started = Instant::now();
        let layout = strategy.build_ring(num_servers, virtual_factor)?;

        debug!(
            strategy = strategy_name,
            num_servers,
            virtual_factor,
            vnodes = layout.vnode_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "placement instance ready"
        );

        Ok(Self {
            strategy_name: strategy_name.to_string(),
            num_servers,
            virtual_factor,
            layout,
        })
    }

    /// Servers that should hold `object_id`, primary first.
    ///
    /// Returns exactly `replication` distinct indices in `[0, num_servers)`,
    /// or [`PlacementError::InvalidReplicationFactor`] if `replication` is
    /// zero, exceeds the server count, or exceeds [`CH_MAX_REPLICATION`].
    /// A layout whose result is short, overfilled, out of range or repeats a
    /// server yields [`PlacementError::InvalidLayoutOutput`] instead of a
    /// partial answer. Never allocates.
    #[inline]
    pub fn find_placement(
        &self,
        object_id: ObjectId,
        replication: usize,
    ) -> Result<Placement, PlacementError> {
        check_replication(replication, self.num_servers)?;
        let mut out = Placement::new();
        self.layout.find_placement(object_id, replication, &mut out);
        self.check_output(&out, replication)?;
        Ok(out)
    }

    /// Reject anything but exactly `replication` distinct in-range servers.
    ///
    /// Quadratic in `replication`, which is bounded by [`CH_MAX_REPLICATION`].
    #[inline]
    fn check_output(&self, out: &Placement, replication: usize) -> Result<(), PlacementError> {
        let reason = if out.len() < replication {
            "fewer servers than requested"
        } else if out.len() > replication {
            "more servers than requested"
        } else if out.iter().any(|&s| s >= self.num_servers) {
            "server index out of range"
        } else if (1..out.len()).any(|i| out[..i].contains(&out[i])) {
            "duplicate server"
        } else {
            return Ok(());
        };
        Err(PlacementError::InvalidLayoutOutput {
            strategy: self.strategy_name.clone(),
            reason,
        })
    }

    /// Replicas that gain a new home when moving from `old` to `new`.
    ///
    /// Each server that appears in the new placement of an object but not in
    /// the old one is paired with a server that held a replica before and no
    /// longer does. Only the plan is computed; nothing is moved.
    pub fn diff(
        old: &PlacementInstance,
        new: &PlacementInstance,
        object_ids: &[ObjectId],
        replication: usize,
    ) -> Result<Vec<Migration>, PlacementError> {
        let mut migrations = Vec::new();

        for &object_id in object_ids {
            let before = old.find_placement(object_id, replication)?;
            let after = new.find_placement(object_id, replication)?;

            let mut lost = before.iter().filter(|&&s| !after.contains(s));
            for &to in after.iter().filter(|&&s| !before.contains(s)) {
                if let Some(&from) = lost.next() {
                    migrations.push(Migration {
                        object_id,
                        from,
                        to,
                    });
                }
            }
        }

        Ok(migrations)
    }

    /// Tear the instance down, freeing its rings.
    ///
    /// All lookups borrowing the instance must have finished; the borrow
    /// checker enforces this for scoped threads, and `Arc::try_unwrap` does
    /// for shared ones. A released instance cannot be queried:
    ///
    /// ```compile_fail
    /// use chp_placement::PlacementInstance;
    /// use chp_types::ObjectId;
    ///
    /// let instance = PlacementInstance::initialize("baseline", 4, 16).unwrap();
    /// instance.release();
    /// let _ = instance.find_placement(ObjectId::new(0), 2);
    /// ```
    pub fn release(self) {
        debug!(
            strategy = %self.strategy_name,
            num_servers = self.num_servers,
            "placement instance released"
        );
    }

    /// Name the instance was initialized with.
    pub fn strategy_name(&self) -> &str {
        &self.strategy_name
    }

    /// Number of physical servers.
    pub fn num_servers(&self) -> u32 {
        self.num_servers
    }

    /// Virtual nodes per server requested at initialization.
    pub fn virtual_factor(&self) -> u32 {
        self.virtual_factor
    }

    /// Virtual nodes actually built (0 for ring-less strategies).
    pub fn vnode_count(&self) -> usize {
        self.layout.vnode_count()
    }
}

/// `1 <= replication <= min(num_servers, CH_MAX_REPLICATION)`.
pub(crate) fn check_replication(replication: usize, num_servers: u32) -> Result<(), PlacementError> {
    if replication == 0 || replication > CH_MAX_REPLICATION || replication > num_servers as usize {
        return Err(PlacementError::InvalidReplicationFactor {
            requested: replication,
            num_servers,
            max: CH_MAX_REPLICATION,
        });
    }
    Ok(())
}
