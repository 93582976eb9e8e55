//! Shared types for the placement workspace.
//!
//! This crate defines the vocabulary every other crate speaks:
//! the opaque object key ([`ObjectId`]), server indices ([`ServerIdx`]),
//! the fixed-capacity lookup result ([`Placement`]) bounded by
//! [`CH_MAX_REPLICATION`], and [`Migration`] records produced when a
//! placement is recomputed for a different cluster size.

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Index of a physical server, always in `[0, num_servers)`.
pub type ServerIdx = u32;

/// Upper bound on the replication factor any lookup may request.
///
/// Sizes the inline buffer of [`Placement`], so lookups never allocate.
pub const CH_MAX_REPLICATION: usize = 16;

/// Opaque 64-bit identifier of a storable object.
///
/// The engine assumes nothing about its structure; only the bit pattern
/// is fed to the hash function.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Create an ID from its raw value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Return the raw 64-bit value.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Little-endian bytes, the canonical hash input.
    pub const fn to_le_bytes(&self) -> [u8; 8] {
        self.0.to_le_bytes()
    }
}

impl From<u64> for ObjectId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<ObjectId> for u64 {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({self})")
    }
}

// ---------------------------------------------------------------------------
// Placement result
// ---------------------------------------------------------------------------

/// Ordered, distinct server indices holding one object.
///
/// Storage is an inline array of [`CH_MAX_REPLICATION`] slots; only the
/// first `len` are meaningful. Equality and hashing ignore the unused tail.
#[derive(Clone, Copy)]
pub struct Placement {
    servers: [ServerIdx; CH_MAX_REPLICATION],
    len: usize,
}

impl Placement {
    /// An empty placement.
    pub const fn new() -> Self {
        Self {
            servers: [0; CH_MAX_REPLICATION],
            len: 0,
        }
    }

    /// Append a server.
    ///
    /// # Panics
    ///
    /// Panics if the placement already holds [`CH_MAX_REPLICATION`] servers.
    pub fn push(&mut self, server: ServerIdx) {
        assert!(
            self.len < CH_MAX_REPLICATION,
            "placement capacity ({CH_MAX_REPLICATION}) exceeded"
        );
        self.servers[self.len] = server;
        self.len += 1;
    }

    /// Whether `server` has already been collected.
    #[inline]
    pub fn contains(&self, server: ServerIdx) -> bool {
        self.as_slice().contains(&server)
    }

    /// Number of servers collected.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no server has been collected.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The first (primary) server, if any.
    pub fn primary(&self) -> Option<ServerIdx> {
        self.as_slice().first().copied()
    }

    /// Drop all collected servers.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// The collected servers, in placement order.
    #[inline]
    pub fn as_slice(&self) -> &[ServerIdx] {
        &self.servers[..self.len]
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for Placement {
    type Target = [ServerIdx];

    fn deref(&self) -> &[ServerIdx] {
        self.as_slice()
    }
}

impl<'a> IntoIterator for &'a Placement {
    type Item = &'a ServerIdx;
    type IntoIter = std::slice::Iter<'a, ServerIdx>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl PartialEq for Placement {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for Placement {}

impl std::hash::Hash for Placement {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl fmt::Debug for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

// ---------------------------------------------------------------------------
// Resize planning
// ---------------------------------------------------------------------------

/// One replica that gains a new home when a placement is recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Migration {
    /// The object whose replica moves.
    pub object_id: ObjectId,
    /// A server that held a replica before and no longer does.
    pub from: ServerIdx,
    /// The server that holds the replica afterwards.
    pub to: ServerIdx,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
