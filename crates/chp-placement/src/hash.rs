//! Ring hash function.
//!
//! XXH3-64 over the little-endian bytes of a 64-bit key, seeded with a salt.
//! The encoding is fixed so every process on every platform computes the
//! same ring and the same object positions.

use chp_types::{ObjectId, ServerIdx};
use xxhash_rust::xxh3::xxh3_64_with_seed;

/// Hash a 64-bit key with a salt.
#[inline]
pub fn hash(key: u64, salt: u64) -> u64 {
    xxh3_64_with_seed(&key.to_le_bytes(), salt)
}

/// Hash arbitrary bytes with a salt.
#[inline]
pub fn hash_bytes(key: &[u8], salt: u64) -> u64 {
    xxh3_64_with_seed(key, salt)
}

/// Position of an object on a ring: `hash(oid, salt)`.
#[inline]
pub(crate) fn object_position(object_id: ObjectId, salt: u64) -> u64 {
    hash(object_id.as_u64(), salt)
}

/// Position of virtual node `seed` of `server`: `hash(server, seed)`.
#[inline]
pub(crate) fn vnode_position(server: ServerIdx, seed: u64) -> u64 {
    hash(u64::from(server), seed)
}
