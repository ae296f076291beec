//! Ring routing for sharded memo caches.
//!
//! Maps a numeric key to one of N shards by contiguous range rather than by
//! hash: keys `[0, S)` belong to shard 0, `[S, 2S)` to shard 1, wrapping
//! around after shard N−1, where S is the per-shard capacity.
//!
//! ```text
//!   RingRouter { shards: 3, span: 4 }
//!
//!   key:    0..4    4..8    8..12   12..16  16..20  ...
//!   shard:  ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐
//!           │  0  │ │  1  │ │  2  │ │  0  │ │  1  │
//!           └─────┘ └─────┘ └─────┘ └─────┘ └─────┘
//! ```
//!
//! A sequential scan over keys therefore round-robins across shards in
//! blocks of S, which is what the feature-computation stage wants: dataset
//! traversal in id order spreads its lock acquisitions instead of hammering
//! one shard.
//!
//! Properties
//! ──────────
//! • Deterministic: same (key, span, shards) always yields the same shard
//! • Range-contiguous: a full block of `span` consecutive keys shares a shard
//! • Anti-correlated with uniform-random access, by construction

/// Keys that can be positioned on the ring.
///
/// Supplies the integer routing index used by `⌊k/S⌋ mod N`. Implemented for
/// the unsigned integer types; image ids in the surrounding pipeline are
/// `u64`.
pub trait RingKey: Copy {
    /// Returns the key's position on the ring.
    fn ring_index(self) -> u64;
}

macro_rules! impl_ring_key {
    ($($ty:ty),*) => {
        $(impl RingKey for $ty {
            #[inline]
            fn ring_index(self) -> u64 {
                self as u64
            }
        })*
    };
}

impl_ring_key!(u8, u16, u32, u64, usize);

/// Deterministic range-based shard selector.
///
/// The same `(key, span, shards)` triple always produces the same shard
/// index in `[0, shards)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingRouter {
    shards: usize,
    span: u64,
}

impl RingRouter {
    /// Creates a router for `shards` shards, each owning contiguous key
    /// ranges of length `span`.
    ///
    /// Both values are clamped to at least 1; cache constructors validate
    /// their configuration before building a router.
    pub fn new(shards: usize, span: u64) -> Self {
        Self {
            shards: shards.max(1),
            span: span.max(1),
        }
    }

    /// Returns the number of shards on the ring.
    pub fn shard_count(&self) -> usize {
        self.shards
    }

    /// Returns the length of the contiguous key range each shard owns.
    pub fn span(&self) -> u64 {
        self.span
    }

    /// Maps a key to its owning shard: `⌊k/span⌋ mod shards`.
    #[inline]
    pub fn shard_for<K: RingKey>(&self, key: K) -> usize {
        ((key.ring_index() / self.span) % self.shards as u64) as usize
    }

    /// Returns the shard `offset` places after `key`'s owner, wrapping
    /// around the ring. Used by the opportunistic try-lock walk.
    #[inline]
    pub fn shard_at_offset<K: RingKey>(&self, key: K, offset: usize) -> usize {
        (self.shard_for(key) + offset) % self.shards
    }
}
