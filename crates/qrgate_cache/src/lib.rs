//! Bounded caching with TTL support.
//!
//! Used by the authenticator to bound how stale a cached account (and its
//! plan tier) may become before the repository is consulted again.

#![warn(missing_docs)]

mod cache;

pub use cache::{CacheEntry, TtlCache, TtlCacheConfig, TtlCacheConfigBuilder};
