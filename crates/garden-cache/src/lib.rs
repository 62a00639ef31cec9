//! Cache abstraction layer for Garden.
//!
//! This crate provides generic caching traits that decouple cache consumers
//! from the underlying storage mechanism. Two traits form the core API:
//!
//! - [`Cache`]: Factory for named cache buckets
//! - [`CacheBucket`]: Key-value store with age-based freshness
//!
//! Entries are never invalidated explicitly. A lookup names the maximum age it
//! accepts, and anything older is treated as a miss.
//!
//! # Implementations
//!
//! - [`NullCache`] / [`NullCacheBucket`]: No-op implementations (always miss)
//! - [`FileCache`]: File-based implementation using modification times
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use garden_cache::{Cache, NullCache};
//!
//! let cache = NullCache;
//! let bucket = cache.bucket("notebooks");
//! bucket.set("nb.json", b"{}");
//! assert_eq!(bucket.get("nb.json", Some(Duration::from_secs(60))), None);
//! ```

mod file;

use std::time::Duration;

pub use file::FileCache;

/// Default freshness window for downloaded content.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// A named partition within a [`Cache`].
pub trait CacheBucket: Send + Sync {
    /// Retrieve a cached value.
    ///
    /// Returns `Some(value)` if the key exists and the entry is younger than
    /// `max_age`. Passing `None` accepts an entry of any age.
    fn get(&self, key: &str, max_age: Option<Duration>) -> Option<Vec<u8>>;

    /// Store a value in the cache, resetting its age.
    fn set(&self, key: &str, value: &[u8]);
}

/// Factory for named cache [`CacheBucket`]s.
///
/// Buckets produced by one `Cache` are logically isolated from each other.
/// [`FileCache`] stores each bucket in a separate subdirectory.
pub trait Cache: Send + Sync {
    /// Open or create a named bucket.
    ///
    /// # Arguments
    ///
    /// * `name` - Bucket name (e.g., "notebooks")
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket>;
}

/// No-op [`CacheBucket`] that never stores or retrieves data.
pub struct NullCacheBucket;

impl CacheBucket for NullCacheBucket {
    fn get(&self, _key: &str, _max_age: Option<Duration>) -> Option<Vec<u8>> {
        None
    }

    fn set(&self, _key: &str, _value: &[u8]) {}
}

/// No-op [`Cache`] that always returns [`NullCacheBucket`]s.
///
/// Use when caching is disabled.
pub struct NullCache;

impl Cache for NullCache {
    fn bucket(&self, _name: &str) -> Box<dyn CacheBucket> {
        Box::new(NullCacheBucket)
    }
}
