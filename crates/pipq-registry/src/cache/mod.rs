//! In-memory metadata caching with TTL support.
//!
//! Caches index responses for the lifetime of the process only; nothing is
//! written to disk.

use std::time::{Duration, SystemTime};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::api::PackageResponse;

/// Cache entry with TTL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Cached metadata
    pub metadata: PackageResponse,
    /// When the entry was stored
    pub stored_at: SystemTime,
    /// Time-to-live duration
    pub ttl: Duration,
}

impl CacheEntry {
    /// Create new cache entry with default TTL (1 hour)
    pub fn new(metadata: PackageResponse) -> Self {
        Self::with_ttl(metadata, Duration::from_secs(3600))
    }

    /// Create cache entry with custom TTL
    pub fn with_ttl(metadata: PackageResponse, ttl: Duration) -> Self {
        Self {
            metadata,
            stored_at: SystemTime::now(),
            ttl,
        }
    }

    /// Check if cache entry is still fresh
    pub fn is_fresh(&self) -> bool {
        match self.stored_at.elapsed() {
            Ok(elapsed) => elapsed < self.ttl,
            Err(_) => false, // Clock went backwards, consider stale
        }
    }

    /// Get age of cache entry
    pub fn age(&self) -> Option<Duration> {
        self.stored_at.elapsed().ok()
    }
}

/// In-memory metadata cache with TTL
#[derive(Debug, Default)]
pub struct MetadataCache {
    /// Cache storage, keyed by `name` or `name@release`
    cache: DashMap<String, CacheEntry>,
}

impl MetadataCache {
    /// Create new metadata cache
    pub fn new() -> Self {
        Self {
            cache: DashMap::new(),
        }
    }

    /// Cache key for a package lookup, release-specific when one is given
    pub fn key(name: &str, release: Option<&str>) -> String {
        match release {
            Some(release) => format!("{}@{}", name, release),
            None => name.to_string(),
        }
    }

    /// Get cached metadata if fresh
    pub fn get(&self, key: &str) -> Option<PackageResponse> {
        let entry = self.cache.get(key)?;
        if entry.is_fresh() {
            Some(entry.metadata.clone())
        } else {
            drop(entry);
            // Remove stale entry
            self.cache.remove(key);
            None
        }
    }

    /// Store metadata with default TTL
    pub fn insert(&self, key: String, metadata: PackageResponse) {
        let entry = CacheEntry::new(metadata);
        self.cache.insert(key, entry);
    }

    /// Store metadata with custom TTL
    pub fn insert_with_ttl(&self, key: String, metadata: PackageResponse, ttl: Duration) {
        let entry = CacheEntry::with_ttl(metadata, ttl);
        self.cache.insert(key, entry);
    }

    /// Check if a key is cached and fresh
    pub fn contains_fresh(&self, key: &str) -> bool {
        self.cache
            .get(key)
            .map(|entry| entry.is_fresh())
            .unwrap_or(false)
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let mut fresh_count = 0;
        let mut stale_count = 0;

        for entry in self.cache.iter() {
            if entry.is_fresh() {
                fresh_count += 1;
            } else {
                stale_count += 1;
            }
        }

        CacheStats {
            total_entries: self.cache.len(),
            fresh_entries: fresh_count,
            stale_entries: stale_count,
        }
    }

    /// Clear all cached entries
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Remove stale entries
    pub fn cleanup(&self) -> usize {
        let mut removed = 0;
        self.cache.retain(|_, entry| {
            if entry.is_fresh() {
                true
            } else {
                removed += 1;
                false
            }
        });
        removed
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Total number of entries
    pub total_entries: usize,
    /// Number of fresh entries
    pub fresh_entries: usize,
    /// Number of stale entries
    pub stale_entries: usize,
}

#[cfg(test)]
mod tests;
