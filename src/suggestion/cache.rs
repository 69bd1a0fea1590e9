//! TTL cache for suggestion responses
//!
//! Entries are keyed by the serialized request body. Expiry is checked lazily
//! on read; nothing sweeps the cache in the background. Concurrent writers for
//! the same key are tolerated and the last write wins.

use super::models::SuggestionSignal;
use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Cache entry with TTL
#[derive(Debug, Clone)]
struct CacheEntry {
    signal: SuggestionSignal,
    inserted_at: Instant,
}

/// Bounded cache of suggestion signals
#[derive(Debug)]
pub struct SuggestionCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    max_size: usize,
}

impl SuggestionCache {
    /// Create a new cache with TTL and max size
    pub fn new(ttl: Duration, max_size: usize) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            max_size: max_size.max(1),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a cached signal if present and younger than the TTL
    pub fn get(&self, key: &str) -> Option<SuggestionSignal> {
        let expired = match self.entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                return Some(entry.signal.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries
                .remove_if(key, |_, entry| entry.inserted_at.elapsed() >= self.ttl);
        }
        None
    }

    /// Store a signal, evicting the oldest entry when full
    pub fn store(&self, key: &str, signal: SuggestionSignal) {
        if self.entries.len() >= self.max_size && !self.entries.contains_key(key) {
            self.evict_oldest();
        }

        self.entries.insert(
            key.to_string(),
            CacheEntry {
                signal,
                inserted_at: Instant::now(),
            },
        );
    }

    fn evict_oldest(&self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.value().inserted_at)
            .map(|entry| entry.key().clone());

        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }

    /// Drop every expired entry
    pub fn clear_expired(&self) {
        self.entries
            .retain(|_, entry| entry.inserted_at.elapsed() < self.ttl);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let total = self.entries.len();
        let valid = self
            .entries
            .iter()
            .filter(|entry| entry.value().inserted_at.elapsed() < self.ttl)
            .count();

        CacheStats {
            total_entries: total,
            valid_entries: valid,
            expired_entries: total.saturating_sub(valid),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
}
