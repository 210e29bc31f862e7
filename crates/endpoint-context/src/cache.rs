//! Bounded cache of built relevance indexes keyed by corpus fingerprint.
//!
//! The cache is an explicit value owned by the caller, not process-global
//! state. Lookups and inserts take an internal lock, but index building
//! happens outside it. Two callers racing on the same fingerprint may both
//! build; the first insert wins and the loser is handed the cached entry.
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::index::{build_index, Fingerprint, RelevanceIndex};
use crate::model::ApiCorpus;

pub const DEFAULT_CAPACITY: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionPolicy {
    /// Evict the entry that was built first.
    #[default]
    OldestBuild,
    /// Evict the entry that was looked up least recently.
    LeastRecentlyUsed,
}

#[derive(Debug)]
struct CacheEntry {
    index: Arc<RelevanceIndex>,
    built_at: u64,
    last_used: u64,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<Fingerprint, CacheEntry>,
    clock: u64,
}

impl CacheState {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn victim(&self, policy: EvictionPolicy) -> Option<Fingerprint> {
        self.entries
            .iter()
            .min_by_key(|(_, entry)| match policy {
                EvictionPolicy::OldestBuild => entry.built_at,
                EvictionPolicy::LeastRecentlyUsed => entry.last_used,
            })
            .map(|(fingerprint, _)| fingerprint.clone())
    }
}

#[derive(Debug)]
pub struct IndexCache {
    capacity: usize,
    policy: EvictionPolicy,
    state: Mutex<CacheState>,
}

impl Default for IndexCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl IndexCache {
    /// A cache holding at most `capacity` indexes (minimum 1), evicting the
    /// oldest build first.
    pub fn new(capacity: usize) -> Self {
        Self::with_policy(capacity, EvictionPolicy::OldestBuild)
    }

    pub fn with_policy(capacity: usize, policy: EvictionPolicy) -> Self {
        Self {
            capacity: capacity.max(1),
            policy,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    /// Return the cached index for this corpus, building it on a miss.
    pub fn get_or_build(&self, corpus: &ApiCorpus) -> Arc<RelevanceIndex> {
        let fingerprint = Fingerprint::of(corpus);
        if let Some(index) = self.get(&fingerprint) {
            debug!(
                fingerprint = %fingerprint,
                age_ms = index.built_at().elapsed().as_millis() as u64,
                "index cache hit"
            );
            return index;
        }
        debug!(fingerprint = %fingerprint, endpoints = corpus.len(), "index cache miss");
        self.insert(build_index(corpus))
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<Arc<RelevanceIndex>> {
        let mut state = self.lock();
        let now = state.tick();
        let entry = state.entries.get_mut(fingerprint)?;
        entry.last_used = now;
        Some(Arc::clone(&entry.index))
    }

    /// Insert a freshly built index, evicting one entry if the cache is full.
    ///
    /// If an index with the same fingerprint is already cached, that one is
    /// kept and returned and `index` is dropped.
    pub fn insert(&self, index: RelevanceIndex) -> Arc<RelevanceIndex> {
        let mut state = self.lock();
        let now = state.tick();

        if let Some(existing) = state.entries.get_mut(index.fingerprint()) {
            existing.last_used = now;
            return Arc::clone(&existing.index);
        }

        if state.entries.len() >= self.capacity {
            if let Some(victim) = state.victim(self.policy) {
                state.entries.remove(&victim);
                info!(fingerprint = %victim, policy = ?self.policy, "index cache eviction");
            }
        }

        let fingerprint = index.fingerprint().clone();
        let index = Arc::new(index);
        state.entries.insert(
            fingerprint,
            CacheEntry {
                index: Arc::clone(&index),
                built_at: now,
                last_used: now,
            },
        );
        index
    }

    /// Drop the entry for `fingerprint`. Returns whether one was present.
    pub fn invalidate(&self, fingerprint: &Fingerprint) -> bool {
        let removed = self.lock().entries.remove(fingerprint).is_some();
        if removed {
            info!(fingerprint = %fingerprint, "index cache entry invalidated");
        }
        removed
    }

    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.lock().entries.contains_key(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached fingerprints, oldest build first.
    pub fn fingerprints(&self) -> Vec<Fingerprint> {
        let state = self.lock();
        let mut entries: Vec<(&Fingerprint, u64)> = state
            .entries
            .iter()
            .map(|(fingerprint, entry)| (fingerprint, entry.built_at))
            .collect();
        entries.sort_by_key(|(_, built_at)| *built_at);
        entries.into_iter().map(|(f, _)| f.clone()).collect()
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
