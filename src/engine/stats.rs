//! Statistics — iteration counters shared between the worker and readers.
//!
//! Counters are atomics. The writer bumps `checked` before `hits` and the
//! reader loads `hits` before `checked`, so every snapshot satisfies
//! `hits <= checked` without a lock.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use crate::types::{HitRecord, StatsSnapshot};

/// How many recent hits are kept for `/api/hits`.
pub const RECENT_HITS_CAPACITY: usize = 20;

#[derive(Debug)]
pub struct Statistics {
    checked: AtomicU64,
    hits: AtomicU64,
    running: AtomicBool,
    started_at: Instant,
    recent_hits: Mutex<VecDeque<HitRecord>>,
}

impl Default for Statistics {
    fn default() -> Self {
        Self::new()
    }
}

impl Statistics {
    pub fn new() -> Self {
        Self {
            checked: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            running: AtomicBool::new(false),
            started_at: Instant::now(),
            recent_hits: Mutex::new(VecDeque::with_capacity(RECENT_HITS_CAPACITY)),
        }
    }

    /// Count one completed iteration.
    pub fn record_iteration(&self, hit: bool) {
        self.checked.fetch_add(1, Ordering::SeqCst);
        if hit {
            self.hits.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Keep a hit in the recent-hits ring, evicting the oldest.
    pub fn record_hit(&self, record: HitRecord) {
        let mut ring = match self.recent_hits.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if ring.len() == RECENT_HITS_CAPACITY {
            ring.pop_front();
        }
        ring.push_back(record);
    }

    /// Most recent hits, newest first.
    pub fn recent_hits(&self, limit: usize) -> Vec<HitRecord> {
        let ring = match self.recent_hits.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        ring.iter().rev().take(limit).cloned().collect()
    }

    pub(crate) fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    pub fn checked(&self) -> u64 {
        self.checked.load(Ordering::SeqCst)
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn uptime_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }

    /// Consistent point-in-time copy.
    pub fn snapshot(&self) -> StatsSnapshot {
        // hits first: see module docs
        let hits = self.hits.load(Ordering::SeqCst);
        let checked = self.checked.load(Ordering::SeqCst);
        StatsSnapshot {
            checked,
            hits,
            running: self.is_running(),
            uptime: self.uptime_secs(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
