use core::sync::atomic::{AtomicU64, Ordering};

/// Contadores do buffer cache
#[derive(Debug, Default)]
pub struct BcacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    steals: AtomicU64,
    disk_reads: AtomicU64,
    disk_writes: AtomicU64,
}

/// Cópia pontual de [`BcacheStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BcacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub steals: u64,
    pub disk_reads: u64,
    pub disk_writes: u64,
}

impl BcacheStats {
    pub const fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            steals: AtomicU64::new(0),
            disk_reads: AtomicU64::new(0),
            disk_writes: AtomicU64::new(0),
        }
    }

    pub fn inc_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_steal(&self) {
        self.steals.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_disk(&self, write: bool) {
        if write {
            self.disk_writes.fetch_add(1, Ordering::Relaxed);
        } else {
            self.disk_reads.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> BcacheStatsSnapshot {
        BcacheStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            steals: self.steals.load(Ordering::Relaxed),
            disk_reads: self.disk_reads.load(Ordering::Relaxed),
            disk_writes: self.disk_writes.load(Ordering::Relaxed),
        }
    }
}
