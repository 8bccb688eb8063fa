use core::sync::atomic::{AtomicU64, Ordering};

/// Contadores de um pool de páginas
#[derive(Debug, Default)]
pub struct PoolStats {
    allocs: AtomicU64,
    frees: AtomicU64,
    /// Páginas que este pool tirou de outros
    steals: AtomicU64,
    /// Páginas que outros pools tiraram deste
    stolen_from: AtomicU64,
    failed_allocs: AtomicU64,
}

/// Cópia pontual de [`PoolStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStatsSnapshot {
    pub allocs: u64,
    pub frees: u64,
    pub steals: u64,
    pub stolen_from: u64,
    pub failed_allocs: u64,
}

impl PoolStats {
    pub const fn new() -> Self {
        Self {
            allocs: AtomicU64::new(0),
            frees: AtomicU64::new(0),
            steals: AtomicU64::new(0),
            stolen_from: AtomicU64::new(0),
            failed_allocs: AtomicU64::new(0),
        }
    }

    pub fn inc_alloc(&self) {
        self.allocs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_free(&self) {
        self.frees.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_steals(&self, n: u64) {
        self.steals.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_stolen_from(&self, n: u64) {
        self.stolen_from.fetch_add(n, Ordering::Relaxed);
    }

    pub fn inc_failed(&self) {
        self.failed_allocs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PoolStatsSnapshot {
        PoolStatsSnapshot {
            allocs: self.allocs.load(Ordering::Relaxed),
            frees: self.frees.load(Ordering::Relaxed),
            steals: self.steals.load(Ordering::Relaxed),
            stolen_from: self.stolen_from.load(Ordering::Relaxed),
            failed_allocs: self.failed_allocs.load(Ordering::Relaxed),
        }
    }
}
