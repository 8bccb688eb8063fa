//! Shard do buffer cache: array ordenado de slots sob um spinlock.

use super::buf::BufId;
use crate::sync::{Spinlock, SpinlockGuard};
use alloc::vec::Vec;

pub struct Shard {
    slots: Spinlock<Vec<BufId>>,
}

impl Shard {
    /// Shard vazio com espaço para `capacity` slots.
    ///
    /// A capacidade é o total de buffers do cache: qualquer shard pode
    /// acabar com todos e o push nunca realoca sob o lock.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Spinlock::new("bcache.shard", Vec::with_capacity(capacity)),
        }
    }

    #[inline]
    pub fn lock(&self) -> SpinlockGuard<'_, Vec<BufId>> {
        self.slots.lock()
    }

    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
