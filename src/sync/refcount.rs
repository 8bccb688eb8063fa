//! Contagem de referências atômica.
//!
//! Usada pelo buffer cache para o `refcnt` de cada buffer. Toda mutação
//! acontece sob o lock do shard dono; o atômico só permite leituras de
//! diagnóstico sem lock.

use core::sync::atomic::{AtomicUsize, Ordering};

/// Contador de referências atômico
#[derive(Debug)]
pub struct RefCount {
    count: AtomicUsize,
}

impl RefCount {
    /// Cria um novo contador com valor inicial
    pub const fn new(initial: usize) -> Self {
        Self {
            count: AtomicUsize::new(initial),
        }
    }

    /// Incrementa o contador de referências.
    /// Retorna o valor ANTERIOR.
    #[inline]
    pub fn inc(&self) -> usize {
        self.count.fetch_add(1, Ordering::AcqRel)
    }

    /// Decrementa o contador de referências.
    ///
    /// Retorna o valor NOVO, ou `None` se já estava em zero (underflow;
    /// o contador não é alterado).
    #[inline]
    #[must_use]
    pub fn dec(&self) -> Option<usize> {
        self.count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| c.checked_sub(1))
            .ok()
            .map(|prev| prev - 1)
    }

    /// Retorna o valor atual.
    #[inline]
    pub fn get(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    /// Sobrescreve o valor (reciclagem de buffer).
    #[inline]
    pub fn set(&self, value: usize) {
        self.count.store(value, Ordering::Release);
    }
}

impl Default for RefCount {
    fn default() -> Self {
        Self::new(0)
    }
}
