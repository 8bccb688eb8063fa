//! # Buffer
//!
//! Um slot eterno do cache. A identidade `(dev, blockno)` é religada toda
//! vez que o slot é reaproveitado.
//!
//! ## Quem toca o quê
//!
//! | Campo              | Protegido por |
//! |--------------------|---------------|
//! | `dev`, `blockno`, `bound`, `refcnt` | lock do shard que contém o slot |
//! | `VALID`            | dono do SleepLock (ou shard, com refcnt 0) |
//! | `data`             | SleepLock do próprio buffer |
//!
//! Os campos de metadado são atômicos só para permitir leituras de
//! diagnóstico sem lock; escritas seguem a tabela acima.

use super::config::BSIZE;
use crate::arch::CpuOps;
use crate::sync::{RefCount, SleepLock};
use bitflags::bitflags;
use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

bitflags! {
    /// Estado do conteúdo de um buffer
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct BufFlags: u8 {
        /// Conteúdo reflete o disco
        const VALID = 1 << 0;
        /// Transferência de disco em andamento
        const DISK  = 1 << 1;
    }
}

/// Índice de um buffer no array global
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BufId(pub(crate) usize);

impl BufId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

pub struct Buf<C: CpuOps> {
    dev: AtomicU32,
    blockno: AtomicU32,
    /// Há identidade? Slots novos e estacionados não casam com nada.
    bound: AtomicBool,
    flags: AtomicU8,
    pub(crate) refcnt: RefCount,
    pub(crate) data: SleepLock<[u8; BSIZE], C>,
}

impl<C: CpuOps> Buf<C> {
    pub fn new() -> Self {
        Self {
            dev: AtomicU32::new(0),
            blockno: AtomicU32::new(0),
            bound: AtomicBool::new(false),
            flags: AtomicU8::new(0),
            refcnt: RefCount::new(0),
            data: SleepLock::new("buffer", [0u8; BSIZE]),
        }
    }

    #[inline]
    pub fn dev(&self) -> u32 {
        self.dev.load(Ordering::Acquire)
    }

    #[inline]
    pub fn blockno(&self) -> u32 {
        self.blockno.load(Ordering::Acquire)
    }

    /// A identidade é `(dev, blockno)`? Só sob o lock do shard.
    #[inline]
    pub(crate) fn is(&self, dev: u32, blockno: u32) -> bool {
        self.bound.load(Ordering::Acquire) && self.dev() == dev && self.blockno() == blockno
    }

    /// Religa a identidade e marca inválido, com uma referência.
    /// Chamador segura o lock do shard que conterá o slot; refcnt era 0.
    pub(crate) fn rebind(&self, dev: u32, blockno: u32) {
        self.dev.store(dev, Ordering::Release);
        self.blockno.store(blockno, Ordering::Release);
        self.bound.store(true, Ordering::Release);
        self.flags.store(0, Ordering::Release);
        self.refcnt.set(1);
    }

    /// Remove a identidade (slot ocioso, sem conteúdo aproveitável)
    pub(crate) fn unbind(&self) {
        self.bound.store(false, Ordering::Release);
        self.flags.store(0, Ordering::Release);
    }

    #[inline]
    pub fn flags(&self) -> BufFlags {
        BufFlags::from_bits_truncate(self.flags.load(Ordering::Acquire))
    }

    #[inline]
    pub(crate) fn insert_flags(&self, flags: BufFlags) {
        self.flags.fetch_or(flags.bits(), Ordering::AcqRel);
    }

    #[inline]
    pub(crate) fn remove_flags(&self, flags: BufFlags) {
        self.flags.fetch_and(!flags.bits(), Ordering::AcqRel);
    }

    #[inline]
    pub fn ref_count(&self) -> usize {
        self.refcnt.get()
    }
}

impl<C: CpuOps> Default for Buf<C> {
    fn default() -> Self {
        Self::new()
    }
}
