use crate::klib::{align_down, align_up, is_aligned};
use core::fmt;

/// Endereço físico (wrapper type-safe)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct PhysAddr(u64);

impl PhysAddr {
    /// Cria novo endereço físico
    #[inline]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Retorna o valor interno como u64
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Retorna o valor interno como usize
    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn align_down(self, align: u64) -> Self {
        Self(align_down(self.0 as usize, align as usize) as u64)
    }

    #[inline]
    pub const fn align_up(self, align: u64) -> Self {
        Self(align_up(self.0 as usize, align as usize) as u64)
    }

    #[inline]
    pub const fn is_aligned(self, align: u64) -> bool {
        is_aligned(self.0 as usize, align as usize)
    }

    /// Adiciona offset
    #[inline]
    pub const fn add(self, offset: u64) -> Self {
        Self(self.0 + offset)
    }

    /// Distância em bytes a partir de `base` (None se abaixo)
    #[inline]
    pub const fn offset_from(self, base: PhysAddr) -> Option<u64> {
        self.0.checked_sub(base.0)
    }
}

impl fmt::Debug for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysAddr({:#x})", self.0)
    }
}

impl fmt::LowerHex for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
