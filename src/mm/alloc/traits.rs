//! Interface comum dos alocadores de página.
//!
//! Consumidores (setup de VM, pipes, pilhas de processo) dependem apenas
//! destes traits e não da variante concreta.

use crate::mm::error::MmResult;
use crate::mm::pmm::PhysFrame;

/// Alocador de páginas físicas
pub trait PageAllocator: Send + Sync {
    /// Uma página livre, ou `OutOfMemory` (recuperável).
    fn alloc_page(&self) -> MmResult<PhysFrame>;

    /// Devolve a página. Endereço inválido é fatal.
    fn free_page(&self, frame: PhysFrame);

    /// Total de páginas livres agora
    fn free_pages(&self) -> usize;
}

/// Alocador com páginas compartilhadas (copy-on-write)
pub trait SharedPageAllocator: PageAllocator {
    /// Mais um dono para uma página já alocada
    fn add_ref(&self, frame: PhysFrame);

    /// Número atual de donos
    fn ref_count(&self, frame: PhysFrame) -> MmResult<u16>;
}
