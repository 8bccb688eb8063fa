//! # Alocador com Contagem de Referências (Copy-on-Write)
//!
//! Um único pool global (um lock, uma free-list) mais uma tabela densa de
//! contagens, uma entrada `u16` por página da faixa.
//!
//! ## Regras da contagem
//!
//! - `count >= 1` ⇔ página alocada
//! - `kalloc` carimba 1
//! - `add_ref` só vale para página alocada
//! - `kfree` com `count > 1` apenas decrementa; com `count == 1` a página
//!   volta para a free-list
//! - Nunca abaixo de zero: `kfree` de página livre é fatal
//!
//! ## Layout
//!
//! A tabela ocupa as primeiras páginas da faixa (`reserved_pages`). Essas
//! páginas nunca entram na free-list e têm contagem fixa em 1.

use crate::klib::fatal;
use crate::mm::alloc::traits::{PageAllocator, SharedPageAllocator};
use crate::mm::config::{ALLOC_JUNK, FREE_JUNK, PAGE_SIZE};
use crate::mm::error::{MmError, MmResult};
use crate::mm::pmm::{FrameLinks, FreeList, PhysFrame, PhysMemory, PoolStats, PoolStatsSnapshot};
use crate::sync::Spinlock;
use alloc::boxed::Box;
use alloc::vec;

/// Estado protegido pelo lock global
struct CowPool {
    free: FreeList,
    refs: Box<[u16]>,
}

/// Alocador de páginas com contagem de referências
pub struct CowKalloc {
    memory: PhysMemory,
    links: FrameLinks,
    pool: Spinlock<CowPool>,
    reserved: usize,
    stats: PoolStats,
}

impl CowKalloc {
    /// Páginas necessárias para a tabela de `page_count` contagens
    pub const fn table_pages(page_count: usize) -> usize {
        (page_count * core::mem::size_of::<u16>()).div_ceil(PAGE_SIZE)
    }

    /// Cria o alocador: reserva a tabela e libera o resto da faixa.
    pub fn new(memory: PhysMemory) -> MmResult<Self> {
        let npages = memory.page_count();
        let reserved = Self::table_pages(npages);
        if reserved >= npages {
            return Err(MmError::InvalidSize);
        }

        let mut refs = vec![0u16; npages].into_boxed_slice();
        refs[..reserved].fill(1);

        let cow = Self {
            links: FrameLinks::new(npages),
            memory,
            pool: Spinlock::new("kmem", CowPool {
                free: FreeList::new(),
                refs,
            }),
            reserved,
            stats: PoolStats::new(),
        };

        crate::kinfo!("(COW) Paginas gerenciaveis=", npages);
        crate::kinfo!("(COW) Paginas da tabela de refcount=", reserved);

        // Carimba 1 e libera: mesmo caminho de uma página em uso
        for index in reserved..npages {
            cow.pool.lock().refs[index] = 1;
            cow.kfree(cow.memory.frame_at(index));
        }

        crate::kok!("(COW) Pool pronto");
        Ok(cow)
    }

    /// Aloca uma página com contagem 1
    pub fn kalloc(&self) -> MmResult<PhysFrame> {
        let index = {
            let mut pool = self.pool.lock();
            let popped = pool.free.pop(&self.links);
            match popped {
                Some(index) => {
                    pool.refs[index] = 1;
                    index
                }
                None => {
                    drop(pool);
                    self.stats.inc_failed();
                    crate::kwarn!("(COW) OOM: pool global vazio");
                    return Err(MmError::OutOfMemory);
                }
            }
        };
        self.stats.inc_alloc();

        // SAFETY: contagem 1 e fora da lista; somos o único dono
        unsafe { self.memory.fill(index, ALLOC_JUNK) };
        Ok(self.memory.frame_at(index))
    }

    /// Mais um dono para `frame`
    pub fn add_ref(&self, frame: PhysFrame) {
        let index = self.checked_index("add_ref", frame);
        let mut pool = self.pool.lock();
        let count = pool.refs[index];
        match count {
            0 => {
                drop(pool);
                fatal("add_ref", MmError::NotAllocated.as_str())
            }
            u16::MAX => {
                drop(pool);
                fatal("add_ref", MmError::RefCountOverflow.as_str())
            }
            _ => pool.refs[index] += 1,
        }
    }

    /// Solta uma referência; a última devolve a página ao pool.
    pub fn kfree(&self, frame: PhysFrame) {
        let index = self.checked_index("kfree", frame);

        {
            let mut pool = self.pool.lock();
            let count = pool.refs[index];
            match count {
                0 => {
                    drop(pool);
                    fatal("kfree", MmError::RefCountUnderflow.as_str())
                }
                1 => pool.refs[index] = 0,
                _ => {
                    pool.refs[index] -= 1;
                    return;
                }
            }
        }

        // SAFETY: contagem chegou a zero; ninguém mais referencia a página
        unsafe { self.memory.fill(index, FREE_JUNK) };

        self.links.mark_free(index);
        self.pool.lock().free.push(&self.links, index);
        self.stats.inc_free();
    }

    /// Índice validado; desalinhado, fora da faixa ou tabela é fatal
    fn checked_index(&self, origin: &'static str, frame: PhysFrame) -> usize {
        match self.memory.frame_index(frame) {
            Ok(index) if index >= self.reserved => index,
            Ok(_) => fatal(origin, MmError::InvalidAddress.as_str()),
            Err(err) => fatal(origin, err.as_str()),
        }
    }

    // =========================================================================
    // INTROSPECÇÃO
    // =========================================================================

    /// Contagem atual de `frame`
    pub fn ref_count(&self, frame: PhysFrame) -> MmResult<u16> {
        let index = self.memory.frame_index(frame)?;
        Ok(self.pool.lock().refs[index])
    }

    pub fn free_pages(&self) -> usize {
        self.pool.lock().free.len()
    }

    /// Páginas ocupadas pela tabela de contagens
    pub fn reserved_pages(&self) -> usize {
        self.reserved
    }

    pub fn stats(&self) -> PoolStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn memory(&self) -> &PhysMemory {
        &self.memory
    }
}

impl PageAllocator for CowKalloc {
    fn alloc_page(&self) -> MmResult<PhysFrame> {
        self.kalloc()
    }

    fn free_page(&self, frame: PhysFrame) {
        self.kfree(frame)
    }

    fn free_pages(&self) -> usize {
        CowKalloc::free_pages(self)
    }
}

impl SharedPageAllocator for CowKalloc {
    fn add_ref(&self, frame: PhysFrame) {
        CowKalloc::add_ref(self, frame)
    }

    fn ref_count(&self, frame: PhysFrame) -> MmResult<u16> {
        CowKalloc::ref_count(self, frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mm::addr::PhysAddr;

    fn cow_with(pages: usize) -> CowKalloc {
        let mem = PhysMemory::new(PhysAddr::new(0x8000_0000), pages).unwrap();
        CowKalloc::new(mem).unwrap()
    }

    #[test]
    fn test_table_reservation() {
        assert_eq!(CowKalloc::table_pages(1), 1);
        assert_eq!(CowKalloc::table_pages(2048), 1);
        assert_eq!(CowKalloc::table_pages(2049), 2);

        let cow = cow_with(8);
        assert_eq!(cow.reserved_pages(), 1);
        assert_eq!(cow.free_pages(), 7);
        assert_eq!(cow.ref_count(cow.memory().frame_at(0)), Ok(1));
        assert_eq!(cow.ref_count(cow.memory().frame_at(1)), Ok(0));
    }

    #[test]
    fn test_single_page_range_is_rejected() {
        let mem = PhysMemory::new(PhysAddr::new(0x8000_0000), 1).unwrap();
        assert_eq!(CowKalloc::new(mem).err(), Some(MmError::InvalidSize));
    }

    #[test]
    fn test_shared_page_survives_first_free() {
        let cow = cow_with(4);
        let page = cow.kalloc().unwrap();
        assert_eq!(cow.ref_count(page), Ok(1));

        cow.add_ref(page);
        assert_eq!(cow.ref_count(page), Ok(2));
        let free_before = cow.free_pages();

        cow.kfree(page);
        assert_eq!(cow.ref_count(page), Ok(1));
        assert_eq!(cow.free_pages(), free_before);
        // Conteúdo intacto para o dono restante
        unsafe {
            assert!(cow.memory().page(page).unwrap().iter().all(|&b| b == ALLOC_JUNK));
        }

        cow.kfree(page);
        assert_eq!(cow.ref_count(page), Ok(0));
        assert_eq!(cow.free_pages(), free_before + 1);
        unsafe {
            assert!(cow.memory().page(page).unwrap().iter().all(|&b| b == FREE_JUNK));
        }
    }

    #[test]
    fn test_exhaustion_is_recoverable() {
        let cow = cow_with(3);
        let a = cow.kalloc().unwrap();
        let b = cow.kalloc().unwrap();
        assert_ne!(a, b);
        assert_eq!(cow.kalloc(), Err(MmError::OutOfMemory));
        cow.kfree(b);
        assert_eq!(cow.kalloc(), Ok(b));
        assert_eq!(cow.stats().failed_allocs, 1);
    }

    #[test]
    fn test_concurrent_sharing() {
        let cow = cow_with(16);
        let page = cow.kalloc().unwrap();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..100 {
                        cow.add_ref(page);
                        cow.kfree(page);
                    }
                });
            }
        });
        assert_eq!(cow.ref_count(page), Ok(1));
        cow.kfree(page);
        assert_eq!(cow.free_pages(), 15);
    }

    #[test]
    #[should_panic(expected = "Refcount abaixo de zero")]
    fn test_free_of_free_page_is_fatal() {
        let cow = cow_with(4);
        let page = cow.kalloc().unwrap();
        cow.kfree(page);
        cow.kfree(page);
    }

    #[test]
    #[should_panic(expected = "add_ref")]
    fn test_add_ref_on_free_page_is_fatal() {
        let cow = cow_with(4);
        cow.add_ref(cow.memory().frame_at(2));
    }

    #[test]
    #[should_panic(expected = "kfree")]
    fn test_free_of_table_page_is_fatal() {
        let cow = cow_with(4);
        cow.kfree(cow.memory().frame_at(0));
    }

    #[test]
    #[should_panic(expected = "alinhado")]
    fn test_free_misaligned_is_fatal() {
        let cow = cow_with(4);
        cow.kfree(PhysFrame::from_start_address_unchecked(PhysAddr::new(0x8000_1004)));
    }
}
