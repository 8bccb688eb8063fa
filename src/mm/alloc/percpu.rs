//! # Per-CPU Page Pools
//!
//! Um pool de páginas livres por processador, cada um com o próprio lock.
//!
//! ## 🎯 Propósito
//!
//! Um único lock global para páginas cria contenção severa em multicore.
//! Com um pool por CPU, alocação e liberação tocam apenas o lock local no
//! caso comum.
//!
//! ## 🏗️ Arquitetura
//!
//! 1. kalloc() → pop no pool local
//! 2. Se vazio → rouba de outro pool, um lock por vez
//! 3. kfree()  → push no pool LOCAL (não no pool de origem)
//!
//! ## Boot
//!
//! Toda página é liberada uma vez pelo core de boot, então TODAS começam no
//! pool dele. Os outros cores só enchem seus pools roubando na primeira
//! demanda. Custo de aquecimento aceito.
//!
//! ## Ordem de locks
//!
//! Nunca mais de um lock de pool por vez. O lock local é solto antes do
//! scan; cada vítima é solta antes da próxima; o lote roubado só entra no
//! pool local depois que o lock da vítima foi solto.

use crate::arch::{CpuOps, PreemptGuard};
use crate::klib::fatal;
use crate::mm::alloc::traits::PageAllocator;
use crate::mm::config::{KallocConfig, ALLOC_JUNK, FREE_JUNK};
use crate::mm::error::{MmError, MmResult};
use crate::mm::pmm::{FrameLinks, FreeList, PhysFrame, PhysMemory, PoolStats, PoolStatsSnapshot};
use crate::sync::Spinlock;
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::marker::PhantomData;

// =============================================================================
// POOL POR CPU
// =============================================================================

/// Pool local de um processador.
///
/// Alinhado a cache line para evitar false sharing entre CPUs.
#[repr(C, align(64))]
struct CpuPool {
    free: Spinlock<FreeList>,
    stats: PoolStats,
}

impl CpuPool {
    fn new() -> Self {
        Self {
            free: Spinlock::new("kmem", FreeList::new()),
            stats: PoolStats::new(),
        }
    }
}

// =============================================================================
// ALOCADOR
// =============================================================================

/// Alocador de páginas com pools por CPU e roubo entre pools
pub struct Kalloc<C: CpuOps> {
    memory: PhysMemory,
    links: FrameLinks,
    pools: Box<[CpuPool]>,
    config: KallocConfig,
    _cpu: PhantomData<fn() -> C>,
}

impl<C: CpuOps> Kalloc<C> {
    /// Cria o alocador e libera toda a faixa no pool do core atual.
    pub fn new(memory: PhysMemory, config: KallocConfig) -> MmResult<Self> {
        config.validate()?;

        // O core de boot fica fixo até o fim da carga inicial
        let boot = PreemptGuard::<C>::new();
        if boot.core() >= config.ncpu {
            crate::kerror!("(KALLOC) Core de boot fora dos pools: core=", boot.core());
            return Err(MmError::InvalidParameter);
        }

        let mut pools = Vec::with_capacity(config.ncpu);
        pools.resize_with(config.ncpu, CpuPool::new);

        let links = FrameLinks::new(memory.page_count());
        let kalloc = Self {
            memory,
            links,
            pools: pools.into_boxed_slice(),
            config,
            _cpu: PhantomData,
        };

        crate::kinfo!("(KALLOC) Inicializando pools: ncpu=", config.ncpu);
        crate::kinfo!("(KALLOC) Paginas gerenciaveis=", kalloc.memory.page_count());

        for index in 0..kalloc.memory.page_count() {
            kalloc.kfree(kalloc.memory.frame_at(index));
        }
        drop(boot);

        crate::kok!("(KALLOC) Pools prontos");
        Ok(kalloc)
    }

    /// Aloca uma página.
    ///
    /// Tenta o pool local, depois rouba. `OutOfMemory` só quando TODOS os
    /// pools estão vazios; não é fatal.
    pub fn kalloc(&self) -> MmResult<PhysFrame> {
        let guard = PreemptGuard::<C>::new();
        let cpu = self.checked_cpu(guard.core());
        let pool = &self.pools[cpu];

        // Lock local solto ao fim deste statement
        let local = pool.free.lock().pop(&self.links);
        let index = match local {
            Some(index) => index,
            None => match self.steal(cpu) {
                Some(index) => index,
                None => {
                    pool.stats.inc_failed();
                    drop(guard);
                    crate::kwarn!("(KALLOC) OOM: nenhum pool com pagina livre, cpu=", cpu);
                    return Err(MmError::OutOfMemory);
                }
            },
        };
        pool.stats.inc_alloc();
        drop(guard);

        // SAFETY: a página acabou de sair da free-list; somos o único dono
        unsafe { self.memory.fill(index, ALLOC_JUNK) };
        Ok(self.memory.frame_at(index))
    }

    /// Devolve uma página ao pool do core atual.
    ///
    /// Endereço desalinhado, fora da faixa ou já livre é fatal.
    pub fn kfree(&self, frame: PhysFrame) {
        let index = match self.memory.frame_index(frame) {
            Ok(index) => index,
            Err(err) => fatal("kfree", err.as_str()),
        };
        if !self.links.mark_free(index) {
            fatal("kfree", MmError::DoubleFree.as_str());
        }

        // SAFETY: ainda não está em nenhuma lista; o chamador abriu mão dela
        unsafe { self.memory.fill(index, FREE_JUNK) };

        let guard = PreemptGuard::<C>::new();
        let cpu = self.checked_cpu(guard.core());
        let pool = &self.pools[cpu];
        pool.free.lock().push(&self.links, index);
        pool.stats.inc_free();
    }

    /// Rouba até `steal_batch` páginas de outro pool.
    ///
    /// Devolve a primeira para uso imediato; as extras vão para o pool
    /// local depois que o lock da vítima foi solto.
    fn steal(&self, cpu: usize) -> Option<usize> {
        let ncpu = self.pools.len();

        for offset in 1..ncpu {
            let victim = (cpu + offset) % ncpu;
            let mut batch = FreeList::new();
            let first;
            {
                let mut remote = self.pools[victim].free.lock();
                first = match remote.pop(&self.links) {
                    Some(index) => index,
                    None => continue,
                };
                while batch.len() + 1 < self.config.steal_batch {
                    match remote.pop(&self.links) {
                        Some(index) => batch.push(&self.links, index),
                        None => break,
                    }
                }
            }

            let taken = batch.len() as u64 + 1;
            self.pools[victim].stats.add_stolen_from(taken);
            self.pools[cpu].stats.add_steals(taken);
            crate::ktrace!("(KALLOC) Roubo: vitima=", victim);

            if !batch.is_empty() {
                let mut local = self.pools[cpu].free.lock();
                while let Some(index) = batch.pop(&self.links) {
                    // pop zerou a marca de livre; a página continua livre
                    self.links.mark_free(index);
                    local.push(&self.links, index);
                }
            }
            return Some(first);
        }
        None
    }

    fn checked_cpu(&self, cpu: usize) -> usize {
        if cpu >= self.pools.len() {
            fatal("kalloc", "core fora dos pools configurados");
        }
        cpu
    }

    // =========================================================================
    // INTROSPECÇÃO
    // =========================================================================

    /// Total de páginas livres (soma dos pools, um lock por vez)
    pub fn free_pages(&self) -> usize {
        self.pools.iter().map(|p| p.free.lock().len()).sum()
    }

    /// Páginas livres no pool de `cpu`
    pub fn pool_free_pages(&self, cpu: usize) -> MmResult<usize> {
        let pool = self.pools.get(cpu).ok_or(MmError::InvalidParameter)?;
        Ok(pool.free.lock().len())
    }

    /// Contadores do pool de `cpu`
    pub fn stats(&self, cpu: usize) -> MmResult<PoolStatsSnapshot> {
        let pool = self.pools.get(cpu).ok_or(MmError::InvalidParameter)?;
        Ok(pool.stats.snapshot())
    }

    pub fn config(&self) -> KallocConfig {
        self.config
    }

    /// Faixa gerenciada (acesso ao conteúdo das páginas)
    pub fn memory(&self) -> &PhysMemory {
        &self.memory
    }
}

impl<C: CpuOps> PageAllocator for Kalloc<C> {
    fn alloc_page(&self) -> MmResult<PhysFrame> {
        self.kalloc()
    }

    fn free_page(&self, frame: PhysFrame) {
        self.kfree(frame)
    }

    fn free_pages(&self) -> usize {
        Kalloc::free_pages(self)
    }
}

// =============================================================================
// TESTES
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::hosted::HostCpu;
    use crate::mm::addr::PhysAddr;
    use crate::mm::config::PAGE_SIZE;
    use std::collections::HashSet;
    use std::sync::Mutex;

    const BASE: u64 = 0x8000_0000;

    fn kalloc_with(pages: usize, ncpu: usize, steal_batch: usize) -> Kalloc<HostCpu> {
        HostCpu::bind_core(0);
        let mem = PhysMemory::new(PhysAddr::new(BASE), pages).unwrap();
        Kalloc::new(mem, KallocConfig::new(ncpu, steal_batch)).unwrap()
    }

    #[test]
    fn test_boot_puts_everything_on_boot_core() {
        let k = kalloc_with(16, 4, 1);
        assert_eq!(k.free_pages(), 16);
        assert_eq!(k.pool_free_pages(0), Ok(16));
        for cpu in 1..4 {
            assert_eq!(k.pool_free_pages(cpu), Ok(0));
        }
        assert_eq!(k.pool_free_pages(4), Err(MmError::InvalidParameter));
    }

    #[test]
    fn test_alloc_free_round_trip() {
        let k = kalloc_with(8, 2, 1);
        let frame = k.kalloc().unwrap();
        assert!(frame.start_address().is_aligned(PAGE_SIZE as u64));
        assert!(frame.start_address() >= k.memory().start());
        assert!(frame.start_address() < k.memory().end());
        assert_eq!(k.free_pages(), 7);
        k.kfree(frame);
        assert_eq!(k.free_pages(), 8);
        assert_eq!(k.stats(0).unwrap().allocs, 1);
    }

    #[test]
    fn test_sentinel_fill() {
        let k = kalloc_with(4, 1, 1);
        let frame = k.kalloc().unwrap();
        unsafe {
            let page = k.memory().page(frame).unwrap();
            assert!(page.iter().all(|&b| b == ALLOC_JUNK));
        }
        k.kfree(frame);
        // Ainda livre: o conteúdo é o padrão de free
        unsafe {
            let page = k.memory().page(frame).unwrap();
            assert!(page.iter().all(|&b| b == FREE_JUNK));
        }
    }

    #[test]
    fn test_exhaustion_is_recoverable() {
        let k = kalloc_with(3, 2, 1);
        let frames: Vec<_> = (0..3).map(|_| k.kalloc().unwrap()).collect();
        assert_eq!(k.kalloc(), Err(MmError::OutOfMemory));
        assert_eq!(k.stats(0).unwrap().failed_allocs, 1);
        k.kfree(frames[1]);
        assert_eq!(k.kalloc(), Ok(frames[1]));
        k.kfree(frames[0]);
        k.kfree(frames[1]);
        k.kfree(frames[2]);
        assert_eq!(k.free_pages(), 3);
    }

    #[test]
    fn test_empty_local_pool_steals() {
        let k = kalloc_with(4, 2, 1);
        HostCpu::bind_core(1);
        let frame = k.kalloc().unwrap();
        assert_eq!(k.pool_free_pages(0), Ok(3));
        assert_eq!(k.pool_free_pages(1), Ok(0));
        assert_eq!(k.stats(1).unwrap().steals, 1);
        assert_eq!(k.stats(0).unwrap().stolen_from, 1);

        // Devolvida ao pool de quem libera, não ao de origem
        k.kfree(frame);
        assert_eq!(k.pool_free_pages(1), Ok(1));
        assert_eq!(k.pool_free_pages(0), Ok(3));
        HostCpu::bind_core(0);
    }

    #[test]
    fn test_steal_batch_refills_local_pool() {
        let k = kalloc_with(10, 2, 4);
        HostCpu::bind_core(1);
        let _frame = k.kalloc().unwrap();
        assert_eq!(k.pool_free_pages(1), Ok(3));
        assert_eq!(k.pool_free_pages(0), Ok(6));
        // Próximas três saem do pool local sem roubo
        for _ in 0..3 {
            k.kalloc().unwrap();
        }
        assert_eq!(k.stats(1).unwrap().steals, 4);
        HostCpu::bind_core(0);
    }

    #[test]
    fn test_concurrent_allocations_are_unique() {
        let k = kalloc_with(64, 4, 1);
        let seen = Mutex::new(HashSet::new());

        std::thread::scope(|s| {
            for cpu in 0..4 {
                let k = &k;
                let seen = &seen;
                s.spawn(move || {
                    HostCpu::bind_core(cpu);
                    let mut mine = Vec::new();
                    for _ in 0..16 {
                        mine.push(k.kalloc().unwrap());
                    }
                    let mut seen = seen.lock().unwrap();
                    for f in mine {
                        assert!(seen.insert(f.addr()), "página entregue duas vezes");
                    }
                });
            }
        });

        assert_eq!(seen.lock().unwrap().len(), 64);
        assert_eq!(k.free_pages(), 0);
        assert_eq!(k.kalloc(), Err(MmError::OutOfMemory));
    }

    #[test]
    fn test_concurrent_churn_conserves_pages() {
        let k = kalloc_with(32, 4, 2);

        std::thread::scope(|s| {
            for cpu in 0..4 {
                let k = &k;
                s.spawn(move || {
                    HostCpu::bind_core(cpu);
                    for round in 0..200 {
                        let mut held = Vec::new();
                        for _ in 0..(round % 5 + 1) {
                            if let Ok(f) = k.kalloc() {
                                held.push(f);
                            }
                        }
                        for f in held {
                            k.kfree(f);
                        }
                    }
                });
            }
        });

        assert_eq!(k.free_pages(), 32);
    }

    #[test]
    #[should_panic(expected = "kfree")]
    fn test_free_misaligned_is_fatal() {
        let k = kalloc_with(4, 1, 1);
        k.kfree(PhysFrame::from_start_address_unchecked(PhysAddr::new(BASE + 8)));
    }

    #[test]
    #[should_panic(expected = "kfree")]
    fn test_free_out_of_range_is_fatal() {
        let k = kalloc_with(4, 1, 1);
        k.kfree(PhysFrame::from_start_address_unchecked(PhysAddr::new(BASE + 4 * PAGE_SIZE as u64)));
    }

    #[test]
    #[should_panic(expected = "Double free")]
    fn test_double_free_is_fatal() {
        let k = kalloc_with(4, 1, 1);
        let f = k.kalloc().unwrap();
        k.kfree(f);
        k.kfree(f);
    }

    #[test]
    #[should_panic(expected = "core fora")]
    fn test_core_outside_pools_is_fatal() {
        let k = kalloc_with(4, 2, 1);
        HostCpu::bind_core(5);
        let _ = k.kalloc();
    }

    #[test]
    fn test_boot_core_outside_pools_is_rejected() {
        HostCpu::bind_core(3);
        let mem = PhysMemory::new(PhysAddr::new(BASE), 4).unwrap();
        let result = Kalloc::<HostCpu>::new(mem, KallocConfig::new(2, 1));
        assert_eq!(HostCpu::preempt_depth(), 0);
        HostCpu::bind_core(0);
        assert_eq!(result.err(), Some(MmError::InvalidParameter));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mem = PhysMemory::new(PhysAddr::new(BASE), 4).unwrap();
        assert_eq!(
            Kalloc::<HostCpu>::new(mem, KallocConfig::new(0, 1)).err(),
            Some(MmError::InvalidParameter)
        );
    }
}
