//! # Memória Física Gerenciável
//!
//! Faixa contígua de páginas acima da imagem do kernel, entregue ao alocador
//! no boot. Frames são endereçados por endereço físico; o conteúdo de uma
//! página é alcançado por `page`/`page_mut`.
//!
//! O dono de um frame é quem o recebeu do `kalloc` e ainda não o devolveu.
//! Só o dono pode tocar nos bytes.

use crate::mm::addr::PhysAddr;
use crate::mm::config::PAGE_SIZE;
use crate::mm::error::{MmError, MmResult};
use crate::mm::pmm::frame::PhysFrame;
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cell::UnsafeCell;

#[repr(C, align(4096))]
struct PageCell(UnsafeCell<[u8; PAGE_SIZE]>);

// SAFETY: acesso aos bytes só acontece pelo dono do frame (ver módulo)
unsafe impl Sync for PageCell {}

/// Faixa de páginas físicas
pub struct PhysMemory {
    base: PhysAddr,
    pages: Box<[PageCell]>,
}

impl PhysMemory {
    /// Reserva `page_count` páginas começando em `base`
    pub fn new(base: PhysAddr, page_count: usize) -> MmResult<Self> {
        if !base.is_aligned(PAGE_SIZE as u64) {
            return Err(MmError::NotAligned);
        }
        // Índices de frame cabem em u32 (free-list indexada)
        if page_count == 0 || page_count >= u32::MAX as usize {
            return Err(MmError::InvalidSize);
        }
        if base
            .as_u64()
            .checked_add((page_count * PAGE_SIZE) as u64)
            .is_none()
        {
            return Err(MmError::InvalidAddress);
        }

        let mut pages = Vec::with_capacity(page_count);
        pages.resize_with(page_count, || PageCell(UnsafeCell::new([0u8; PAGE_SIZE])));

        Ok(Self {
            base,
            pages: pages.into_boxed_slice(),
        })
    }

    /// Primeiro endereço da faixa
    #[inline]
    pub fn start(&self) -> PhysAddr {
        self.base
    }

    /// Primeiro endereço APÓS a faixa
    #[inline]
    pub fn end(&self) -> PhysAddr {
        self.base.add((self.pages.len() * PAGE_SIZE) as u64)
    }

    #[inline]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Índice do frame na faixa.
    ///
    /// `NotAligned` se o endereço não é múltiplo de página, `InvalidAddress`
    /// se está fora de `[start, end)`.
    pub fn frame_index(&self, frame: PhysFrame) -> MmResult<usize> {
        let addr = frame.start_address();
        if !addr.is_aligned(PAGE_SIZE as u64) {
            return Err(MmError::NotAligned);
        }
        if addr < self.start() || addr >= self.end() {
            return Err(MmError::InvalidAddress);
        }
        let offset = addr.offset_from(self.base).ok_or(MmError::InvalidAddress)?;
        Ok(offset as usize / PAGE_SIZE)
    }

    /// Frame de índice `index` (deve ser < page_count)
    #[inline]
    pub fn frame_at(&self, index: usize) -> PhysFrame {
        debug_assert!(index < self.pages.len());
        PhysFrame::from_start_address_unchecked(self.base.add((index * PAGE_SIZE) as u64))
    }

    /// Conteúdo da página.
    ///
    /// # Safety
    /// O chamador deve ser o dono do frame e não pode haver `page_mut`
    /// vivo para ele.
    pub unsafe fn page(&self, frame: PhysFrame) -> MmResult<&[u8; PAGE_SIZE]> {
        let index = self.frame_index(frame)?;
        Ok(&*self.pages[index].0.get())
    }

    /// Conteúdo mutável da página.
    ///
    /// # Safety
    /// O chamador deve ser o dono do frame e a única referência viva a ele.
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn page_mut(&self, frame: PhysFrame) -> MmResult<&mut [u8; PAGE_SIZE]> {
        let index = self.frame_index(frame)?;
        Ok(&mut *self.pages[index].0.get())
    }

    /// Preenche a página `index` com `byte`.
    ///
    /// # Safety
    /// Chamador tem posse exclusiva da página (recém-saída ou a caminho da
    /// free-list, sem nenhum lock de pool).
    pub(crate) unsafe fn fill(&self, index: usize, byte: u8) {
        (*self.pages[index].0.get()).fill(byte);
    }
}
