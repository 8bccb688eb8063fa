//! # Free-list Indexada
//!
//! Cada pool guarda apenas a cabeça da lista e o tamanho; o encadeamento
//! ("próximo livre") vive numa tabela compartilhada indexada pelo índice do
//! frame. Como uma página é membro de no máximo UMA lista por vez, cada
//! entrada da tabela só é escrita por quem segura o lock da lista que
//! contém a página (ou pelo dono exclusivo da página, antes do push).
//!
//! Push e pop são O(1).

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Fim de lista
pub const NIL: u32 = u32::MAX;

/// Encadeamento e estado livre/ocupado de todos os frames
pub struct FrameLinks {
    next: Box<[AtomicU32]>,
    free: Box<[AtomicBool]>,
}

impl FrameLinks {
    /// Tabela para `count` frames, todos ocupados
    pub fn new(count: usize) -> Self {
        let mut next = Vec::with_capacity(count);
        next.resize_with(count, || AtomicU32::new(NIL));
        let mut free = Vec::with_capacity(count);
        free.resize_with(count, || AtomicBool::new(false));
        Self {
            next: next.into_boxed_slice(),
            free: free.into_boxed_slice(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.next.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.next.is_empty()
    }

    /// Marca o frame como livre. Retorna `false` se já estava livre
    /// (double free).
    #[inline]
    pub fn mark_free(&self, index: usize) -> bool {
        !self.free[index].swap(true, Ordering::AcqRel)
    }

    /// O frame está em alguma free-list?
    #[inline]
    pub fn is_free(&self, index: usize) -> bool {
        self.free[index].load(Ordering::Acquire)
    }

    #[inline]
    fn next(&self, index: usize) -> u32 {
        self.next[index].load(Ordering::Relaxed)
    }

    #[inline]
    fn set_next(&self, index: usize, next: u32) {
        self.next[index].store(next, Ordering::Relaxed);
    }
}

/// Pilha LIFO de frames livres de um pool
#[derive(Debug)]
pub struct FreeList {
    head: u32,
    len: usize,
}

impl FreeList {
    pub const fn new() -> Self {
        Self { head: NIL, len: 0 }
    }

    /// Empilha `index`
    #[inline]
    pub fn push(&mut self, links: &FrameLinks, index: usize) {
        links.set_next(index, self.head);
        self.head = index as u32;
        self.len += 1;
    }

    /// Desempilha o frame do topo, marcando-o como ocupado
    #[inline]
    pub fn pop(&mut self, links: &FrameLinks) -> Option<usize> {
        if self.head == NIL {
            return None;
        }
        let index = self.head as usize;
        self.head = links.next(index);
        links.set_next(index, NIL);
        links.free[index].store(false, Ordering::Release);
        self.len -= 1;
        Some(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head == NIL
    }
}

impl Default for FreeList {
    fn default() -> Self {
        Self::new()
    }
}
