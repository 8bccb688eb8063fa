//! # Transferência de Disco
//!
//! Contrato mínimo que o buffer cache exige do driver de disco: preencher ou
//! despejar o payload de UM bloco, de forma síncrona.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              BUFFER CACHE (fs::bio)                 │
//! └─────────────────────────────────────────────────────┘
//!                          ↓
//! ┌─────────────────────────────────────────────────────┐
//! │              DiskTransfer Trait                     │
//! │   transfer(dev, blockno, data, write)              │
//! └─────────────────────────────────────────────────────┘
//!                          ↓
//! ┌─────────────────────────────────────────────────────┐
//! │          DRIVERS (VirtIO, RamDisk de teste)         │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! O cache nunca interpreta os bytes do payload. A transferência é
//! chamada com o SleepLock do buffer adquirido e SEM nenhum spinlock.

use crate::fs::bio::config::BSIZE;
use crate::sync::Spinlock;
use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use core::sync::atomic::{AtomicUsize, Ordering};

/// Primitiva de transferência de bloco
pub trait DiskTransfer: Send + Sync {
    /// Lê (`write == false`) ou escreve (`write == true`) o bloco
    /// `blockno` do dispositivo `dev` usando `data` (BSIZE bytes).
    ///
    /// Síncrona: retorna apenas quando a transferência terminou.
    fn transfer(&self, dev: u32, blockno: u32, data: &mut [u8], write: bool);
}

// =============================================================================
// RAMDISK
// =============================================================================

/// Disco em memória.
///
/// Blocos nunca escritos são lidos como zeros. Conta leituras e escritas
/// para que testes verifiquem "no máximo uma transferência".
pub struct RamDisk {
    blocks: Spinlock<BTreeMap<(u32, u32), Box<[u8; BSIZE]>>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl RamDisk {
    pub const fn new() -> Self {
        Self {
            blocks: Spinlock::new("ramdisk", BTreeMap::new()),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    /// Total de leituras servidas
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    /// Total de escritas recebidas
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    /// Copia o conteúdo atual de um bloco (zeros se nunca escrito).
    pub fn snapshot(&self, dev: u32, blockno: u32) -> [u8; BSIZE] {
        match self.blocks.lock().get(&(dev, blockno)) {
            Some(block) => **block,
            None => [0u8; BSIZE],
        }
    }

    /// Grava um bloco diretamente, sem contar como escrita.
    pub fn preload(&self, dev: u32, blockno: u32, data: &[u8; BSIZE]) {
        self.blocks.lock().insert((dev, blockno), Box::new(*data));
    }
}

impl Default for RamDisk {
    fn default() -> Self {
        Self::new()
    }
}

impl DiskTransfer for RamDisk {
    fn transfer(&self, dev: u32, blockno: u32, data: &mut [u8], write: bool) {
        let len = data.len().min(BSIZE);
        let mut blocks = self.blocks.lock();
        if write {
            let block = blocks
                .entry((dev, blockno))
                .or_insert_with(|| Box::new([0u8; BSIZE]));
            block[..len].copy_from_slice(&data[..len]);
            self.writes.fetch_add(1, Ordering::Relaxed);
        } else {
            match blocks.get(&(dev, blockno)) {
                Some(block) => data[..len].copy_from_slice(&block[..len]),
                None => data[..len].fill(0),
            }
            self.reads.fetch_add(1, Ordering::Relaxed);
        }
    }
}
