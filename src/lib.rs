//! Forge KCore.
//!
//! Os dois gerenciadores de recursos concorrentes que o resto do kernel
//! consome: o alocador de páginas físicas e o buffer cache de blocos.
//!
//! ```text
//! ┌──────────────────────────────┐   ┌──────────────────────────────┐
//! │  mm::alloc::Kalloc           │   │  fs::bio::BufferCache        │
//! │  pools por CPU + roubo       │   │  shards por hash + roubo     │
//! │  mm::alloc::CowKalloc        │   │  SleepLock por buffer        │
//! │  pool global + refcount      │   │                              │
//! └──────────────┬───────────────┘   └──────────────┬───────────────┘
//!                │ Spinlock (metadados)             │ DiskTransfer
//!                ▼                                  ▼
//!        mm::pmm::PhysMemory                  drivers::disk
//! ```
//!
//! Colaboradores externos entram por traits estreitas: identidade da CPU
//! (`arch::CpuOps`) e transferência de disco (`drivers::disk::DiskTransfer`).

#![no_std]

// Habilitar alocação dinâmica (arena de páginas, slots de buffer)
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

// --- Utilitários e logging (macros precisam vir primeiro) ---
#[macro_use]
pub mod klib;

// --- Colaboradores externos ---
pub mod arch;
pub mod drivers;

// --- Primitivas de sincronização ---
pub mod sync;

// --- Subsistemas ---
pub mod fs;
pub mod mm;

pub use arch::{CpuOps, PreemptGuard};
pub use drivers::disk::DiskTransfer;
pub use fs::bio::{BcacheConfig, BioError, BufGuard, BufId, BufferCache};
pub use mm::alloc::{CowKalloc, Kalloc, PageAllocator, SharedPageAllocator};
pub use mm::{KallocConfig, MmError, MmResult, PhysAddr, PhysFrame, PhysMemory};
