//! # Memory Management Subsystem (MM)
//!
//! Alocação de páginas físicas para o resto do kernel: setup de memória
//! virtual, pilhas de processo, buffers de pipe.
//!
//! ## 🏗️ Arquitetura dos Módulos
//!
//! | Módulo   | Responsabilidade |
//! |----------|------------------|
//! | `pmm`    | Frames, faixa gerenciável, free-list indexada, contadores |
//! | `alloc`  | `Kalloc` (pools por CPU + roubo) e `CowKalloc` (refcount) |
//! | `addr`   | `PhysAddr` |
//! | `config` | Constantes e `KallocConfig` |
//! | `error`  | `MmError` / `MmResult` |
//!
//! ## Regras de concorrência
//!
//! - Lock de pool só durante manipulação da lista; nunca através de
//!   chamada bloqueante. O alocador inteiro é não-bloqueante.
//! - O pool local é escolhido UMA vez por operação, com migração
//!   desabilitada (`PreemptGuard`).
//! - Roubo segura no máximo um lock de pool por vez.
//! - Falta de memória é recuperável (`OutOfMemory`). Violação de contrato
//!   (`kfree` inválido, refcount abaixo de zero) é fatal.

pub mod addr;
pub mod alloc;
pub mod config;
pub mod error;
pub mod pmm;

#[cfg(any(test, feature = "self_test"))]
pub mod test;

pub use addr::PhysAddr;
pub use config::{KallocConfig, PAGE_SIZE};
pub use error::{MmError, MmResult};
pub use pmm::{PhysFrame, PhysMemory};
