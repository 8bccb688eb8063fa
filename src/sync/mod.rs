//! # Synchronization Primitives
//!
//! Primitivas de sincronização para ambiente SMP.
//!
//! ## Hierarquia de Uso
//!
//! ```text
//! Spinlock   → Metadados (free-lists, arrays de shard). Não pode dormir
//! SleepLock  → Conteúdo de um buffer. Pode dormir, lembra o dono
//! RefCount   → Contagem de referências de buffers
//! ```
//!
//! ## Regras
//!
//! - **Spinlock**: nunca segurar através de I/O de disco
//! - **SleepLock**: nunca adquirir segurando um Spinlock
//! - **Ordem de Lock**: no máximo UM spinlock de pool/shard por vez

// =============================================================================
// PRIMITIVAS BÁSICAS
// =============================================================================

/// Spinlock (busy-wait, não dorme)
pub mod spinlock;

/// SleepLock (pode bloquear, rastreia dono)
pub mod sleeplock;

/// Contador de referências
pub mod refcount;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use refcount::RefCount;
pub use sleeplock::{SleepLock, SleepLockGuard};
pub use spinlock::{Spinlock, SpinlockGuard};
