//! # Physical Memory (PMM)
//!
//! Blocos de base dos alocadores de página:
//!
//! - `frame`   : `PhysFrame`, unidade de alocação (4 KiB)
//! - `memory`  : `PhysMemory`, a faixa gerenciável
//! - `freelist`: free-list indexada com encadeamento compartilhado
//! - `stats`   : contadores por pool

pub mod frame;
pub mod freelist;
pub mod memory;
pub mod stats;

pub use frame::PhysFrame;
pub use freelist::{FrameLinks, FreeList};
pub use memory::PhysMemory;
pub use stats::{PoolStats, PoolStatsSnapshot};
