//! # Alocadores de Página
//!
//! | Variante   | Arquivo     | Pools |
//! |------------|-------------|-------|
//! | `Kalloc`   | `percpu.rs` | Um por CPU, roubo entre pools |
//! | `CowKalloc`| `cow.rs`    | Global + tabela de refcount |

pub mod cow;
pub mod percpu;
pub mod traits;

pub use cow::CowKalloc;
pub use percpu::Kalloc;
pub use traits::{PageAllocator, SharedPageAllocator};
