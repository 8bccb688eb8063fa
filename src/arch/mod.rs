//! # Hardware Abstraction Layer (HAL)
//!
//! Ponte entre o núcleo de recursos e o processador.
//!
//! O alocador de páginas precisa saber "qual pool é o local" e o buffer cache
//! precisa saber "quem segura este SleepLock". Ambos perguntam aqui, via
//! [`CpuOps`], e nunca ao hardware diretamente.
//!
//! ## Regra de estabilidade
//!
//! O ID do core só vale enquanto a migração estiver desabilitada. Por isso o
//! alocador captura o core UMA vez por operação através de [`PreemptGuard`]
//! e nunca o relê no meio da seção crítica.

pub mod traits;

#[cfg(any(test, feature = "std"))]
pub mod hosted;

pub use traits::CpuOps;

use core::marker::PhantomData;

/// Desabilita migração durante seu tempo de vida e fixa o core atual.
///
/// Equivalente ao par `push_off()`/`pop_off()` em volta de `cpuid()`.
pub struct PreemptGuard<C: CpuOps> {
    core: usize,
    _cpu: PhantomData<fn() -> C>,
}

impl<C: CpuOps> PreemptGuard<C> {
    /// Desabilita migração e captura o core atual
    #[inline]
    pub fn new() -> Self {
        C::push_off();
        Self {
            core: C::current_core_id(),
            _cpu: PhantomData,
        }
    }

    /// Core capturado na criação do guard
    #[inline]
    pub fn core(&self) -> usize {
        self.core
    }
}

impl<C: CpuOps> Default for PreemptGuard<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: CpuOps> Drop for PreemptGuard<C> {
    fn drop(&mut self) {
        C::pop_off();
    }
}
