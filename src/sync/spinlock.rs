//! Spinlock - bloqueio com busy-wait para metadados

use spin::{Mutex, MutexGuard};

/// Guard do spinlock - libera ao sair do escopo
pub type SpinlockGuard<'a, T> = MutexGuard<'a, T>;

/// Spinlock - usa busy-wait, NÃO pode dormir
///
/// # Quando usar
///
/// - Cabeça de free-list de um pool de páginas
/// - Array de slots de um shard do buffer cache
/// - Qualquer seção crítica limitada (scan de array, push/pop)
///
/// # Quando NÃO usar
///
/// - Em volta de I/O de disco
/// - Enquanto espera um [`SleepLock`](super::SleepLock)
/// - Segurando outro Spinlock do mesmo nível (roubo pega um lock por vez)
pub struct Spinlock<T> {
    name: &'static str,
    inner: Mutex<T>,
}

impl<T> Spinlock<T> {
    /// Cria novo spinlock
    pub const fn new(name: &'static str, data: T) -> Self {
        Self {
            name,
            inner: Mutex::new(data),
        }
    }

    /// Adquire o lock
    #[inline]
    pub fn lock(&self) -> SpinlockGuard<'_, T> {
        self.inner.lock()
    }

    /// Tenta adquirir sem bloquear
    #[inline]
    pub fn try_lock(&self) -> Option<SpinlockGuard<'_, T>> {
        self.inner.try_lock()
    }

    /// Indica se alguém segura o lock agora (apenas diagnóstico)
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }

    /// Nome dado na criação
    pub fn name(&self) -> &'static str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinlock_basic() {
        let lock = Spinlock::new("test", 42);
        {
            let mut guard = lock.lock();
            assert_eq!(*guard, 42);
            assert!(lock.is_locked());
            assert!(lock.try_lock().is_none());
            *guard = 43;
        }
        assert!(!lock.is_locked());
        assert_eq!(*lock.lock(), 43);
        assert_eq!(lock.name(), "test");
    }

    #[test]
    fn test_spinlock_counts_across_threads() {
        let lock = Spinlock::new("counter", 0usize);
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..1000 {
                        *lock.lock() += 1;
                    }
                });
            }
        });
        assert_eq!(*lock.lock(), 4000);
    }
}
