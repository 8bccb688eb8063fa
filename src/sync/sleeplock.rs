//! SleepLock - lock bloqueante com dono

use super::spinlock::Spinlock;
use crate::arch::CpuOps;
use core::cell::UnsafeCell;
use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};

/// Estado interno protegido pelo spinlock do SleepLock
struct SleepState {
    locked: bool,
    /// Tarefa dona (0 = livre)
    owner: u64,
    /// Próxima senha a entregar
    next_ticket: u64,
    /// Senha com a vez
    serving: u64,
}

/// SleepLock - bloqueia a tarefa até o recurso ficar livre
///
/// # Diferença do Spinlock
///
/// - SleepLock PODE dormir (cede a CPU via `C::relax()`)
/// - Spinlock NÃO pode dormir (busy-wait)
/// - SleepLock lembra QUEM o segura, para checagens de contrato
/// - Espera em fila: cada tarefa pega uma senha e é servida em ordem de
///   chegada, então nenhuma espera para sempre
///
/// Protege o conteúdo de um único recurso (ex: o payload de um buffer).
/// Nunca adquirir segurando um Spinlock.
pub struct SleepLock<T, C: CpuOps> {
    name: &'static str,
    state: Spinlock<SleepState>,
    data: UnsafeCell<T>,
    _cpu: PhantomData<fn() -> C>,
}

// SAFETY: acesso a `data` só acontece através de um SleepLockGuard,
// e só existe um guard por vez (state.locked).
unsafe impl<T: Send, C: CpuOps> Send for SleepLock<T, C> {}
unsafe impl<T: Send, C: CpuOps> Sync for SleepLock<T, C> {}

impl<T, C: CpuOps> SleepLock<T, C> {
    pub const fn new(name: &'static str, data: T) -> Self {
        Self {
            name,
            state: Spinlock::new("sleeplock", SleepState {
                locked: false,
                owner: 0,
                next_ticket: 0,
                serving: 0,
            }),
            data: UnsafeCell::new(data),
            _cpu: PhantomData,
        }
    }

    /// Adquire o lock (pode bloquear)
    pub fn lock(&self) -> SleepLockGuard<'_, T, C> {
        let me = C::current_task_id();
        let ticket = {
            let mut state = self.state.lock();
            let ticket = state.next_ticket;
            state.next_ticket = ticket.wrapping_add(1);
            ticket
        };
        loop {
            {
                let mut state = self.state.lock();
                if !state.locked && state.serving == ticket {
                    state.locked = true;
                    state.owner = me;
                    break;
                }
            }
            // Spinlock já liberado aqui: dormir nunca segura metadados
            C::relax();
        }
        SleepLockGuard { lock: self }
    }

    /// Tenta adquirir sem bloquear (falha se houver fila)
    pub fn try_lock(&self) -> Option<SleepLockGuard<'_, T, C>> {
        let mut state = self.state.lock();
        if state.locked || state.next_ticket != state.serving {
            return None;
        }
        state.next_ticket = state.next_ticket.wrapping_add(1);
        state.locked = true;
        state.owner = C::current_task_id();
        Some(SleepLockGuard { lock: self })
    }

    /// A tarefa atual segura este lock?
    pub fn holding(&self) -> bool {
        let state = self.state.lock();
        state.locked && state.owner == C::current_task_id()
    }

    /// Alguém segura este lock?
    pub fn is_locked(&self) -> bool {
        self.state.lock().locked
    }

    /// Tarefas na fila, sem contar o dono
    pub fn waiters(&self) -> u64 {
        let state = self.state.lock();
        let queued = state.next_ticket.wrapping_sub(state.serving);
        queued - u64::from(state.locked)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn unlock(&self) {
        let mut state = self.state.lock();
        state.locked = false;
        state.owner = 0;
        state.serving = state.serving.wrapping_add(1);
    }
}

pub struct SleepLockGuard<'a, T, C: CpuOps> {
    lock: &'a SleepLock<T, C>,
}

impl<T, C: CpuOps> SleepLockGuard<'_, T, C> {
    /// A tarefa atual é a dona deste guard?
    ///
    /// Pode ser falso se o guard foi movido para outra tarefa.
    pub fn holding(&self) -> bool {
        self.lock.holding()
    }
}

impl<T, C: CpuOps> Deref for SleepLockGuard<'_, T, C> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: Lock está adquirido
        unsafe { &*self.lock.data.get() }
    }
}

impl<T, C: CpuOps> DerefMut for SleepLockGuard<'_, T, C> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: Lock está adquirido
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T, C: CpuOps> Drop for SleepLockGuard<'_, T, C> {
    fn drop(&mut self) {
        self.lock.unlock();
    }
}
