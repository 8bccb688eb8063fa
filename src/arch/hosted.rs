//! CPU hospedada (host / testes).
//!
//! Cada thread do host faz o papel de uma tarefa do kernel. O "core" em que
//! ela roda é escolhido explicitamente com [`HostCpu::bind_core`]; por padrão
//! toda thread nasce no core 0 (o core de boot).

use super::CpuOps;
use core::cell::Cell;
use core::sync::atomic::{AtomicU64, Ordering};

/// Próximo ID de tarefa (0 = sem dono)
static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

std::thread_local! {
    static CORE_ID: Cell<usize> = const { Cell::new(0) };
    static PREEMPT_DEPTH: Cell<usize> = const { Cell::new(0) };
    static TASK_ID: Cell<u64> = const { Cell::new(0) };
}

/// Implementação de [`CpuOps`] baseada em thread-locals.
pub struct HostCpu;

impl HostCpu {
    /// Migra a thread atual para `core`.
    ///
    /// Migrar com preempção desabilitada é um bug do chamador.
    pub fn bind_core(core: usize) {
        if Self::preempt_depth() != 0 {
            panic!("(HOST) migração com preempção desabilitada");
        }
        CORE_ID.with(|c| c.set(core));
    }

    /// Profundidade atual de `push_off`
    pub fn preempt_depth() -> usize {
        PREEMPT_DEPTH.with(Cell::get)
    }
}

impl CpuOps for HostCpu {
    fn current_core_id() -> usize {
        CORE_ID.with(Cell::get)
    }

    fn current_task_id() -> u64 {
        TASK_ID.with(|t| {
            if t.get() == 0 {
                t.set(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed));
            }
            t.get()
        })
    }

    fn push_off() {
        PREEMPT_DEPTH.with(|d| d.set(d.get() + 1));
    }

    fn pop_off() {
        PREEMPT_DEPTH.with(|d| {
            let depth = d.get();
            if depth == 0 {
                panic!("(HOST) pop_off sem push_off");
            }
            d.set(depth - 1);
        });
    }

    fn relax() {
        std::thread::yield_now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::PreemptGuard;

    #[test]
    fn test_guard_captures_core_and_nests() {
        HostCpu::bind_core(3);
        {
            let outer = PreemptGuard::<HostCpu>::new();
            let inner = PreemptGuard::<HostCpu>::new();
            assert_eq!(outer.core(), 3);
            assert_eq!(inner.core(), 3);
            assert_eq!(HostCpu::preempt_depth(), 2);
        }
        assert_eq!(HostCpu::preempt_depth(), 0);
    }

    #[test]
    #[should_panic(expected = "migração")]
    fn test_bind_while_pinned_is_fatal() {
        let _guard = PreemptGuard::<HostCpu>::new();
        HostCpu::bind_core(1);
    }

    #[test]
    fn test_task_ids_differ_between_threads() {
        let here = HostCpu::current_task_id();
        let there = std::thread::spawn(HostCpu::current_task_id)
            .join()
            .unwrap();
        assert_ne!(here, 0);
        assert_ne!(here, there);
        assert_eq!(here, HostCpu::current_task_id());
    }
}
