//! # Testes do Subsistema de Memória
//!
//! Suítes de autoteste que rodam no boot (feature `self_test`):
//! - `kalloc_test.rs` - Pools por CPU
//! - `cow_test.rs`    - Variante com contagem de referências
//!
//! Cada caso monta a própria faixa de páginas; nada toca o alocador do
//! kernel em uso.


use crate::arch::CpuOps;
use crate::klib::test_framework::{run_test_suite, SuiteSummary};

/// Executa todas as suítes de memória
pub fn run_memory_tests<C: CpuOps>() -> SuiteSummary {
    crate::kinfo!("╔════════════════════════════════════════╗");
    crate::kinfo!("║     🧪 TESTES DE MEMÓRIA               ║");
    crate::kinfo!("╚════════════════════════════════════════╝");

    let a = run_test_suite("kalloc", &kalloc_test::cases::<C>());
    let b = run_test_suite("cow", &cow_test::CASES);

    SuiteSummary {
        passed: a.passed + b.passed,
        failed: a.failed + b.failed,
        skipped: a.skipped + b.skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::hosted::HostCpu;

    #[test]
    fn test_memory_self_tests_pass() {
        HostCpu::bind_core(0);
        let summary = run_memory_tests::<HostCpu>();
        assert!(summary.ok(), "{:?}", summary);
        assert_eq!(summary.passed, 7);
    }
}
