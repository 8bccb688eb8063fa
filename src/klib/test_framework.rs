//! Framework de testes do kernel
//!
//! Suítes de autoteste rodam no boot (feature `self_test`) e também a partir
//! de testes de host, para não apodrecerem.

/// Resultado de teste
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestResult {
    Passed,
    Failed,
    Skipped,
}

/// Um caso de teste
pub struct TestCase {
    pub name: &'static str,
    pub func: fn() -> TestResult,
}

impl TestCase {
    pub const fn new(name: &'static str, func: fn() -> TestResult) -> Self {
        Self { name, func }
    }
}

/// Resumo de uma suíte executada
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuiteSummary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl SuiteSummary {
    /// Nenhum caso falhou
    pub fn ok(&self) -> bool {
        self.failed == 0
    }
}

/// Executa suite de testes
pub fn run_test_suite(name: &'static str, tests: &[TestCase]) -> SuiteSummary {
    crate::kinfo!("=== Executando suite:");
    crate::kinfo!(name);

    let mut summary = SuiteSummary::default();

    for test in tests {
        match (test.func)() {
            TestResult::Passed => {
                crate::kok!(test.name);
                summary.passed += 1;
            }
            TestResult::Failed => {
                crate::kfail!(test.name);
                summary.failed += 1;
            }
            TestResult::Skipped => {
                crate::kwarn!(test.name);
                summary.skipped += 1;
            }
        }
    }

    crate::kinfo!("Resultados: passed=", summary.passed);
    if summary.failed > 0 {
        crate::kerror!("Resultados: failed=", summary.failed);
    }
    summary
}
