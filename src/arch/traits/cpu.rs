//! Interface Abstrata de CPU (HAL).
//! Define o que o núcleo de recursos precisa saber sobre o processador atual.

/// Operações de CPU consumidas pelo alocador e pelo buffer cache.
///
/// A implementação concreta pertence à arquitetura (ou ao host, nos testes).
/// Todas as funções são associadas (sem `self`): existe exatamente uma CPU
/// "atual" por contexto de execução.
pub trait CpuOps {
    /// Retorna o ID do core atual (índice do pool local).
    ///
    /// Só é estável enquanto a migração estiver desabilitada
    /// (entre `push_off` e `pop_off`).
    fn current_core_id() -> usize;

    /// Retorna a identidade da tarefa atual (dona de SleepLocks).
    fn current_task_id() -> u64;

    /// Desabilita migração/interrupções. Aninhável.
    fn push_off();

    /// Desfaz um `push_off`. Reabilita quando o aninhamento chega a zero.
    fn pop_off();

    /// Cede a CPU enquanto espera um recurso bloqueante.
    #[inline]
    fn relax() {
        core::hint::spin_loop();
    }
}
