//! # Configuração do Módulo de Memória
//!
//! Constantes do alocador de páginas e a configuração de runtime do contexto
//! per-CPU.

use super::error::{MmError, MmResult};

// =============================================================================
// CONSTANTES DE TAMANHO
// =============================================================================

/// Tamanho de uma página (4 KiB)
pub const PAGE_SIZE: usize = 4096;

/// Máscara para alinhar endereços a página
pub const PAGE_MASK: usize = !(PAGE_SIZE - 1);

// =============================================================================
// CONFIGURAÇÃO SMP
// =============================================================================

/// Número padrão de processores (um pool por processor)
pub const NCPU: usize = 8;

/// Número máximo de CPUs suportadas
pub const MAX_CPUS: usize = 64;

/// Páginas movidas por roubo bem-sucedido
pub const STEAL_BATCH: usize = 1;

// =============================================================================
// PADRÕES SENTINELA
// =============================================================================
//
// Preenchem a página para que uso de conteúdo velho/não inicializado
// apareça nos testes.

/// Byte gravado em toda página entregue por `kalloc`
pub const ALLOC_JUNK: u8 = 0x05;

/// Byte gravado em toda página devolvida por `kfree`
pub const FREE_JUNK: u8 = 0x01;

// =============================================================================
// CONFIGURAÇÃO DE RUNTIME
// =============================================================================

/// Parâmetros do alocador per-CPU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KallocConfig {
    /// Número de pools (um por processador)
    pub ncpu: usize,
    /// Páginas tiradas da vítima em cada roubo (>= 1)
    pub steal_batch: usize,
}

impl KallocConfig {
    pub const fn new(ncpu: usize, steal_batch: usize) -> Self {
        Self { ncpu, steal_batch }
    }

    /// Valida os limites
    pub fn validate(&self) -> MmResult<()> {
        if self.ncpu == 0 || self.ncpu > MAX_CPUS {
            return Err(MmError::InvalidParameter);
        }
        if self.steal_batch == 0 {
            return Err(MmError::InvalidParameter);
        }
        Ok(())
    }
}

impl Default for KallocConfig {
    fn default() -> Self {
        Self::new(NCPU, STEAL_BATCH)
    }
}
