//! Tipos de Erro do Subsistema de Memória
//!
//! Define erros estruturados para diagnóstico preciso de falhas em MM.

/// Erros do subsistema de memória
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MmError {
    /// Nenhum pool tem página livre (recuperável)
    OutOfMemory,
    /// Endereço não alinhado a página
    NotAligned,
    /// Endereço fora da faixa gerenciável
    InvalidAddress,
    /// Parâmetro inválido
    InvalidParameter,
    /// Tamanho inválido (zero ou muito grande)
    InvalidSize,
    /// Double free detectado
    DoubleFree,
    /// Referência adicionada a uma página livre
    NotAllocated,
    /// Contagem de referências abaixo de zero
    RefCountUnderflow,
    /// Contagem de referências saturada
    RefCountOverflow,
}

impl MmError {
    /// Retorna descrição legível do erro
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OutOfMemory => "OOM: sem páginas livres em nenhum pool",
            Self::NotAligned => "Endereço não alinhado a página",
            Self::InvalidAddress => "Endereço fora da faixa gerenciável",
            Self::InvalidParameter => "Parâmetro inválido",
            Self::InvalidSize => "Tamanho inválido",
            Self::DoubleFree => "Double free detectado",
            Self::NotAllocated => "Página não alocada",
            Self::RefCountUnderflow => "Refcount abaixo de zero",
            Self::RefCountOverflow => "Refcount saturado",
        }
    }

    /// O chamador pode se recuperar deste erro?
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::OutOfMemory)
    }
}

impl core::fmt::Display for MmError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tipo Result específico para operações de memória
pub type MmResult<T> = Result<T, MmError>;
