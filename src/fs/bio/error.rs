//! Tipos de Erro do Buffer Cache

/// Erros do buffer cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BioError {
    /// Nenhum buffer ocioso em nenhum shard
    NoBuffers,
    /// Operação exige o SleepLock do buffer
    NotHolder,
    /// Refcount abaixo de zero
    RefCountUnderflow,
    /// Geometria inválida
    InvalidConfig,
}

impl BioError {
    /// Retorna descrição legível do erro
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoBuffers => "sem buffers livres",
            Self::NotHolder => "buffer não está travado pela tarefa atual",
            Self::RefCountUnderflow => "refcount do buffer abaixo de zero",
            Self::InvalidConfig => "configuração do cache inválida",
        }
    }
}

impl core::fmt::Display for BioError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tipo Result específico do buffer cache
pub type BioResult<T> = Result<T, BioError>;
