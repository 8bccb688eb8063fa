//! # Configuração do Buffer Cache

use super::error::{BioError, BioResult};

/// Tamanho de um bloco de disco (e do payload de um buffer)
pub const BSIZE: usize = 1024;

/// Número padrão de buffers
pub const NBUF: usize = 30;

/// Número padrão de shards (primo, espalha `dev ^ blockno`)
pub const NHASH: usize = 29;

/// Geometria do cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BcacheConfig {
    /// Total de buffers (fixo por toda a vida do cache)
    pub nbuf: usize,
    /// Número de shards
    pub nshard: usize,
}

impl BcacheConfig {
    pub const fn new(nbuf: usize, nshard: usize) -> Self {
        Self { nbuf, nshard }
    }

    pub fn validate(&self) -> BioResult<()> {
        if self.nbuf == 0 || self.nshard == 0 {
            return Err(BioError::InvalidConfig);
        }
        Ok(())
    }

    /// Buffers que o shard `shard` recebe no boot.
    ///
    /// Shards abaixo de `nbuf % nshard` levam um buffer a mais.
    pub const fn initial_len(&self, shard: usize) -> usize {
        let base = self.nbuf / self.nshard;
        if shard < self.nbuf % self.nshard {
            base + 1
        } else {
            base
        }
    }
}

impl Default for BcacheConfig {
    fn default() -> Self {
        Self::new(NBUF, NHASH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_partition() {
        let cfg = BcacheConfig::default();
        assert_eq!(cfg.initial_len(0), 2);
        assert_eq!(cfg.initial_len(1), 1);
        assert_eq!(cfg.initial_len(28), 1);
        let total: usize = (0..cfg.nshard).map(|s| cfg.initial_len(s)).sum();
        assert_eq!(total, NBUF);

        let small = BcacheConfig::new(3, 5);
        assert_eq!(small.initial_len(2), 1);
        assert_eq!(small.initial_len(3), 0);
    }

    #[test]
    fn test_validate() {
        assert!(BcacheConfig::default().validate().is_ok());
        assert_eq!(BcacheConfig::new(0, 1).validate(), Err(BioError::InvalidConfig));
        assert_eq!(BcacheConfig::new(1, 0).validate(), Err(BioError::InvalidConfig));
    }
}
