use crate::mm::addr::PhysAddr;
use crate::mm::config::PAGE_SIZE;
use crate::mm::error::{MmError, MmResult};
use core::fmt;

/// Um frame de memória física (tamanho fixo PAGE_SIZE = 4KiB)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PhysFrame {
    start_address: PhysAddr,
}

impl PhysFrame {
    /// Retorna o frame que contém o endereço físico dado
    #[inline]
    pub const fn containing_address(addr: PhysAddr) -> Self {
        Self {
            start_address: addr.align_down(PAGE_SIZE as u64),
        }
    }

    /// Cria um frame a partir de um endereço que deve estar alinhado
    #[inline]
    pub const fn from_start_address(addr: PhysAddr) -> MmResult<Self> {
        if !addr.is_aligned(PAGE_SIZE as u64) {
            return Err(MmError::NotAligned);
        }
        Ok(Self {
            start_address: addr,
        })
    }

    /// Cria um frame sem checar alinhamento.
    ///
    /// Serve para entregar endereços arbitrários ao `kfree`, que faz a
    /// validação ele mesmo.
    #[inline]
    pub const fn from_start_address_unchecked(addr: PhysAddr) -> Self {
        Self {
            start_address: addr,
        }
    }

    /// Retorna o endereço inicial do frame
    #[inline]
    pub const fn start_address(&self) -> PhysAddr {
        self.start_address
    }

    /// Adiciona offset de N frames
    #[inline]
    pub const fn add(&self, count: u64) -> Self {
        Self {
            start_address: self.start_address.add(count * PAGE_SIZE as u64),
        }
    }

    /// Retorna o endereço físico como u64
    #[inline]
    pub const fn addr(&self) -> u64 {
        self.start_address.as_u64()
    }
}

impl fmt::Debug for PhysFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysFrame({:?})", self.start_address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_start_address_checks_alignment() {
        assert!(PhysFrame::from_start_address(PhysAddr::new(0x2000)).is_ok());
        assert_eq!(
            PhysFrame::from_start_address(PhysAddr::new(0x2001)),
            Err(MmError::NotAligned)
        );
        let f = PhysFrame::containing_address(PhysAddr::new(0x2fff));
        assert_eq!(f.addr(), 0x2000);
        assert_eq!(f.add(2).addr(), 0x4000);
    }
}
