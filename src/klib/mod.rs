//! Kernel Library (KLib).
//!
//! Utilitários agnósticos de hardware para uso interno do núcleo.
//! Funciona como uma extensão da `core` library.

#[macro_use]
pub mod logging;
pub mod test_framework;

/// Alinha um endereço para cima.
///
/// # Exemplo
/// `align_up(10, 4) -> 12`
#[inline]
pub const fn align_up(addr: usize, align: usize) -> usize {
    (addr + align - 1) & !(align - 1)
}

/// Alinha um endereço para baixo.
#[inline]
pub const fn align_down(addr: usize, align: usize) -> usize {
    addr & !(align - 1)
}

/// Verifica se um endereço está alinhado.
#[inline]
pub const fn is_aligned(addr: usize, align: usize) -> bool {
    (addr & (align - 1)) == 0
}

/// Violação de contrato irrecuperável.
///
/// Loga a origem e o motivo em nível ERROR e entra em panic. Nos perfis do
/// kernel (`panic = "abort"`) isso é um halt; nos testes de host vira um
/// panic observável com `#[should_panic]`.
#[cold]
#[track_caller]
pub fn fatal(origin: &'static str, reason: &'static str) -> ! {
    kerror!("(FATAL) ");
    kerror!(origin);
    kerror!(reason);
    panic!("{}: {}", origin, reason);
}

/// A tarefa atual está desempilhando um panic?
///
/// Sem `std` não há unwind (`panic = "abort"`), então é sempre falso.
#[inline]
pub fn unwinding() -> bool {
    #[cfg(any(test, feature = "std"))]
    {
        std::thread::panicking()
    }
    #[cfg(not(any(test, feature = "std")))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_helpers() {
        assert_eq!(align_up(10, 4), 12);
        assert_eq!(align_up(4096, 4096), 4096);
        assert_eq!(align_down(4097, 4096), 4096);
        assert!(is_aligned(8192, 4096));
        assert!(!is_aligned(8193, 4096));
    }

    #[test]
    #[should_panic(expected = "kfree: endereço não alinhado")]
    fn test_fatal_panics_with_origin_and_reason() {
        fatal("kfree", "endereço não alinhado");
    }
}
