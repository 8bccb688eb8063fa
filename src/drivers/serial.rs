// =============================================================================
// SERIAL - CAMADA DE EMISSÃO DE LOG
// =============================================================================
//
// Ponto único por onde passam TODOS os bytes de log do núcleo.
//
// ARQUITETURA:
// - SEM core::fmt - Apenas strings literais e valores imediatos
// - SEM alocação - Formatação numérica em buffer de stack
// - O destino real é um `SerialSink` instalado uma única vez no boot
//   (UART no hardware, stderr no host, buffer de captura em testes)
// - Sem sink instalado, toda emissão é descartada
//
// FUNÇÕES DISPONÍVEIS:
// - emit(byte)       : Envia um byte
// - emit_str(s)      : Envia string literal
// - emit_hex(v)      : Envia u64 em hexadecimal
// - emit_dec(v)      : Envia usize em decimal
// - emit_nl()        : Envia newline (\r\n)
//
// NOTA IMPORTANTE:
// Esta camada NÃO garante exclusão mútua entre CPUs. Em ambiente SMP,
// os logs podem se intercalar. Isso é aceitável para debugging.
//
// =============================================================================

use spin::Once;

/// Destino final dos bytes de log.
pub trait SerialSink: Sync {
    fn write_bytes(&self, bytes: &[u8]);
}

static SINK: Once<&'static dyn SerialSink> = Once::new();

// =============================================================================
// FUNÇÕES DE INICIALIZAÇÃO
// =============================================================================

/// Instala o destino dos logs.
///
/// Só a primeira chamada tem efeito. Retorna `true` se `sink` foi o
/// instalado.
pub fn install(sink: &'static dyn SerialSink) -> bool {
    let mut installed = false;
    SINK.call_once(|| {
        installed = true;
        sink
    });
    installed
}

/// Há um destino instalado?
#[inline]
pub fn is_installed() -> bool {
    SINK.is_completed()
}

// =============================================================================
// FUNÇÕES DE ESCRITA - CORE
// =============================================================================

#[inline]
fn write(bytes: &[u8]) {
    if let Some(sink) = SINK.get() {
        sink.write_bytes(bytes);
    }
}

/// Envia um único byte.
#[inline]
pub fn emit(byte: u8) {
    write(&[byte]);
}

/// Envia uma string.
#[inline(never)]
pub fn emit_str(s: &str) {
    write(s.as_bytes());
}

/// Envia uma nova linha (CRLF).
#[inline(never)]
pub fn emit_nl() {
    write(b"\r\n");
}

// =============================================================================
// FUNÇÕES DE ESCRITA - FORMATAÇÃO NUMÉRICA
// =============================================================================

/// Envia um valor u64 em formato hexadecimal.
///
/// Formato de saída: 0x0123456789ABCDEF (sempre 18 caracteres)
#[inline(never)]
pub fn emit_hex(value: u64) {
    write(&format_hex(value));
}

/// Envia um valor usize em formato decimal.
///
/// Útil para contadores e índices.
#[inline(never)]
pub fn emit_dec(value: usize) {
    let mut buf = [0u8; 20];
    let start = format_dec(value, &mut buf);
    write(&buf[start..]);
}

// =============================================================================
// FUNÇÕES AUXILIARES
// =============================================================================

/// Converte nibble (0-15) para caractere ASCII ('0'-'9', 'A'-'F').
#[inline(always)]
const fn nibble_to_ascii(n: u8) -> u8 {
    if n < 10 {
        b'0' + n
    } else {
        b'A' + (n - 10)
    }
}

fn format_hex(value: u64) -> [u8; 18] {
    let mut out = [0u8; 18];
    out[0] = b'0';
    out[1] = b'x';
    for i in 0..16 {
        let shift = 60 - i * 4;
        out[2 + i] = nibble_to_ascii(((value >> shift) & 0xF) as u8);
    }
    out
}

/// Escreve `value` no fim de `buf`; retorna o índice do primeiro dígito.
fn format_dec(mut value: usize, buf: &mut [u8; 20]) -> usize {
    let mut pos = buf.len();
    if value == 0 {
        pos -= 1;
        buf[pos] = b'0';
        return pos;
    }
    while value > 0 {
        pos -= 1;
        buf[pos] = b'0' + (value % 10) as u8;
        value /= 10;
    }
    pos
}

// =============================================================================
// SINKS DE HOST
// =============================================================================

/// Sink que escreve em stderr (apenas host).
#[cfg(feature = "std")]
pub struct StderrSink;

#[cfg(feature = "std")]
impl SerialSink for StderrSink {
    fn write_bytes(&self, bytes: &[u8]) {
        use std::io::Write;
        let _ = std::io::stderr().write_all(bytes);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::sync::Spinlock;
    use alloc::vec::Vec;

    /// Sink de captura compartilhado por todos os testes do crate.
    pub(crate) struct CaptureSink {
        buf: Spinlock<Vec<u8>>,
    }

    impl SerialSink for CaptureSink {
        fn write_bytes(&self, bytes: &[u8]) {
            self.buf.lock().extend_from_slice(bytes);
        }
    }

    pub(crate) static CAPTURE: CaptureSink = CaptureSink {
        buf: Spinlock::new("capture", Vec::new()),
    };

    /// Instala o sink de captura (idempotente).
    pub(crate) fn capture() -> &'static CaptureSink {
        install(&CAPTURE);
        &CAPTURE
    }

    impl CaptureSink {
        pub(crate) fn contains(&self, needle: &str) -> bool {
            let buf = self.buf.lock();
            buf.windows(needle.len()).any(|w| w == needle.as_bytes())
        }
    }

    #[test]
    fn test_hex_format() {
        assert_eq!(&format_hex(0x1000), b"0x0000000000001000");
        assert_eq!(&format_hex(u64::MAX), b"0xFFFFFFFFFFFFFFFF");
    }

    #[test]
    fn test_dec_format() {
        let mut buf = [0u8; 20];
        let start = format_dec(0, &mut buf);
        assert_eq!(&buf[start..], b"0");
        let start = format_dec(4096, &mut buf);
        assert_eq!(&buf[start..], b"4096");
    }

    #[test]
    fn test_emit_reaches_installed_sink() {
        let sink = capture();
        assert!(is_installed());
        emit_str("(SERIAL) marcador-unico-7f3a ");
        emit_hex(0xBEEF_0000_7F3A);
        emit_nl();
        assert!(sink.contains("(SERIAL) marcador-unico-7f3a "));
        assert!(sink.contains("0x0000BEEF00007F3A"));
    }
}
