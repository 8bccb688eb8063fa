// =============================================================================
// KERNEL LOGGING SYSTEM - ZERO OVERHEAD
// =============================================================================
//
// Logging do núcleo de recursos com custo ZERO em release.
//
// ARQUITETURA:
// - Usa features do Cargo para filtragem em tempo de compilação
// - Com feature "no_logs", TODOS os macros viram expressões vazias
// - SEM core::fmt - Apenas strings literais e valores hex
// - SEM alocação
// - Escreve APENAS via drivers::serial
//
// NÍVEIS DE LOG (do mais crítico ao menos):
// - ERROR: Violações de contrato fatais (logo antes do panic)
// - WARN:  Situações suspeitas mas recuperáveis (OOM, sem buffers)
// - INFO:  Inicialização de pools e do cache
// - DEBUG: Distribuição de buffers por shard
// - TRACE: Cada roubo de página/buffer
//
// COMO USAR:
//   kinfo!("(KALLOC) Inicializando...");        // Apenas string
//   kinfo!("(KALLOC) Paginas=", npages);        // String + hex
//   klog!("dev=", dev, " blockno=", blockno);   // Múltiplos valores
//
// =============================================================================

use crate::drivers::serial;

// =============================================================================
// PREFIXOS COM CORES ANSI
// =============================================================================

pub const P_ERROR: &str = "\x1b[1;31m[ERRO]\x1b[0m ";
pub const P_WARN: &str = "\x1b[1;33m[WARN]\x1b[0m ";
pub const P_INFO: &str = "\x1b[32m[INFO]\x1b[0m ";
pub const P_DEBUG: &str = "\x1b[36m[DEBG]\x1b[0m ";
pub const P_TRACE: &str = "\x1b[35m[TRAC]\x1b[0m ";
pub const P_OK: &str = "\x1b[32m[OK]\x1b[0m ";
pub const P_FAIL: &str = "\x1b[1;31m[FAIL]\x1b[0m ";

// =============================================================================
// EMISSÃO DE LINHA
// =============================================================================
//
// Os macros delegam para estas funções para não replicar a sequência de
// emissão em cada ponto de log.

#[doc(hidden)]
#[inline(never)]
pub fn line(prefix: &str, msg: &str) {
    serial::emit_str(prefix);
    serial::emit_str(msg);
    serial::emit_nl();
}

#[doc(hidden)]
#[inline(never)]
pub fn line_hex(prefix: &str, msg: &str, value: u64) {
    serial::emit_str(prefix);
    serial::emit_str(msg);
    serial::emit_hex(value);
    serial::emit_nl();
}

// =============================================================================
// MACROS DE LOG - NÍVEL ERROR
// =============================================================================

#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kerror {
    ($msg:expr) => {{
        $crate::klib::logging::line($crate::klib::logging::P_ERROR, $msg);
    }};
    ($msg:expr, $val:expr) => {{
        $crate::klib::logging::line_hex($crate::klib::logging::P_ERROR, $msg, $val as u64);
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kerror {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// MACROS DE LOG - NÍVEL WARN
// =============================================================================

#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kwarn {
    ($msg:expr) => {{
        $crate::klib::logging::line($crate::klib::logging::P_WARN, $msg);
    }};
    ($msg:expr, $val:expr) => {{
        $crate::klib::logging::line_hex($crate::klib::logging::P_WARN, $msg, $val as u64);
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kwarn {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// MACROS DE LOG - NÍVEL INFO
// =============================================================================
//
// kinfo! - Desligado com no_logs e com log_error
//

#[cfg(not(any(feature = "no_logs", feature = "log_error")))]
#[macro_export]
macro_rules! kinfo {
    ($msg:expr) => {{
        $crate::klib::logging::line($crate::klib::logging::P_INFO, $msg);
    }};
    ($msg:expr, $val:expr) => {{
        $crate::klib::logging::line_hex($crate::klib::logging::P_INFO, $msg, $val as u64);
    }};
}

#[cfg(any(feature = "no_logs", feature = "log_error"))]
#[macro_export]
macro_rules! kinfo {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// MACROS DE LOG - NÍVEL DEBUG
// =============================================================================
//
// kdebug! - Ativo apenas com log_debug ou log_trace
//

#[cfg(all(
    not(feature = "no_logs"),
    any(feature = "log_debug", feature = "log_trace")
))]
#[macro_export]
macro_rules! kdebug {
    ($msg:expr) => {{
        $crate::klib::logging::line($crate::klib::logging::P_DEBUG, $msg);
    }};
    ($msg:expr, $val:expr) => {{
        $crate::klib::logging::line_hex($crate::klib::logging::P_DEBUG, $msg, $val as u64);
    }};
}

#[cfg(not(all(
    not(feature = "no_logs"),
    any(feature = "log_debug", feature = "log_trace")
)))]
#[macro_export]
macro_rules! kdebug {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// MACROS DE LOG - NÍVEL TRACE
// =============================================================================

#[cfg(all(not(feature = "no_logs"), feature = "log_trace"))]
#[macro_export]
macro_rules! ktrace {
    ($msg:expr) => {{
        $crate::klib::logging::line($crate::klib::logging::P_TRACE, $msg);
    }};
    ($msg:expr, $val:expr) => {{
        $crate::klib::logging::line_hex($crate::klib::logging::P_TRACE, $msg, $val as u64);
    }};
}

#[cfg(not(all(not(feature = "no_logs"), feature = "log_trace")))]
#[macro_export]
macro_rules! ktrace {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// MACROS AUXILIARES
// =============================================================================

/// klog! - Log genérico sem prefixo de nível.
///
/// # Uso
/// ```ignore
/// klog!("dev=", dev);                       // String + hex
/// klog!("dev=", dev, " blockno=", blockno); // Múltiplos
/// ```
#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! klog {
    ($msg:expr) => {{
        $crate::drivers::serial::emit_str($msg);
    }};
    ($msg:expr, $val:expr) => {{
        $crate::drivers::serial::emit_str($msg);
        $crate::drivers::serial::emit_hex($val as u64);
    }};
    ($msg1:expr, $val1:expr, $msg2:expr, $val2:expr) => {{
        $crate::drivers::serial::emit_str($msg1);
        $crate::drivers::serial::emit_hex($val1 as u64);
        $crate::drivers::serial::emit_str($msg2);
        $crate::drivers::serial::emit_hex($val2 as u64);
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! klog {
    ($($t:tt)*) => {{}};
}

/// knl! - Emite apenas newline.
#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! knl {
    () => {{
        $crate::drivers::serial::emit_nl();
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! knl {
    () => {{}};
}

// =============================================================================
// MACROS DE STATUS (OK/FAIL)
// =============================================================================

#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kok {
    ($msg:expr) => {{
        $crate::klib::logging::line($crate::klib::logging::P_OK, $msg);
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kok {
    ($($t:tt)*) => {{}};
}

#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kfail {
    ($msg:expr) => {{
        $crate::klib::logging::line($crate::klib::logging::P_FAIL, $msg);
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kfail {
    ($($t:tt)*) => {{}};
}

#[cfg(all(test, not(feature = "no_logs")))]
mod tests {
    use crate::drivers::serial::tests::capture;

    #[test]
    fn test_macros_reach_sink() {
        let sink = capture();
        kerror!("(LOGTEST) erro-9c1d");
        kwarn!("(LOGTEST) aviso-9c1d=", 0x10u32);
        klog!("(LOGTEST) a=", 1u8, " b=", 2u16);
        knl!();
        // Outros testes logam em paralelo: cada pedaço é checado isolado
        assert!(sink.contains("(LOGTEST) erro-9c1d"));
        assert!(sink.contains("(LOGTEST) aviso-9c1d="));
        assert!(sink.contains(" b="));
    }
}
