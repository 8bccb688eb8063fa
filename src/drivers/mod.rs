//! # Drivers do Núcleo
//!
//! Apenas as duas pontas de que os gerenciadores de recursos precisam:
//!
//! | Driver   | Arquivo      | Papel |
//! |----------|--------------|-------|
//! | Serial   | `serial.rs`  | Emissão de bytes de log |
//! | Disco    | `disk.rs`    | Transferência síncrona de blocos |
//!
//! Drivers reais (UART, VirtIO) implementam `SerialSink` e `DiskTransfer`
//! fora deste crate.

pub mod disk; // Contrato de transferência + RamDisk
pub mod serial; // Camada de emissão de logs

pub use disk::{DiskTransfer, RamDisk};
pub use serial::SerialSink;
