//! Traits de Arquitetura.

pub mod cpu;

pub use cpu::CpuOps;
