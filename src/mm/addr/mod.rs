//! # Addr - Wrappers Type-Safe para Endereços

mod phys;

pub use phys::PhysAddr;
