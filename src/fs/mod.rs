//! Camada de blocos do sistema de arquivos.
//!
//! Submódulos:
//! - `bio`: buffer cache de blocos de disco.
//!
//! O layout do sistema de arquivos e o journal ficam acima desta camada e
//! só conversam com ela via `bread`/`bwrite`/`brelse`/`bpin`/`bunpin`.

pub mod bio;

#[cfg(any(test, feature = "self_test"))]
pub mod test;
