//! # Buffer Cache (bio)
//!
//! Cache de blocos de disco com tamanho fixo, dividido em shards por hash
//! de `(dev, blockno)`.
//!
//! ## Interface
//!
//! - `bread` para obter um buffer travado com o conteúdo do bloco
//! - `bwrite` depois de alterar o conteúdo
//! - `brelse` quando terminar (ou deixar o [`BufGuard`] sair de escopo)
//! - Não segurar buffers mais que o necessário: só uma tarefa por vez
//!
//! ## Dois níveis de lock
//!
//! ```text
//! Spinlock do shard  → slots, identidade, refcnt   (curto, nunca em I/O)
//! SleepLock do buffer → conteúdo                    (pode dormir)
//! ```
//!
//! O SleepLock é sempre adquirido por ÚLTIMO, com todos os spinlocks
//! soltos. Roubo entre shards segura um spinlock por vez.
//!
//! ## Aquisição (`bget`)
//!
//! 1. Shard alvo: procura a identidade → hit
//! 2. Shard alvo: primeiro slot com refcnt 0 → religa
//! 3. Outros shards em ordem de índice: tira um slot ocioso, solta o
//!    doador, religa no fim do shard alvo
//! 4. Nada ocioso → sem buffers (fatal em `bread`)
//!
//! Política de despejo: primeiro ocioso na ordem de scan (não LRU).

pub mod buf;
pub mod config;
pub mod error;
pub mod guard;
pub mod shard;
pub mod stats;

pub use buf::{BufFlags, BufId};
pub use config::{BcacheConfig, BSIZE, NBUF, NHASH};
pub use error::{BioError, BioResult};
pub use guard::BufGuard;
pub use stats::BcacheStatsSnapshot;

use crate::arch::CpuOps;
use crate::drivers::disk::DiskTransfer;
use crate::klib::fatal;
use crate::sync::SleepLockGuard;
use alloc::boxed::Box;
use alloc::vec::Vec;
use buf::Buf;
use shard::Shard;
use stats::BcacheStats;

/// Buffer cache particionado em shards
pub struct BufferCache<D: DiskTransfer, C: CpuOps> {
    bufs: Box<[Buf<C>]>,
    shards: Box<[Shard]>,
    disk: D,
    stats: BcacheStats,
    config: BcacheConfig,
}

impl<D: DiskTransfer, C: CpuOps> BufferCache<D, C> {
    /// Cria o cache e distribui os buffers pelos shards em ordem de array.
    pub fn new(disk: D, config: BcacheConfig) -> BioResult<Self> {
        config.validate()?;

        let mut bufs = Vec::with_capacity(config.nbuf);
        bufs.resize_with(config.nbuf, Buf::new);

        let mut shards = Vec::with_capacity(config.nshard);
        let mut next = 0;
        for s in 0..config.nshard {
            let shard = Shard::with_capacity(config.nbuf);
            {
                let mut slots = shard.lock();
                for _ in 0..config.initial_len(s) {
                    slots.push(BufId(next));
                    next += 1;
                }
            }
            crate::kdebug!("(BIO) Buffers no shard=", shard.len());
            shards.push(shard);
        }

        crate::kinfo!("(BIO) Buffer cache: nbuf=", config.nbuf);
        crate::kinfo!("(BIO) Buffer cache: nshard=", config.nshard);

        Ok(Self {
            bufs: bufs.into_boxed_slice(),
            shards: shards.into_boxed_slice(),
            disk,
            stats: BcacheStats::new(),
            config,
        })
    }

    /// Shard responsável pela identidade
    #[inline]
    pub fn shard_of(&self, dev: u32, blockno: u32) -> usize {
        (dev ^ blockno) as usize % self.shards.len()
    }

    #[inline]
    fn buf(&self, id: BufId) -> &Buf<C> {
        &self.bufs[id.0]
    }

    // =========================================================================
    // AQUISIÇÃO
    // =========================================================================

    /// Buffer travado com o conteúdo válido de `(dev, blockno)`.
    ///
    /// `NoBuffers` quando nenhum shard tem slot ocioso.
    pub fn try_bread(&self, dev: u32, blockno: u32) -> BioResult<BufGuard<'_, D, C>> {
        let id = self.bget(dev, blockno)?;
        let buf = self.buf(id);

        // Nenhum spinlock seguro aqui: pode dormir
        let mut data = buf.data.lock();
        if !buf.flags().contains(BufFlags::VALID) {
            self.transfer(buf, &mut data, false);
            buf.insert_flags(BufFlags::VALID);
        }
        Ok(BufGuard::new(self, id, data))
    }

    /// Como [`try_bread`](Self::try_bread), mas falta de buffers é fatal.
    pub fn bread(&self, dev: u32, blockno: u32) -> BufGuard<'_, D, C> {
        match self.try_bread(dev, blockno) {
            Ok(guard) => guard,
            Err(err) => fatal("bget", err.as_str()),
        }
    }

    /// Reserva um slot para a identidade (refcnt já contado), sem travar
    /// o conteúdo.
    fn bget(&self, dev: u32, blockno: u32) -> BioResult<BufId> {
        let target = self.shard_of(dev, blockno);

        {
            let slots = self.shards[target].lock();

            if let Some(&id) = slots.iter().find(|&&id| self.buf(id).is(dev, blockno)) {
                self.buf(id).refcnt.inc();
                self.stats.inc_hit();
                return Ok(id);
            }

            if let Some(&id) = slots.iter().find(|&&id| self.buf(id).ref_count() == 0) {
                self.buf(id).rebind(dev, blockno);
                self.stats.inc_miss();
                return Ok(id);
            }
        }

        match self.steal_idle(target) {
            Some(stolen) => Ok(self.install_stolen(target, stolen, dev, blockno)),
            None => {
                crate::kwarn!("(BIO) Nenhum buffer ocioso: blockno=", blockno);
                Err(BioError::NoBuffers)
            }
        }
    }

    /// Tira o primeiro slot ocioso de outro shard, em ordem de índice.
    ///
    /// O slot volta fora de qualquer shard; só quem o recebeu o enxerga.
    fn steal_idle(&self, target: usize) -> Option<BufId> {
        for donor in (0..self.shards.len()).filter(|&s| s != target) {
            let mut slots = self.shards[donor].lock();
            if let Some(pos) = slots.iter().position(|&id| self.buf(id).ref_count() == 0) {
                let id = slots.remove(pos);
                drop(slots);
                crate::ktrace!("(BIO) Roubo de buffer: shard doador=", donor);
                return Some(id);
            }
        }
        None
    }

    /// Coloca o slot roubado no fim do shard alvo.
    ///
    /// O shard alvo foi solto durante o roubo; se outra tarefa ligou a
    /// mesma identidade nesse meio tempo, o slot roubado fica ocioso no
    /// alvo e a tarefa usa o buffer já existente (hit).
    fn install_stolen(&self, target: usize, stolen: BufId, dev: u32, blockno: u32) -> BufId {
        let mut slots = self.shards[target].lock();

        let existing = slots
            .iter()
            .copied()
            .find(|&id| self.buf(id).is(dev, blockno));

        match existing {
            Some(id) => {
                self.buf(id).refcnt.inc();
                self.buf(stolen).unbind();
                slots.push(stolen);
                self.stats.inc_hit();
                id
            }
            None => {
                self.buf(stolen).rebind(dev, blockno);
                slots.push(stolen);
                self.stats.inc_miss();
                self.stats.inc_steal();
                stolen
            }
        }
    }

    // =========================================================================
    // ESCRITA / LIBERAÇÃO
    // =========================================================================

    /// Grava o conteúdo no disco. Exige o SleepLock do buffer.
    pub fn bwrite(&self, guard: &mut BufGuard<'_, D, C>) {
        if !guard.holding() {
            fatal("bwrite", BioError::NotHolder.as_str());
        }
        let id = guard.id();
        self.transfer(self.buf(id), guard.lock_mut(), true);
    }

    /// Solta o buffer. Exige o SleepLock do buffer.
    pub fn brelse(&self, guard: BufGuard<'_, D, C>) {
        guard.release();
    }

    /// Solta o SleepLock e depois a referência, sob o lock do shard.
    pub(crate) fn unlock_and_unref(&self, id: BufId, data: SleepLockGuard<'_, [u8; BSIZE], C>) {
        drop(data);
        self.unref(id);
    }

    fn unref(&self, id: BufId) {
        let buf = self.buf(id);
        let shard = self.shard_of(buf.dev(), buf.blockno());
        let slots = self.shards[shard].lock();
        if buf.refcnt.dec().is_none() {
            drop(slots);
            fatal("brelse", BioError::RefCountUnderflow.as_str());
        }
        // refcnt 0: conteúdo continua em cache até o slot ser religado
    }

    /// Mais uma referência, sem tocar no SleepLock (ex: log mantém o
    /// bloco em cache até instalar a transação).
    pub fn bpin(&self, guard: &BufGuard<'_, D, C>) {
        let buf = self.buf(guard.id());
        let _slots = self.shards[self.shard_of(buf.dev(), buf.blockno())].lock();
        buf.refcnt.inc();
    }

    /// Desfaz um [`bpin`](Self::bpin). Abaixo de zero é fatal.
    pub fn bunpin(&self, id: BufId) {
        let buf = self.buf(id);
        let shard = self.shard_of(buf.dev(), buf.blockno());
        let slots = self.shards[shard].lock();
        if buf.refcnt.dec().is_none() {
            drop(slots);
            fatal("bunpin", BioError::RefCountUnderflow.as_str());
        }
    }

    fn transfer(&self, buf: &Buf<C>, data: &mut [u8; BSIZE], write: bool) {
        buf.insert_flags(BufFlags::DISK);
        self.disk.transfer(buf.dev(), buf.blockno(), &mut data[..], write);
        buf.remove_flags(BufFlags::DISK);
        self.stats.inc_disk(write);
    }

    // =========================================================================
    // INTROSPECÇÃO
    // =========================================================================

    /// Slots no shard agora
    pub fn shard_len(&self, shard: usize) -> Option<usize> {
        self.shards.get(shard).map(Shard::len)
    }

    /// Cópia dos slots do shard, em ordem
    pub fn shard_slots(&self, shard: usize) -> Option<Vec<BufId>> {
        self.shards.get(shard).map(|s| s.lock().clone())
    }

    /// Refcount atual de um buffer
    pub fn ref_count(&self, id: BufId) -> usize {
        self.buf(id).ref_count()
    }

    /// A tarefa atual segura o SleepLock deste buffer?
    pub fn holding(&self, guard: &BufGuard<'_, D, C>) -> bool {
        guard.holding()
    }

    pub fn stats(&self) -> BcacheStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn config(&self) -> BcacheConfig {
        self.config
    }

    pub fn disk(&self) -> &D {
        &self.disk
    }

    pub(crate) fn flags_of(&self, id: BufId) -> BufFlags {
        self.buf(id).flags()
    }

    pub(crate) fn identity_of(&self, id: BufId) -> (u32, u32) {
        let buf = self.buf(id);
        (buf.dev(), buf.blockno())
    }
}

// =============================================================================
// TESTES
// =============================================================================
