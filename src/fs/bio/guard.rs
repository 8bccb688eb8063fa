//! Buffer travado devolvido por `bread`.

use super::buf::{BufFlags, BufId};
use super::config::BSIZE;
use super::error::BioError;
use super::BufferCache;
use crate::arch::CpuOps;
use crate::drivers::disk::DiskTransfer;
use crate::klib::{fatal, unwinding};
use crate::sync::SleepLockGuard;

/// Posse do SleepLock de um buffer mais uma referência.
///
/// Liberado exatamente uma vez: por [`release`](Self::release) ou, se
/// esquecido, ao sair de escopo. Os dois caminhos exigem que a tarefa atual
/// seja a dona; só o unwind de um panic solta sem checar.
pub struct BufGuard<'a, D: DiskTransfer, C: CpuOps> {
    cache: &'a BufferCache<D, C>,
    id: BufId,
    data: Option<SleepLockGuard<'a, [u8; BSIZE], C>>,
}

impl<'a, D: DiskTransfer, C: CpuOps> BufGuard<'a, D, C> {
    pub(super) fn new(
        cache: &'a BufferCache<D, C>,
        id: BufId,
        data: SleepLockGuard<'a, [u8; BSIZE], C>,
    ) -> Self {
        Self {
            cache,
            id,
            data: Some(data),
        }
    }

    #[inline]
    pub fn id(&self) -> BufId {
        self.id
    }

    pub fn dev(&self) -> u32 {
        self.cache.identity_of(self.id).0
    }

    pub fn blockno(&self) -> u32 {
        self.cache.identity_of(self.id).1
    }

    pub fn is_valid(&self) -> bool {
        self.cache.flags_of(self.id).contains(BufFlags::VALID)
    }

    /// A tarefa atual segura o SleepLock?
    pub fn holding(&self) -> bool {
        self.data.as_ref().is_some_and(|d| d.holding())
    }

    pub fn data(&self) -> &[u8; BSIZE] {
        match &self.data {
            Some(data) => &**data,
            None => fatal("bio", BioError::NotHolder.as_str()),
        }
    }

    pub fn data_mut(&mut self) -> &mut [u8; BSIZE] {
        self.lock_mut()
    }

    pub(super) fn lock_mut(&mut self) -> &mut [u8; BSIZE] {
        match &mut self.data {
            Some(data) => &mut **data,
            None => fatal("bio", BioError::NotHolder.as_str()),
        }
    }

    /// `bwrite` deste buffer
    pub fn write(&mut self) {
        let cache = self.cache;
        cache.bwrite(self);
    }

    /// `brelse`: exige que a tarefa atual seja a dona.
    pub fn release(mut self) {
        if !self.holding() {
            fatal("brelse", BioError::NotHolder.as_str());
        }
        if let Some(data) = self.data.take() {
            self.cache.unlock_and_unref(self.id, data);
        }
    }
}

impl<D: DiskTransfer, C: CpuOps> Drop for BufGuard<'_, D, C> {
    fn drop(&mut self) {
        if self.data.is_some() && !self.holding() && !unwinding() {
            fatal("brelse", BioError::NotHolder.as_str());
        }
        if let Some(data) = self.data.take() {
            self.cache.unlock_and_unref(self.id, data);
        }
    }
}
