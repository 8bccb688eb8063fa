//! Testes do buffer cache
//!
//! Rodam sobre um `RamDisk` próprio; não tocam o cache do kernel.

use crate::arch::CpuOps;
use crate::drivers::disk::RamDisk;
use crate::fs::bio::{BcacheConfig, BufferCache, BSIZE};
use crate::klib::test_framework::{run_test_suite, SuiteSummary, TestCase, TestResult};

pub fn cases<C: CpuOps>() -> [TestCase; 4] {
    [
        TestCase::new("bio_hit_single_read", test_hit_single_read::<C>),
        TestCase::new("bio_write_back", test_write_back::<C>),
        TestCase::new("bio_partition", test_partition::<C>),
        TestCase::new("bio_steal", test_steal::<C>),
    ]
}

/// Executa a suíte do buffer cache
pub fn run_bio_tests<C: CpuOps>() -> SuiteSummary {
    crate::kinfo!("╔════════════════════════════════════════╗");
    crate::kinfo!("║     🧪 TESTES DO BUFFER CACHE          ║");
    crate::kinfo!("╚════════════════════════════════════════╝");
    run_test_suite("bio", &cases::<C>())
}

fn make<C: CpuOps>(nbuf: usize, nshard: usize) -> Option<BufferCache<RamDisk, C>> {
    BufferCache::new(RamDisk::new(), BcacheConfig::new(nbuf, nshard)).ok()
}

fn test_hit_single_read<C: CpuOps>() -> TestResult {
    let Some(cache) = make::<C>(4, 3) else {
        return TestResult::Failed;
    };
    let first = cache.bread(1, 10);
    let id = first.id();
    first.release();
    let again = cache.bread(1, 10);
    if again.id() != id || cache.disk().reads() != 1 {
        crate::kerror!("(BIO) hit leu o disco de novo, leituras=", cache.disk().reads());
        return TestResult::Failed;
    }
    again.release();
    TestResult::Passed
}

fn test_write_back<C: CpuOps>() -> TestResult {
    let Some(cache) = make::<C>(4, 3) else {
        return TestResult::Failed;
    };
    let mut buf = cache.bread(1, 3);
    buf.data_mut()[BSIZE - 1] = 0x5a;
    buf.write();
    buf.release();
    if cache.disk().snapshot(1, 3)[BSIZE - 1] != 0x5a {
        return TestResult::Failed;
    }
    TestResult::Passed
}

fn test_partition<C: CpuOps>() -> TestResult {
    let Some(cache) = make::<C>(30, 29) else {
        return TestResult::Failed;
    };
    if cache.shard_len(0) != Some(2) {
        return TestResult::Failed;
    }
    if (1..29).any(|s| cache.shard_len(s) != Some(1)) {
        return TestResult::Failed;
    }
    TestResult::Passed
}

fn test_steal<C: CpuOps>() -> TestResult {
    let Some(cache) = make::<C>(2, 2) else {
        return TestResult::Failed;
    };
    // Ambos caem no shard 0, que só tem um slot
    let a = cache.bread(0, 2);
    let b = cache.bread(0, 4);
    let ok = a.id() != b.id() && cache.shard_len(0) == Some(2) && cache.stats().steals == 1;
    a.release();
    b.release();
    if ok {
        TestResult::Passed
    } else {
        TestResult::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::hosted::HostCpu;

    #[test]
    fn test_bio_self_tests_pass() {
        let summary = run_bio_tests::<HostCpu>();
        assert!(summary.ok(), "{:?}", summary);
        assert_eq!(summary.passed, 4);
    }
}
