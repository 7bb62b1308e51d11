//! 哈希算法 - 无状态的字节哈希函数

use ahash::RandomState;
use std::{
    collections::hash_map::DefaultHasher,
    fmt,
    hash::{BuildHasher, Hasher},
    sync::Arc,
};

/// 哈希算法选择
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// twox-hash XxHash64
    #[default]
    XxHash,
    /// aHash，固定种子
    AHash,
    /// 标准库 SipHash，固定密钥
    Default,
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HashAlgorithm::XxHash => "xxhash64",
            HashAlgorithm::AHash => "ahash",
            HashAlgorithm::Default => "siphash",
        };
        f.write_str(name)
    }
}

/// 哈希函数特征
///
/// 实现必须是纯函数：相同输入始终得到相同输出，且可在任意线程并发调用。
pub trait HasherFunction: Send + Sync {
    fn hash_bytes(&self, data: &[u8]) -> u64;
}

impl<T> HasherFunction for T
where
    T: Fn(&[u8]) -> u64 + Send + Sync,
{
    fn hash_bytes(&self, data: &[u8]) -> u64 {
        self(data)
    }
}

impl HashAlgorithm {
    /// 构建哈希函数
    pub fn build(self, seed: u64) -> Arc<dyn HasherFunction> {
        match self {
            HashAlgorithm::XxHash => Arc::new(move |data: &[u8]| {
                let mut hasher = twox_hash::XxHash64::with_seed(seed);
                hasher.write(data);
                hasher.finish()
            }),
            HashAlgorithm::AHash => {
                let state = RandomState::with_seeds(
                    seed,
                    seed ^ 0x243F_6A88_85A3_08D3,
                    seed ^ 0x1319_8A2E_0370_7344,
                    seed ^ 0xA409_3822_299F_31D0,
                );
                Arc::new(move |data: &[u8]| {
                    let mut hasher = state.build_hasher();
                    hasher.write(data);
                    hasher.finish()
                })
            }
            HashAlgorithm::Default => Arc::new(move |data: &[u8]| {
                let mut hasher = DefaultHasher::new();
                hasher.write_u64(seed);
                hasher.write(data);
                hasher.finish()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [HashAlgorithm; 3] = [
        HashAlgorithm::XxHash,
        HashAlgorithm::AHash,
        HashAlgorithm::Default,
    ];

    #[test]
    fn test_hash_is_deterministic() {
        for algorithm in ALL {
            let a = algorithm.build(42);
            let b = algorithm.build(42);
            for data in [&b""[..], b"alice", b"bob", &[0u8; 64][..]] {
                assert_eq!(a.hash_bytes(data), a.hash_bytes(data), "{algorithm}");
                assert_eq!(a.hash_bytes(data), b.hash_bytes(data), "{algorithm}");
            }
        }
    }

    #[test]
    fn test_hash_distinguishes_inputs() {
        for algorithm in ALL {
            let h = algorithm.build(0);
            assert_ne!(h.hash_bytes(b"alice"), h.hash_bytes(b"bob"), "{algorithm}");
        }
    }

    #[test]
    fn test_seed_changes_output() {
        for algorithm in ALL {
            let a = algorithm.build(1);
            let b = algorithm.build(2);
            assert_ne!(a.hash_bytes(b"key"), b.hash_bytes(b"key"), "{algorithm}");
        }
    }

    #[test]
    fn test_concurrent_hashing() {
        let hasher = HashAlgorithm::XxHash.build(7);
        let expected = hasher.hash_bytes(b"shared");
        std::thread::scope(|s| {
            for _ in 0..4 {
                let hasher = Arc::clone(&hasher);
                s.spawn(move || {
                    for _ in 0..1000 {
                        assert_eq!(hasher.hash_bytes(b"shared"), expected);
                    }
                });
            }
        });
    }
}
