//! 指纹编码器 - 把条目字节映射为 (候选桶1, 候选桶2, 指纹)

use std::{fmt, sync::Arc};

use crate::{
    hash::algorithm::{HashAlgorithm, HasherFunction},
    types::Fingerprint,
};

/// 指纹编码器
///
/// 候选桶2 只由候选桶1 和指纹推导 (partial-key cuckoo hashing)，
/// 所以踢出时不需要原始条目就能算出指纹的另一个桶。
#[derive(Clone)]
pub struct FingerprintEncoder {
    hasher: Arc<dyn HasherFunction>,
    fingerprint_bits: u32,
    index_mask: u64,
}

impl fmt::Debug for FingerprintEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FingerprintEncoder")
            .field("fingerprint_bits", &self.fingerprint_bits)
            .field("bucket_count", &(self.index_mask + 1))
            .finish()
    }
}

impl FingerprintEncoder {
    /// 创建编码器，`bucket_count` 必须是 2 的幂
    pub fn new(algorithm: HashAlgorithm, seed: u64, fingerprint_bits: u32, bucket_count: usize) -> Self {
        Self::with_hasher(algorithm.build(seed), fingerprint_bits, bucket_count)
    }

    /// 使用指定哈希函数创建
    pub fn with_hasher(
        hasher: Arc<dyn HasherFunction>,
        fingerprint_bits: u32,
        bucket_count: usize,
    ) -> Self {
        debug_assert!(bucket_count.is_power_of_two());
        debug_assert!((1..=64).contains(&fingerprint_bits));
        Self {
            hasher,
            fingerprint_bits,
            index_mask: bucket_count as u64 - 1,
        }
    }

    pub fn fingerprint_bits(&self) -> u32 {
        self.fingerprint_bits
    }

    /// 计算条目的两个候选桶和指纹
    pub fn encode(&self, item: &[u8]) -> (usize, usize, Fingerprint) {
        let h = self.hasher.hash_bytes(item);
        let fp = Fingerprint::from_hash(h, self.fingerprint_bits);
        // 指纹取低位。若桶索引也直接取 h 的低位，同一桶内的指纹低位全部相同，
        // 有效指纹位变少，误判率会远高于预期；所以桶索引取高半部分
        let index1 = self.mask(h.rotate_right(32));
        let index2 = self.alt_index(index1, fp);
        (index1, index2, fp)
    }

    /// 指纹在 `index` 之外的另一个候选桶
    ///
    /// 对同一指纹是对合运算: `alt_index(alt_index(i, f), f) == i`。
    #[inline]
    pub fn alt_index(&self, index: usize, fp: Fingerprint) -> usize {
        self.mask(index as u64 ^ self.hash_fingerprint(fp))
    }

    fn hash_fingerprint(&self, fp: Fingerprint) -> u64 {
        let (bytes, len) = fp.to_bytes(self.fingerprint_bits);
        self.hasher.hash_bytes(&bytes[..len])
    }

    #[inline]
    fn mask(&self, hash: u64) -> usize {
        (hash & self.index_mask) as usize
    }
}

/// 理论误判率上界: 2b / 2^f
pub fn false_positive_rate(bucket_size: usize, fingerprint_bits: u32) -> f64 {
    (2.0 * bucket_size as f64 / 2f64.powi(fingerprint_bits.min(1023) as i32)).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::bit_mask;

    fn encoder(bits: u32, buckets: usize) -> FingerprintEncoder {
        FingerprintEncoder::new(HashAlgorithm::XxHash, 0, bits, buckets)
    }

    #[test]
    fn test_encode_is_deterministic() {
        let enc = encoder(12, 1024);
        for item in [&b"alice"[..], b"bob", b"", &[0xFF; 100][..]] {
            let first = enc.encode(item);
            for _ in 0..10 {
                assert_eq!(enc.encode(item), first);
            }
        }
        // 独立构造的编码器结果也一致
        assert_eq!(encoder(12, 1024).encode(b"alice"), enc.encode(b"alice"));
    }

    #[test]
    fn test_indices_in_range() {
        let enc = encoder(8, 64);
        for i in 0..10_000u32 {
            let (i1, i2, fp) = enc.encode(&i.to_le_bytes());
            assert!(i1 < 64);
            assert!(i2 < 64);
            assert!(!fp.is_zero());
            assert!(fp.as_u64() <= bit_mask(8));
        }
    }

    #[test]
    fn test_alt_index_involution() {
        let enc = encoder(16, 4096);
        for i in 0..10_000u32 {
            let (i1, i2, fp) = enc.encode(&i.to_be_bytes());
            assert_eq!(enc.alt_index(i1, fp), i2);
            assert_eq!(enc.alt_index(i2, fp), i1);
        }
    }

    #[test]
    fn test_single_bucket_table() {
        let enc = encoder(4, 1);
        let (i1, i2, _) = enc.encode(b"only");
        assert_eq!((i1, i2), (0, 0));
    }

    #[test]
    fn test_one_bit_fingerprint_never_zero() {
        let enc = encoder(1, 16);
        for i in 0..1000u32 {
            let (_, _, fp) = enc.encode(&i.to_le_bytes());
            assert_eq!(fp, Fingerprint::SENTINEL);
        }
    }

    #[test]
    fn test_full_width_fingerprint() {
        let enc = encoder(64, 8);
        let (i1, i2, fp) = enc.encode(b"wide");
        assert!(!fp.is_zero());
        assert_eq!(enc.alt_index(i1, fp), i2);
    }

    #[test]
    fn test_false_positive_rate_bound() {
        assert!((false_positive_rate(4, 10) - 8.0 / 1024.0).abs() < 1e-12);
        assert_eq!(false_positive_rate(8, 1), 1.0);
    }
}
