//! 桶数组与容量计算
//!
//! 所有桶存放在一段连续的槽位数组里，桶数量始终是 2 的幂，
//! 因此桶索引可以直接用位掩码求得。

use std::mem;

use crate::{
    error::FilterError,
    filter::bucket::{Bucket, BucketMut},
    types::{BucketSize, Fingerprint},
};

/// 指纹位数上限
pub const MAX_FINGERPRINT_BITS: u32 = 64;

/// 桶数组
#[derive(Clone)]
pub struct Table {
    slots: Vec<Fingerprint>,
    bucket_size: BucketSize,
    bucket_count: usize,
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("bucket_count", &self.bucket_count)
            .field("bucket_size", &self.bucket_size)
            .finish()
    }
}

impl Table {
    /// 分配并清零所有槽位，`bucket_count` 必须是 2 的幂
    ///
    /// 内存不足时返回错误，不会中止进程。
    pub fn new(bucket_count: usize, bucket_size: BucketSize) -> Result<Self, FilterError> {
        debug_assert!(bucket_count.is_power_of_two());
        let len = bucket_count
            .checked_mul(bucket_size.slots())
            .ok_or_else(|| FilterError::invalid_config(format!("桶数量 {bucket_count} 溢出")))?;

        let mut slots = Vec::new();
        slots.try_reserve_exact(len).map_err(|e| {
            FilterError::invalid_config(format!(
                "无法为 {len} 个槽位分配 {} 字节: {e}",
                len.saturating_mul(mem::size_of::<Fingerprint>())
            ))
        })?;
        slots.resize(len, Fingerprint::EMPTY);

        Ok(Self {
            slots,
            bucket_size,
            bucket_count,
        })
    }

    pub fn bucket(&self, index: usize) -> Bucket<'_> {
        Bucket::new(&self.slots[self.range(index)])
    }

    pub fn bucket_mut(&mut self, index: usize) -> BucketMut<'_> {
        let range = self.range(index);
        BucketMut::new(&mut self.slots[range])
    }

    #[inline]
    fn range(&self, index: usize) -> std::ops::Range<usize> {
        debug_assert!(index < self.bucket_count);
        let start = index * self.bucket_size.slots();
        start..start + self.bucket_size.slots()
    }

    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    pub fn bucket_size(&self) -> BucketSize {
        self.bucket_size
    }

    /// 槽位总数
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// 扫描统计已占用槽位数
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.is_zero()).count()
    }

    /// 槽位数组占用的字节数
    pub fn memory_usage(&self) -> usize {
        self.slots.capacity() * mem::size_of::<Fingerprint>()
    }
}

/// 指纹位数: `ceil(log2(2 * b / accuracy))`，最少 1 位
pub fn fingerprint_bits_for(accuracy: f64, bucket_size: BucketSize) -> Result<u32, FilterError> {
    if !(accuracy > 0.0 && accuracy < 1.0) {
        return Err(FilterError::invalid_config(format!(
            "accuracy 必须在 (0,1) 内，实际为 {accuracy}"
        )));
    }
    let bits = (2.0 * bucket_size.slots() as f64 / accuracy).log2().ceil().max(1.0);
    if bits > MAX_FINGERPRINT_BITS as f64 {
        return Err(FilterError::invalid_config(format!(
            "accuracy={accuracy} 需要 {bits} 位指纹，超过上限 {MAX_FINGERPRINT_BITS}"
        )));
    }
    Ok(bits as u32)
}

/// 桶数量: 不小于 `item_count * 100 / (b * 负载因子%)` 的最小 2 的幂
pub fn bucket_count_for(item_count: usize, bucket_size: BucketSize) -> Result<usize, FilterError> {
    let overflow = || FilterError::invalid_config(format!("item_count={item_count} 过大，桶数量溢出"));

    let divisor = bucket_size.slots() * bucket_size.load_factor_percent();
    let scaled = item_count.checked_mul(100).ok_or_else(overflow)?;
    let minimum = (scaled / divisor + usize::from(scaled % divisor != 0)).max(1);
    let bucket_count = minimum.checked_next_power_of_two().ok_or_else(overflow)?;
    let slots = bucket_count.checked_mul(bucket_size.slots()).ok_or_else(overflow)?;
    // 字节数不能超过 isize::MAX，否则无法作为一次分配
    slots
        .checked_mul(mem::size_of::<Fingerprint>())
        .filter(|&bytes| bytes <= isize::MAX as usize)
        .ok_or_else(overflow)?;
    Ok(bucket_count)
}

/// 最大踢出次数: `floor(10 * log2(item_count)) + 1`
pub fn max_retries_for(item_count: usize) -> usize {
    (10.0 * (item_count.max(1) as f64).log2()).floor() as usize + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_table_zero_filled() {
        let table = Table::new(8, BucketSize::Four).unwrap();
        assert_eq!(table.bucket_count(), 8);
        assert_eq!(table.capacity(), 32);
        assert_eq!(table.occupied(), 0);
        for i in 0..8 {
            assert!(table.bucket(i).is_empty());
            assert_eq!(table.bucket(i).len(), 4);
        }
    }

    #[test]
    fn test_new_table_allocation_failure_is_error() {
        // 2^53 个槽位需要 2^56 字节，超出地址空间
        let err = Table::new(1 << 50, BucketSize::Eight).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_buckets_do_not_overlap() {
        let mut table = Table::new(4, BucketSize::Two).unwrap();
        for i in 0..4 {
            assert!(table.bucket_mut(i).try_place(Fingerprint::new(i as u64 + 1)));
        }
        for i in 0..4 {
            let bucket = table.bucket(i);
            assert_eq!(bucket.occupied(), 1);
            assert!(bucket.contains(Fingerprint::new(i as u64 + 1)));
        }
        assert_eq!(table.occupied(), 4);
        assert_eq!(table.memory_usage(), 8 * mem::size_of::<Fingerprint>());
    }

    #[test]
    fn test_fingerprint_bits() {
        // 2*4/0.01 = 800, log2 ≈ 9.64
        assert_eq!(fingerprint_bits_for(0.01, BucketSize::Four).unwrap(), 10);
        // 2*4/0.5 = 16
        assert_eq!(fingerprint_bits_for(0.5, BucketSize::Four).unwrap(), 4);
        assert_eq!(fingerprint_bits_for(0.99, BucketSize::One).unwrap(), 2);
        assert_eq!(fingerprint_bits_for(1e-6, BucketSize::Eight).unwrap(), 24);
    }

    #[test]
    fn test_fingerprint_bits_rejects_bad_accuracy() {
        for accuracy in [0.0, 1.0, -0.5, 1.5, f64::NAN, f64::INFINITY] {
            assert!(fingerprint_bits_for(accuracy, BucketSize::Four).is_err(), "{accuracy}");
        }
        // 2*8/1e-30 需要约 104 位
        assert!(fingerprint_bits_for(1e-30, BucketSize::Eight).unwrap_err().is_config_error());
    }

    #[test]
    fn test_bucket_count_power_of_two() {
        for size in [BucketSize::One, BucketSize::Two, BucketSize::Four, BucketSize::Eight] {
            for items in [0usize, 1, 7, 100, 1000, 12_345, 1 << 20] {
                let count = bucket_count_for(items, size).unwrap();
                assert!(count.is_power_of_two());
                let lf = size.load_factor_percent() as f64 / 100.0;
                assert!(count as f64 >= items as f64 / (size.slots() as f64 * lf));
            }
        }
    }

    #[test]
    fn test_bucket_count_examples() {
        // 1000*100/(4*95) = 263.2 -> 512
        assert_eq!(bucket_count_for(1000, BucketSize::Four).unwrap(), 512);
        // 10*100/(1*50) = 20 -> 32
        assert_eq!(bucket_count_for(10, BucketSize::One).unwrap(), 32);
        assert_eq!(bucket_count_for(0, BucketSize::Eight).unwrap(), 1);
    }

    #[test]
    fn test_bucket_count_overflow() {
        assert!(bucket_count_for(usize::MAX, BucketSize::Four).is_err());
        assert!(bucket_count_for(usize::MAX / 50, BucketSize::One).is_err());
    }

    #[test]
    fn test_max_retries() {
        assert_eq!(max_retries_for(0), 1);
        assert_eq!(max_retries_for(1), 1);
        assert_eq!(max_retries_for(2), 11);
        assert_eq!(max_retries_for(1000), 100);
        assert_eq!(max_retries_for(1024), 101);
    }
}
