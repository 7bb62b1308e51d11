//! Cuckoo过滤器核心实现

use crate::{
    error::FilterError,
    filter::{
        config::{FilterConfig, FilterParams},
        table::Table,
    },
    hash::FingerprintEncoder,
    stats::{OperationStatsSnapshot, StatsRecorder, StatsRecorderFactory},
    types::{BucketSize, Fingerprint, OperationType},
};
use parking_lot::RwLock;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;
use std::{fmt, mem, sync::Arc, time::Instant};

/// 过滤器统计信息
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FilterStats {
    pub len: usize,
    pub capacity: usize,
    pub bucket_count: usize,
    pub load_factor: f32,
    pub fingerprint_bits: u32,
    pub operations: OperationStatsSnapshot,
}

/// 写锁保护的可变状态
///
/// 随机数生成器只在写锁内使用，所以不要求它本身线程安全。
struct FilterState<R> {
    table: Table,
    rng: R,
    len: usize,
}

/// 插入结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// 直接放入候选桶
    Direct,
    /// 经过若干次踢出后放入
    Relocated { kicks: usize },
    /// 踢出次数耗尽，表已回滚
    Exhausted { kicks: usize },
}

/// Cuckoo过滤器
///
/// 插入和删除持有写锁，查询持有读锁，多个查询可以并发执行。
pub struct CuckooFilter<R = StdRng> {
    state: RwLock<FilterState<R>>,
    params: FilterParams,
    encoder: FingerprintEncoder,
    stats_recorder: Arc<dyn StatsRecorder>,
}

impl CuckooFilter<StdRng> {
    /// 按预计条目数、目标误判率和桶大小 (1/2/4/8) 创建过滤器
    pub fn new(item_count: usize, accuracy: f64, bucket_size: usize) -> Result<Self, FilterError> {
        Self::with_config(FilterConfig::new(item_count, accuracy, bucket_size)?)
    }

    /// 按配置创建，`config.seed` 决定踢出随机数是否可复现
    pub fn with_config(config: FilterConfig) -> Result<Self, FilterError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> CuckooFilter<R> {
    /// 使用指定随机数生成器创建
    pub fn with_rng(config: FilterConfig, rng: R) -> Result<Self, FilterError> {
        Self::from_parts(config, rng, StatsRecorderFactory::create_default())
    }

    /// 使用指定随机数生成器和统计记录器创建
    pub fn from_parts(
        config: FilterConfig,
        rng: R,
        stats_recorder: Arc<dyn StatsRecorder>,
    ) -> Result<Self, FilterError> {
        let params = config.params()?;
        let table = Table::new(params.bucket_count, params.bucket_size)?;
        let encoder = FingerprintEncoder::new(
            config.hash_algorithm,
            config.hash_seed,
            params.fingerprint_bits,
            params.bucket_count,
        );

        log_info!(
            "cuckoo filter created: items={}, accuracy={}, buckets={}, bucket_size={}, fingerprint_bits={}, max_retries={}, hash={}",
            config.item_count,
            config.accuracy,
            params.bucket_count,
            params.bucket_size,
            params.fingerprint_bits,
            params.max_retries,
            config.hash_algorithm
        );

        Ok(Self {
            state: RwLock::new(FilterState {
                table,
                rng,
                len: 0,
            }),
            params,
            encoder,
            stats_recorder,
        })
    }

    /// 插入条目
    ///
    /// 两个候选桶都满时做有界随机游走踢出；踢出次数耗尽返回
    /// [`FilterError::FilterFull`]，此时表恢复到调用前的状态。
    pub fn insert(&self, item: impl AsRef<[u8]>) -> Result<(), FilterError> {
        let start = Instant::now();
        let (index1, index2, fp) = self.encoder.encode(item.as_ref());

        let (placement, len) = {
            let mut guard = self.state.write();
            let state = &mut *guard;
            let placement = self.place(state, index1, index2, fp);
            if !matches!(placement, Placement::Exhausted { .. }) {
                state.len += 1;
            }
            (placement, state.len)
        };

        let result = match placement {
            Placement::Direct => Ok(()),
            Placement::Relocated { kicks } => {
                self.stats_recorder.record_kicks(kicks);
                Ok(())
            }
            Placement::Exhausted { kicks } => {
                self.stats_recorder.record_kicks(kicks);
                log_warn!(
                    "cuckoo filter full: buckets={}, len={}, max_retries={}",
                    self.params.bucket_count,
                    len,
                    self.params.max_retries
                );
                Err(FilterError::FilterFull {
                    bucket_count: self.params.bucket_count,
                    len,
                    max_retries: self.params.max_retries,
                })
            }
        };

        self.stats_recorder
            .record_operation(OperationType::Insert, start.elapsed(), result.is_ok());
        result
    }

    fn place(
        &self,
        state: &mut FilterState<R>,
        index1: usize,
        index2: usize,
        fp: Fingerprint,
    ) -> Placement {
        if state.table.bucket_mut(index1).try_place(fp) || state.table.bucket_mut(index2).try_place(fp) {
            return Placement::Direct;
        }
        self.cuckoo_kick(state, index1, fp)
    }

    /// 随机游走踢出
    ///
    /// 每一步随机选当前桶的一个槽位换出指纹，被换出的指纹移到它的另一个候选桶。
    /// 失败时按相反顺序撤销所有交换。
    fn cuckoo_kick(&self, state: &mut FilterState<R>, start: usize, fp: Fingerprint) -> Placement {
        let bucket_size = self.params.bucket_size.slots();
        let mut path = Vec::with_capacity(self.params.max_retries);
        let mut current_idx = start;
        let mut current_fp = fp;

        for depth in 0..self.params.max_retries {
            let slot_idx = state.rng.gen_range(0..bucket_size);
            current_fp = state.table.bucket_mut(current_idx).swap(slot_idx, current_fp);
            path.push((current_idx, slot_idx));

            current_idx = self.encoder.alt_index(current_idx, current_fp);
            if state.table.bucket_mut(current_idx).try_place(current_fp) {
                log_debug!("cuckoo kick placed fingerprint {} at bucket {} after {} kicks", current_fp, current_idx, depth + 1);
                return Placement::Relocated { kicks: depth + 1 };
            }
        }

        for &(bucket_idx, slot_idx) in path.iter().rev() {
            current_fp = state.table.bucket_mut(bucket_idx).swap(slot_idx, current_fp);
        }
        debug_assert_eq!(current_fp, fp);
        log_debug!("cuckoo kick exhausted after {} kicks, path rolled back", path.len());

        Placement::Exhausted { kicks: path.len() }
    }

    /// 查询条目是否可能存在
    ///
    /// 返回 false 表示一定不存在；返回 true 可能是误判。
    pub fn lookup(&self, item: impl AsRef<[u8]>) -> bool {
        let start = Instant::now();
        let (index1, index2, fp) = self.encoder.encode(item.as_ref());

        let found = {
            let state = self.state.read();
            state.table.bucket(index1).contains(fp) || state.table.bucket(index2).contains(fp)
        };

        self.stats_recorder
            .record_operation(OperationType::Lookup, start.elapsed(), found);
        found
    }

    /// 删除条目的一个指纹副本
    ///
    /// 条目不存在时什么也不做。指纹相同且落在同一桶的其他条目可能被误删。
    pub fn delete(&self, item: impl AsRef<[u8]>) -> bool {
        let start = Instant::now();
        let (index1, index2, fp) = self.encoder.encode(item.as_ref());

        let removed = {
            let mut guard = self.state.write();
            let state = &mut *guard;
            let removed =
                state.table.bucket_mut(index1).remove(fp) || state.table.bucket_mut(index2).remove(fp);
            if removed {
                state.len -= 1;
            }
            removed
        };

        self.stats_recorder
            .record_operation(OperationType::Delete, start.elapsed(), removed);
        removed
    }

    /// 已存放的指纹数
    pub fn len(&self) -> usize {
        self.state.read().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 槽位总数
    pub fn capacity(&self) -> usize {
        self.params.capacity()
    }

    pub fn load_factor(&self) -> f32 {
        self.len() as f32 / self.capacity() as f32
    }

    pub fn bucket_count(&self) -> usize {
        self.params.bucket_count
    }

    pub fn bucket_size(&self) -> BucketSize {
        self.params.bucket_size
    }

    pub fn fingerprint_bits(&self) -> u32 {
        self.params.fingerprint_bits
    }

    pub fn max_retries(&self) -> usize {
        self.params.max_retries
    }

    pub fn params(&self) -> FilterParams {
        self.params
    }

    /// 近似内存占用（字节）
    pub fn memory_usage(&self) -> usize {
        mem::size_of::<Self>() + self.state.read().table.memory_usage()
    }

    /// 获取统计信息
    pub fn stats(&self) -> FilterStats {
        let len = self.len();
        FilterStats {
            len,
            capacity: self.capacity(),
            bucket_count: self.params.bucket_count,
            load_factor: len as f32 / self.capacity() as f32,
            fingerprint_bits: self.params.fingerprint_bits,
            operations: self.stats_recorder.operation_stats_snapshot(),
        }
    }

    /// 导出Prometheus格式指标
    pub fn export_prometheus(&self) -> String {
        let mut output = self.stats_recorder.export_prometheus();
        output.push_str("# HELP cuckoo_filter_len Stored fingerprints\n");
        output.push_str("# TYPE cuckoo_filter_len gauge\n");
        output.push_str(&format!("cuckoo_filter_len {}\n", self.len()));
        output.push_str("# HELP cuckoo_filter_capacity Total fingerprint slots\n");
        output.push_str("# TYPE cuckoo_filter_capacity gauge\n");
        output.push_str(&format!("cuckoo_filter_capacity {}\n", self.capacity()));
        output
    }

    /// 扫描桶数组统计占用槽位，用于校验计数
    #[cfg(test)]
    fn occupied_slots(&self) -> usize {
        self.state.read().table.occupied()
    }
}

impl<R: Rng + Send + Sync> CuckooFilter<R> {
    /// 并行批量查询
    pub fn lookup_batch<T>(&self, items: &[T]) -> Vec<bool>
    where
        T: AsRef<[u8]> + Sync,
    {
        items.par_iter().map(|item| self.lookup(item)).collect()
    }
}

impl<R> fmt::Debug for CuckooFilter<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.state.read().len;
        f.debug_struct("CuckooFilter")
            .field("len", &len)
            .field("bucket_count", &self.params.bucket_count)
            .field("bucket_size", &self.params.bucket_size)
            .field("fingerprint_bits", &self.params.fingerprint_bits)
            .field("max_retries", &self.params.max_retries)
            .finish()
    }
}
