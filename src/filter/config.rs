//! 过滤器配置与派生参数

use crate::{
    error::FilterError,
    filter::table::{bucket_count_for, fingerprint_bits_for, max_retries_for},
    hash::{false_positive_rate, HashAlgorithm, DEFAULT_SEED},
    types::BucketSize,
};

/// 过滤器配置
#[derive(Clone, Debug, PartialEq)]
pub struct FilterConfig {
    /// 预计条目数
    pub item_count: usize,
    /// 目标误判率，取值 (0,1)
    pub accuracy: f64,
    pub bucket_size: BucketSize,
    pub hash_algorithm: HashAlgorithm,
    pub hash_seed: u64,
    /// 覆盖默认的最大踢出次数
    pub max_retries: Option<usize>,
    /// 踢出随机数种子，None 时使用系统熵
    pub seed: Option<u64>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            item_count: 1024,
            accuracy: 0.01,
            bucket_size: BucketSize::Four,
            hash_algorithm: HashAlgorithm::XxHash,
            hash_seed: DEFAULT_SEED,
            max_retries: None,
            seed: None,
        }
    }
}

impl FilterConfig {
    /// 用预计条目数、误判率和桶大小创建配置，桶大小只能是 1/2/4/8
    pub fn new(item_count: usize, accuracy: f64, bucket_size: usize) -> Result<Self, FilterError> {
        Ok(Self {
            item_count,
            accuracy,
            bucket_size: BucketSize::try_from(bucket_size)?,
            ..Self::default()
        })
    }

    /// 检查配置参数
    pub fn validate(&self) -> Result<(), FilterError> {
        self.params().map(|_| ())
    }

    /// 计算桶数量、指纹位数和最大踢出次数
    pub fn params(&self) -> Result<FilterParams, FilterError> {
        let fingerprint_bits = fingerprint_bits_for(self.accuracy, self.bucket_size)?;
        let bucket_count = bucket_count_for(self.item_count, self.bucket_size)?;
        let max_retries = match self.max_retries {
            Some(0) => return Err(FilterError::invalid_config("max_retries 必须至少为 1")),
            Some(retries) => retries,
            None => max_retries_for(self.item_count),
        };
        Ok(FilterParams {
            bucket_count,
            bucket_size: self.bucket_size,
            fingerprint_bits,
            max_retries,
        })
    }
}

/// 构造后不变的过滤器参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterParams {
    pub bucket_count: usize,
    pub bucket_size: BucketSize,
    pub fingerprint_bits: u32,
    pub max_retries: usize,
}

impl FilterParams {
    /// 槽位总数
    pub fn capacity(&self) -> usize {
        self.bucket_count * self.bucket_size.slots()
    }

    /// 满载时的理论误判率上界
    pub fn false_positive_rate(&self) -> f64 {
        false_positive_rate(self.bucket_size.slots(), self.fingerprint_bits)
    }
}
