//! Rust并发Cuckoo过滤器库
//!
//! 提供紧凑的近似成员查询结构：支持插入、查询和删除，误判率可配置。
//!
//! ## 主要特性
//! - partial-key cuckoo hashing：踢出时只需要指纹就能算出另一个候选桶
//! - 有界随机游走踢出，失败时回滚，不会丢失已插入的条目
//! - 读写锁保护：查询并发执行，插入/删除独占
//! - 可复现的踢出随机数（指定种子）
//! - 操作统计和Prometheus指标导出
//!
//! ## 快速开始
//!
//! ```rust
//! use cuckoo_filter::*;
//!
//! fn main() -> Result<(), FilterError> {
//!     // 预计 1000 个条目，误判率 1%，每桶 4 个槽位
//!     let filter = CuckooFilter::new(1000, 0.01, 4)?;
//!
//!     filter.insert("alice")?;
//!     assert!(filter.lookup("alice"));
//!
//!     filter.delete("alice");
//!     assert!(!filter.lookup("alice"));
//!
//!     println!("{:?}", filter.stats());
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        log::debug!($($arg)*)
    };
}

#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        log::info!($($arg)*)
    };
}

#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        log::warn!($($arg)*)
    };
}

#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        log::error!($($arg)*)
    };
}

#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        ()
    };
}

#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        ()
    };
}

#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        ()
    };
}

#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        ()
    };
}

// 核心模块导出
pub mod error;
pub mod filter;
pub mod hash;
pub mod stats;
pub mod types;

use rand::Rng;

// 公共接口导出
pub use crate::{
    error::FilterError,
    filter::{
        Bucket, BucketMut, CuckooFilter, FilterConfig, FilterParams, FilterStats, Table,
        DEFAULT_BUCKET_SIZE, DEFAULT_CONFIG,
    },
    hash::{FingerprintEncoder, HashAlgorithm, HasherFunction},
    stats::{StatsRecorder, StatsRecorderFactory},
    types::{BucketSize, Fingerprint, OperationType},
};

/// 默认过滤器类型
pub type DefaultFilter = CuckooFilter;

/// 按全局默认配置创建过滤器
pub fn default_filter() -> Result<DefaultFilter, FilterError> {
    CuckooFilter::with_config(DEFAULT_CONFIG.clone())
}

/// 批量插入，返回成功插入的数量
///
/// 过滤器报满后仍会继续尝试后面的条目。
pub fn batch_insert<R: Rng, T: AsRef<[u8]>>(
    filter: &CuckooFilter<R>,
    items: impl IntoIterator<Item = T>,
) -> usize {
    let mut count = 0;
    for item in items {
        match filter.insert(item) {
            Ok(()) => count += 1,
            Err(e) => {
                log_debug!("batch insert skipped item: {}", e);
            }
        }
    }
    count
}

/// 批量查询
pub fn batch_lookup<R: Rng, T: AsRef<[u8]>>(
    filter: &CuckooFilter<R>,
    items: impl IntoIterator<Item = T>,
) -> Vec<bool> {
    items.into_iter().map(|item| filter.lookup(item)).collect()
}
