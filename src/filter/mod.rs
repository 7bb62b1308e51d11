//! 过滤器核心模块 - 实现Cuckoo过滤器及其组件

pub mod bucket;
pub mod config;
pub mod cuckoo_filter;
pub mod table;

pub use bucket::{Bucket, BucketMut};
pub use config::{FilterConfig, FilterParams};
pub use cuckoo_filter::{CuckooFilter, FilterStats};
pub use table::Table;

use once_cell::sync::Lazy;

/// 全局默认配置
pub static DEFAULT_CONFIG: Lazy<FilterConfig> = Lazy::new(FilterConfig::default);

/// 默认桶大小
pub const DEFAULT_BUCKET_SIZE: usize = 4;
