//! 哈希模块 - 统一管理哈希和指纹相关功能

pub mod algorithm;
pub mod fingerprint;

pub use algorithm::{HashAlgorithm, HasherFunction};
pub use fingerprint::{false_positive_rate, FingerprintEncoder};

/// 默认哈希种子
pub const DEFAULT_SEED: u64 = 0;
