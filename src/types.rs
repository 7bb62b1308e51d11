//! 核心类型定义 - 指纹、桶大小和操作类型

use std::fmt;

use crate::error::FilterError;

/// 指纹类型 - 最多64位无符号整数，0 保留为空槽位
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// 空槽位
    pub const EMPTY: Fingerprint = Fingerprint(0);

    /// 计算结果为 0 时使用的替代值
    pub const SENTINEL: Fingerprint = Fingerprint(1);

    /// 创建新指纹，0 会被映射为 `SENTINEL`
    pub const fn new(value: u64) -> Self {
        if value == 0 {
            Self::SENTINEL
        } else {
            Self(value)
        }
    }

    /// 返回零指纹（表示空槽位）
    pub const fn zero() -> Self {
        Self::EMPTY
    }

    /// 从哈希值的低 `bits` 位创建指纹
    pub fn from_hash(hash: u64, bits: u32) -> Self {
        Self::new(hash & bit_mask(bits))
    }

    /// 获取指纹值
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// 检查是否为零（空槽位）
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// 指纹的小端字节表示，截断为 `ceil(bits / 8)` 字节
    pub fn to_bytes(self, bits: u32) -> ([u8; 8], usize) {
        (self.0.to_le_bytes(), byte_len(bits))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:X}", self.0)
    }
}

/// 低 `bits` 位的掩码，`bits >= 64` 时为全 1
#[inline]
pub fn bit_mask(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// 存放 `bits` 位所需的字节数
#[inline]
pub fn byte_len(bits: u32) -> usize {
    (bits.clamp(1, 64) as usize + 7) / 8
}

/// 每个桶的槽位数量
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BucketSize {
    One = 1,
    Two = 2,
    #[default]
    Four = 4,
    Eight = 8,
}

impl BucketSize {
    /// 槽位数量
    pub const fn slots(self) -> usize {
        self as usize
    }

    /// 该桶大小下保证误判率的最大负载因子（百分比）
    ///
    /// 数值来自 cuckoo filter 论文的实验结果。
    pub const fn load_factor_percent(self) -> usize {
        match self {
            BucketSize::One => 50,
            BucketSize::Two => 84,
            BucketSize::Four => 95,
            BucketSize::Eight => 98,
        }
    }
}

impl TryFrom<usize> for BucketSize {
    type Error = FilterError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(BucketSize::One),
            2 => Ok(BucketSize::Two),
            4 => Ok(BucketSize::Four),
            8 => Ok(BucketSize::Eight),
            other => Err(FilterError::invalid_config(format!(
                "不支持的桶大小 {other}，只能是 1/2/4/8"
            ))),
        }
    }
}

impl fmt::Display for BucketSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slots())
    }
}

/// 操作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    Insert,
    Lookup,
    Delete,
}

impl OperationType {
    pub const ALL: [OperationType; 3] = [
        OperationType::Insert,
        OperationType::Lookup,
        OperationType::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Insert => "insert",
            OperationType::Lookup => "lookup",
            OperationType::Delete => "delete",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_zero_remapped() {
        assert_eq!(Fingerprint::new(0), Fingerprint::SENTINEL);
        assert_eq!(Fingerprint::from_hash(0xFF00, 8), Fingerprint::SENTINEL);
        assert_eq!(Fingerprint::from_hash(0xFF12, 8).as_u64(), 0x12);
        assert!(Fingerprint::zero().is_zero());
        assert!(!Fingerprint::new(0).is_zero());
    }

    #[test]
    fn test_fingerprint_full_width() {
        let fp = Fingerprint::from_hash(u64::MAX, 64);
        assert_eq!(fp.as_u64(), u64::MAX);
        let (bytes, len) = fp.to_bytes(64);
        assert_eq!(len, 8);
        assert_eq!(bytes, [0xFF; 8]);
    }

    #[test]
    fn test_bit_mask_and_byte_len() {
        assert_eq!(bit_mask(1), 0b1);
        assert_eq!(bit_mask(12), 0xFFF);
        assert_eq!(bit_mask(64), u64::MAX);
        assert_eq!(byte_len(1), 1);
        assert_eq!(byte_len(8), 1);
        assert_eq!(byte_len(9), 2);
        assert_eq!(byte_len(64), 8);
    }

    #[test]
    fn test_bucket_size_conversion() {
        assert_eq!(BucketSize::try_from(1).unwrap(), BucketSize::One);
        assert_eq!(BucketSize::try_from(8).unwrap().slots(), 8);
        assert!(BucketSize::try_from(3).is_err());
        assert!(BucketSize::try_from(0).is_err());
        assert!(BucketSize::try_from(16).unwrap_err().is_config_error());
    }

    #[test]
    fn test_load_factor_table() {
        assert_eq!(BucketSize::One.load_factor_percent(), 50);
        assert_eq!(BucketSize::Two.load_factor_percent(), 84);
        assert_eq!(BucketSize::Four.load_factor_percent(), 95);
        assert_eq!(BucketSize::Eight.load_factor_percent(), 98);
    }
}
