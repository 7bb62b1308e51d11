//! 统一错误处理 - 过滤器可能出现的错误类型和恢复建议

/// Cuckoo过滤器可能发生的错误
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    /// 构造参数无效，不会产生过滤器
    #[error("无效配置: {reason}")]
    InvalidConfig {
        reason: String,
    },

    /// 踢出路径耗尽仍未找到空槽位，表状态已回滚
    #[error("过滤器已满，无法插入新条目 (桶数量: {bucket_count}, 当前条目: {len}, 最大踢出次数: {max_retries})")]
    FilterFull {
        bucket_count: usize,
        len: usize,
        max_retries: usize,
    },
}

impl FilterError {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// 获取错误恢复建议
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Self::InvalidConfig { .. } => Some("检查配置参数: accuracy 必须在 (0,1) 内，bucket_size 只能是 1/2/4/8"),
            Self::FilterFull { .. } => Some("稍后重试、丢弃该条目，或用更大的 item_count 重建过滤器"),
        }
    }

    /// 判断错误是否可恢复
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::FilterFull { .. })
    }

    /// 判断是否为配置错误
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidConfig { .. })
    }
}
