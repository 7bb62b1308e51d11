// src/stats/recorder.rs
//! 统计记录器接口 - 定义统一统计API

use std::{sync::Arc, time::Duration};

use crate::{
    stats::operation::{
        AtomicOperationStats, DisabledOperationRecorder, OperationRecorder, OperationStatsSnapshot,
    },
    types::OperationType,
};

/// 统计记录器特征
pub trait StatsRecorder: Send + Sync {
    /// 记录操作
    fn record_operation(&self, op_type: OperationType, duration: Duration, success: bool);

    /// 记录踢出次数
    fn record_kicks(&self, kicks: usize);

    /// 获取操作统计接口
    fn operation_stats(&self) -> &dyn OperationRecorder;

    /// 获取操作统计快照
    fn operation_stats_snapshot(&self) -> OperationStatsSnapshot {
        self.operation_stats().snapshot()
    }

    /// 重置所有统计
    fn reset(&self) {
        self.operation_stats().reset();
    }

    /// 导出Prometheus格式指标
    fn export_prometheus(&self) -> String {
        self.operation_stats().export_prometheus()
    }
}

/// 默认统计记录器实现
#[derive(Debug, Default)]
pub struct DefaultStatsRecorder {
    operation: AtomicOperationStats,
}

impl DefaultStatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatsRecorder for DefaultStatsRecorder {
    fn record_operation(&self, op_type: OperationType, duration: Duration, success: bool) {
        self.operation.record(op_type, duration, success);
    }

    fn record_kicks(&self, kicks: usize) {
        self.operation.record_kicks(kicks);
    }

    fn operation_stats(&self) -> &dyn OperationRecorder {
        &self.operation
    }
}

/// 禁用统计的记录器
#[derive(Debug, Default)]
pub struct DisabledStatsRecorder;

impl StatsRecorder for DisabledStatsRecorder {
    fn record_operation(&self, _op_type: OperationType, _duration: Duration, _success: bool) {}

    fn record_kicks(&self, _kicks: usize) {}

    fn operation_stats(&self) -> &dyn OperationRecorder {
        &DisabledOperationRecorder
    }
}

/// 统计记录器工厂
pub struct StatsRecorderFactory;

impl StatsRecorderFactory {
    /// 创建默认记录器
    pub fn create_default() -> Arc<dyn StatsRecorder> {
        Arc::new(DefaultStatsRecorder::new())
    }

    /// 创建禁用统计的记录器
    pub fn create_disabled() -> Arc<dyn StatsRecorder> {
        Arc::new(DisabledStatsRecorder)
    }
}
