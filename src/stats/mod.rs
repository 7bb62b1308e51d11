//! 统计模块 - 统一管理过滤器操作指标

pub mod operation;
pub mod recorder;

pub use operation::{
    AtomicOperationStats, DisabledOperationRecorder, OperationRecorder, OperationStatsSnapshot,
};
pub use recorder::{DefaultStatsRecorder, DisabledStatsRecorder, StatsRecorder, StatsRecorderFactory};
