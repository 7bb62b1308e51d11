// src/stats/operation.rs
//! 操作统计 - 跟踪过滤器操作次数、命中和耗时

use crate::types::OperationType;
use std::{
    fmt::Write,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

/// 操作统计接口
pub trait OperationRecorder: Send + Sync {
    /// 记录操作，`success` 对插入表示成功，对查询/删除表示命中
    fn record(&self, op_type: OperationType, duration: Duration, success: bool);

    /// 记录一次插入产生的踢出次数
    fn record_kicks(&self, kicks: usize);

    /// 获取操作统计快照
    fn snapshot(&self) -> OperationStatsSnapshot;

    /// 重置统计
    fn reset(&self);

    /// 导出Prometheus格式指标
    fn export_prometheus(&self) -> String;
}

/// 操作统计快照
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OperationStatsSnapshot {
    pub insert_count: u64,
    pub insert_failures: u64,
    pub lookup_count: u64,
    pub lookup_hits: u64,
    pub delete_count: u64,
    pub delete_hits: u64,
    pub kick_count: u64,
    pub total_duration: u64, // 纳秒
}

impl OperationStatsSnapshot {
    pub fn count(&self, op_type: OperationType) -> u64 {
        match op_type {
            OperationType::Insert => self.insert_count,
            OperationType::Lookup => self.lookup_count,
            OperationType::Delete => self.delete_count,
        }
    }
}

/// 原子操作统计
#[derive(Debug, Default)]
pub struct AtomicOperationStats {
    insert_count: AtomicU64,
    insert_failures: AtomicU64,
    lookup_count: AtomicU64,
    lookup_hits: AtomicU64,
    delete_count: AtomicU64,
    delete_hits: AtomicU64,
    kick_count: AtomicU64,
    total_duration: AtomicU64, // 纳秒
}

impl AtomicOperationStats {
    /// 创建新统计
    pub fn new() -> Self {
        Self::default()
    }

    fn counters(&self) -> [&AtomicU64; 8] {
        [
            &self.insert_count,
            &self.insert_failures,
            &self.lookup_count,
            &self.lookup_hits,
            &self.delete_count,
            &self.delete_hits,
            &self.kick_count,
            &self.total_duration,
        ]
    }
}

impl OperationRecorder for AtomicOperationStats {
    fn record(&self, op_type: OperationType, duration: Duration, success: bool) {
        let (count, hit_or_failure) = match op_type {
            OperationType::Insert => (&self.insert_count, !success),
            OperationType::Lookup => (&self.lookup_count, success),
            OperationType::Delete => (&self.delete_count, success),
        };
        count.fetch_add(1, Ordering::Relaxed);

        if hit_or_failure {
            let counter = match op_type {
                OperationType::Insert => &self.insert_failures,
                OperationType::Lookup => &self.lookup_hits,
                _ => &self.delete_hits,
            };
            counter.fetch_add(1, Ordering::Relaxed);
        }

        self.total_duration
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    fn record_kicks(&self, kicks: usize) {
        self.kick_count.fetch_add(kicks as u64, Ordering::Relaxed);
    }

    fn snapshot(&self) -> OperationStatsSnapshot {
        OperationStatsSnapshot {
            insert_count: self.insert_count.load(Ordering::Relaxed),
            insert_failures: self.insert_failures.load(Ordering::Relaxed),
            lookup_count: self.lookup_count.load(Ordering::Relaxed),
            lookup_hits: self.lookup_hits.load(Ordering::Relaxed),
            delete_count: self.delete_count.load(Ordering::Relaxed),
            delete_hits: self.delete_hits.load(Ordering::Relaxed),
            kick_count: self.kick_count.load(Ordering::Relaxed),
            total_duration: self.total_duration.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        for counter in self.counters() {
            counter.store(0, Ordering::Relaxed);
        }
    }

    fn export_prometheus(&self) -> String {
        let snapshot = self.snapshot();
        let mut output = String::new();

        for op in OperationType::ALL {
            let name = format!("cuckoo_filter_{}_count", op.as_str());
            let _ = writeln!(output, "# HELP {name} Total {} operations", op.as_str());
            let _ = writeln!(output, "# TYPE {name} counter");
            let _ = writeln!(output, "{name} {}", snapshot.count(op));
        }

        let extra = [
            ("kick_count", "Total eviction kicks", snapshot.kick_count),
            ("insert_failures", "Inserts rejected because the filter was full", snapshot.insert_failures),
            ("lookup_hits", "Lookups that reported possibly present", snapshot.lookup_hits),
            ("delete_hits", "Deletes that removed a fingerprint", snapshot.delete_hits),
            ("total_duration", "Total operation duration (ns)", snapshot.total_duration),
        ];
        for (metric, help, value) in extra {
            let _ = writeln!(output, "# HELP cuckoo_filter_{metric} {help}");
            let _ = writeln!(output, "# TYPE cuckoo_filter_{metric} counter");
            let _ = writeln!(output, "cuckoo_filter_{metric} {value}");
        }

        output
    }
}

/// 禁用操作统计实现
#[derive(Debug, Default)]
pub struct DisabledOperationRecorder;

impl OperationRecorder for DisabledOperationRecorder {
    fn record(&self, _op_type: OperationType, _duration: Duration, _success: bool) {}
    fn record_kicks(&self, _kicks: usize) {}
    fn snapshot(&self) -> OperationStatsSnapshot {
        OperationStatsSnapshot::default()
    }
    fn reset(&self) {}
    fn export_prometheus(&self) -> String {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_counts_and_hits() {
        let stats = AtomicOperationStats::new();
        let d = Duration::from_nanos(10);
        stats.record(OperationType::Insert, d, true);
        stats.record(OperationType::Insert, d, false);
        stats.record(OperationType::Lookup, d, true);
        stats.record(OperationType::Lookup, d, false);
        stats.record(OperationType::Delete, d, false);
        stats.record_kicks(5);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.insert_count, 2);
        assert_eq!(snapshot.insert_failures, 1);
        assert_eq!(snapshot.lookup_count, 2);
        assert_eq!(snapshot.lookup_hits, 1);
        assert_eq!(snapshot.delete_count, 1);
        assert_eq!(snapshot.delete_hits, 0);
        assert_eq!(snapshot.kick_count, 5);
        assert_eq!(snapshot.total_duration, 50);
    }

    #[test]
    fn test_reset() {
        let stats = AtomicOperationStats::new();
        stats.record(OperationType::Lookup, Duration::from_micros(1), true);
        stats.reset();
        assert_eq!(stats.snapshot(), OperationStatsSnapshot::default());
    }

    #[test]
    fn test_export_prometheus() {
        let stats = AtomicOperationStats::new();
        stats.record(OperationType::Insert, Duration::ZERO, true);
        let text = stats.export_prometheus();
        assert!(text.contains("# TYPE cuckoo_filter_insert_count counter"));
        assert!(text.contains("cuckoo_filter_insert_count 1\n"));
        assert!(text.contains("cuckoo_filter_insert_failures 0\n"));
        assert!(text.contains("# TYPE cuckoo_filter_kick_count counter"));
    }

    #[test]
    fn test_disabled_recorder() {
        let stats = DisabledOperationRecorder;
        stats.record(OperationType::Insert, Duration::from_secs(1), true);
        assert_eq!(stats.snapshot(), OperationStatsSnapshot::default());
        assert!(stats.export_prometheus().is_empty());
    }
}
