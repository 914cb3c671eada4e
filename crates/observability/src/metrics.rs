//! Pairing 指标收集模块
//!
//! 会话内部按阶段记录 Prometheus 指标；此处负责跨尝试的汇总统计。

use std::collections::HashMap;
use std::time::Duration;

use contracts::{BlockReason, Decision, PairingOutcome};
use metrics::{counter, gauge, histogram};

/// 记录对端连接
pub fn record_peer_connected(role: &str) {
    counter!("pairing_peer_connections_total", "role" => role.to_string()).increment(1);
}

/// 记录一次运行（多次尝试）的结束
///
/// `attempts` 为实际执行的尝试次数。
pub fn record_run_finished(decision: Decision, attempts: u64) {
    counter!("pairing_runs_total", "outcome" => decision.as_str()).increment(1);
    histogram!("pairing_attempts_per_run").record(attempts as f64);
    gauge!("pairing_last_run_secure").set(if decision == Decision::Secure { 1.0 } else { 0.0 });
}

/// 记录离线指纹推导
pub fn record_fingerprint_derived(bits: usize) {
    counter!("pairing_offline_fingerprints_total").increment(1);
    gauge!("pairing_offline_fingerprint_bits").set(bits as f64);
}

/// Pairing 指标聚合器
///
/// 在内存中聚合每次尝试的结果，便于输出摘要。
#[derive(Debug, Clone, Default)]
pub struct PairingMetricsAggregator {
    /// 尝试总数
    pub total_attempts: u64,

    /// 各决策计数
    pub decisions: HashMap<Decision, u64>,

    /// 被阻止原因计数
    pub block_reasons: HashMap<BlockReason, u64>,

    /// 出现短周期的尝试数
    pub short_cycle_attempts: u64,

    /// 相似度统计
    pub similarity_stats: RunningStats,

    /// 步态周期数统计
    pub cycle_stats: RunningStats,

    /// 尝试耗时统计 (毫秒)
    pub duration_stats: RunningStats,
}

impl PairingMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(
        &mut self,
        outcome: &PairingOutcome,
        cycles: usize,
        short_cycle_found: bool,
        elapsed: Duration,
    ) {
        self.total_attempts += 1;
        *self.decisions.entry(outcome.decision).or_insert(0) += 1;
        if let Some(reason) = outcome.reason {
            *self.block_reasons.entry(reason).or_insert(0) += 1;
        }
        if short_cycle_found {
            self.short_cycle_attempts += 1;
        }
        if let Some(similarity) = outcome.similarity {
            self.similarity_stats.push(similarity);
        }
        self.cycle_stats.push(cycles as f64);
        self.duration_stats.push(elapsed.as_secs_f64() * 1000.0);
    }

    /// 某决策出现的次数
    pub fn count(&self, decision: Decision) -> u64 {
        self.decisions.get(&decision).copied().unwrap_or(0)
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        let secure = self.count(Decision::Secure);
        MetricsSummary {
            total_attempts: self.total_attempts,
            secure,
            blocked: self.count(Decision::Blocked),
            failed: self.count(Decision::Failed),
            errored: self.count(Decision::Errored),
            secure_rate: if self.total_attempts > 0 {
                secure as f64 / self.total_attempts as f64 * 100.0
            } else {
                0.0
            },
            short_cycle_attempts: self.short_cycle_attempts,
            similarity: StatsSummary::from(&self.similarity_stats),
            cycles: StatsSummary::from(&self.cycle_stats),
            duration_ms: StatsSummary::from(&self.duration_stats),
            block_reasons: self.block_reasons.clone(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_attempts: u64,
    pub secure: u64,
    pub blocked: u64,
    pub failed: u64,
    pub errored: u64,
    pub secure_rate: f64,
    pub short_cycle_attempts: u64,
    pub similarity: StatsSummary,
    pub cycles: StatsSummary,
    pub duration_ms: StatsSummary,
    pub block_reasons: HashMap<BlockReason, u64>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Pairing Summary ===")?;
        writeln!(f, "Attempts: {}", self.total_attempts)?;
        writeln!(f, "Secure: {} ({:.2}%)", self.secure, self.secure_rate)?;
        writeln!(
            f,
            "Blocked: {}, failed: {}, errored: {}",
            self.blocked, self.failed, self.errored
        )?;
        writeln!(f, "Attempts with short cycles: {}", self.short_cycle_attempts)?;
        writeln!(f, "Similarity: {}", self.similarity)?;
        writeln!(f, "Gait cycles: {}", self.cycles)?;
        writeln!(f, "Attempt duration (ms): {}", self.duration_ms)?;

        if !self.block_reasons.is_empty() {
            writeln!(f, "Block reasons:")?;
            let mut reasons: Vec<_> = self.block_reasons.iter().collect();
            reasons.sort_by_key(|(reason, _)| format!("{reason:?}"));
            for (reason, count) in reasons {
                writeln!(f, "  {:?}: {}", reason, count)?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            self.m2 += delta * (value - self.mean);
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();
        for v in [0.5, 0.75, 1.0] {
            stats.push(v);
        }

        assert_eq!(stats.count(), 3);
        assert!((stats.mean() - 0.75).abs() < 1e-12);
        assert!((stats.min() - 0.5).abs() < 1e-12);
        assert!((stats.max() - 1.0).abs() < 1e-12);
        assert!((stats.variance() - 0.0625).abs() < 1e-12);
    }

    #[test]
    fn test_aggregator_update() {
        let mut aggregator = PairingMetricsAggregator::new();
        aggregator.update(
            &PairingOutcome::secure(0.9, 48),
            12,
            false,
            Duration::from_millis(30),
        );
        aggregator.update(
            &PairingOutcome::blocked(BlockReason::LowSimilarity, "low").with_similarity(0.5),
            11,
            true,
            Duration::from_millis(40),
        );
        aggregator.update(
            &PairingOutcome::errored("peer closed"),
            12,
            false,
            Duration::from_millis(10),
        );

        assert_eq!(aggregator.total_attempts, 3);
        assert_eq!(aggregator.count(Decision::Secure), 1);
        assert_eq!(aggregator.count(Decision::Failed), 0);
        assert_eq!(aggregator.short_cycle_attempts, 1);
        assert_eq!(aggregator.similarity_stats.count(), 2);
        assert_eq!(aggregator.block_reasons.get(&BlockReason::LowSimilarity), Some(&1));

        let summary = aggregator.summary();
        assert_eq!(summary.errored, 1);
        assert!((summary.secure_rate - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_display() {
        let mut aggregator = PairingMetricsAggregator::new();
        aggregator.update(
            &PairingOutcome::blocked(BlockReason::TooFewAlignedBits, "31 < 32").with_aligned_bits(31),
            7,
            false,
            Duration::from_millis(5),
        );
        let output = aggregator.summary().to_string();
        assert!(output.contains("Attempts: 1"));
        assert!(output.contains("Secure: 0 (0.00%)"));
        assert!(output.contains("TooFewAlignedBits: 1"));
        assert!(output.contains("Similarity: N/A"));
    }
}
