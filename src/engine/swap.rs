// ==========================================
// 学生转社分发系统 - 交换最佳化引擎
// ==========================================
// 职责: 连锁递补结束后，找出两两互换可同时改善的学生对
// 红线: 交换为一对一，不检查容量；每次交换双方志愿序都严格变好
// ==========================================
// 限制: 只处理两人交换；三人以上的交换循环不会被发现
// ==========================================

use crate::domain::allocation::SwapLogEntry;
use crate::engine::events::{AllocationPhase, OptionalProgressObserver, ProgressEvent};
use crate::engine::state::AllocationState;
use tracing::{debug, info, instrument};

/// 交换最佳化执行摘要
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapReport {
    pub passes: usize,
    pub swaps: usize,
    pub budget: usize,
    /// 用完轮数上限时最后一轮仍有交换
    pub limit_reached: bool,
}

// ==========================================
// SwapOptimizer - 交换最佳化
// ==========================================
pub struct SwapOptimizer {
    budget: usize,
    observer: OptionalProgressObserver,
}

impl SwapOptimizer {
    /// # 参数
    /// - budget: 全轮扫描次数上限
    pub fn new(budget: usize) -> Self {
        Self {
            budget,
            observer: OptionalProgressObserver::none(),
        }
    }

    pub fn with_observer(mut self, observer: OptionalProgressObserver) -> Self {
        self.observer = observer;
        self
    }

    /// 反复执行全轮两两扫描，直到某一轮没有任何交换
    #[instrument(skip(self, state), fields(individuals_count = state.individuals.len()))]
    pub fn run(&self, state: &mut AllocationState) -> SwapReport {
        let mut passes = 0;
        let mut swaps = 0;
        let mut converged = false;

        while passes < self.budget {
            passes += 1;
            self.observer.notify(ProgressEvent {
                phase: AllocationPhase::SwapOptimization,
                pass: passes,
                budget: self.budget,
            });

            let swapped = self.run_pass(state);
            swaps += swapped;
            if swapped == 0 {
                converged = true;
                break;
            }
        }

        let report = SwapReport {
            passes,
            swaps,
            budget: self.budget,
            limit_reached: !converged,
        };

        info!(
            passes = report.passes,
            swaps = report.swaps,
            limit_reached = report.limit_reached,
            "交换最佳化完成"
        );

        report
    }

    /// 单轮: 依序检查所有 (i, j) 组合，本轮内交换后继续扫描
    ///
    /// # 返回
    /// 本轮交换次数
    pub fn run_pass(&self, state: &mut AllocationState) -> usize {
        let n = state.individuals.len();
        let mut swaps = 0;

        for i in 0..n {
            if state.individuals[i].holds_first_choice() {
                continue;
            }
            for j in 0..n {
                if i == j {
                    continue;
                }
                if let Some(entry) = Self::try_swap(state, i, j) {
                    state.swap_log.push(entry);
                    swaps += 1;
                }
            }
        }

        swaps
    }

    /// 检查 i、j 是否可互换并执行
    ///
    /// # 条件
    /// - 双方都未录取第一志愿，且不在同一社团
    /// - j 的社团在 i 的志愿中严格优于 i 目前志愿序
    /// - i 的社团在 j 的志愿中严格优于 j 目前志愿序
    fn try_swap(state: &mut AllocationState, i: usize, j: usize) -> Option<SwapLogEntry> {
        let (a, b) = (&state.individuals[i], &state.individuals[j]);

        if a.holds_first_choice() || b.holds_first_choice() {
            return None;
        }
        if a.current_resource == b.current_resource {
            return None;
        }

        let rank_a = a
            .preference_index(&b.current_resource)
            .filter(|&r| a.improves_on(r))?;
        let rank_b = b
            .preference_index(&a.current_resource)
            .filter(|&r| b.improves_on(r))?;

        let entry = SwapLogEntry {
            individual_id_1: a.id.clone(),
            display_name_1: a.display_name.clone(),
            individual_id_2: b.id.clone(),
            display_name_2: b.display_name.clone(),
            resource_1: a.current_resource.clone(),
            resource_2: b.current_resource.clone(),
        };

        state.ledger.exchange(
            &entry.individual_id_1,
            &entry.resource_1,
            &entry.individual_id_2,
            &entry.resource_2,
        );
        state.individuals[i].assign(&entry.resource_2, rank_a);
        state.individuals[j].assign(&entry.resource_1, rank_b);

        debug!(
            individual_1 = %entry.individual_id_1,
            individual_2 = %entry.individual_id_2,
            resource_1 = %entry.resource_1,
            resource_2 = %entry.resource_2,
            "交换"
        );

        Some(entry)
    }
}
