// ==========================================
// 学生转社分发系统 - 连锁递补引擎
// ==========================================
// 职责: 依填写时间优先序反复递补，直到不动点或轮数上限
// 红线: 任何一次异动后立即从第 1 位学生重新扫描（严格优先权）
// ==========================================
// 每轮: 依序检查学生，找出第一个比目前更好、且尚有空位的志愿；
//       找到即异动并结束本轮。一轮无人异动即达不动点。
// ==========================================

use crate::config::IterationBudget;
use crate::domain::allocation::MoveLogEntry;
use crate::engine::events::{AllocationPhase, OptionalProgressObserver, ProgressEvent};
use crate::engine::state::AllocationState;
use tracing::{debug, info, instrument};

/// 单轮扫描结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// 本轮有一位学生异动（已记入递补日志）
    Moved(MoveLogEntry),
    /// 本轮无人异动，已达不动点
    Stable,
}

/// 连锁递补执行摘要
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainReactionReport {
    pub passes: usize,
    pub moves: usize,
    pub budget: usize,
    /// 用完轮数上限仍未达不动点
    pub budget_exhausted: bool,
}

// ==========================================
// ChainReactionAllocator - 连锁递补引擎
// ==========================================
pub struct ChainReactionAllocator {
    budget: IterationBudget,
    observer: OptionalProgressObserver,
}

impl ChainReactionAllocator {
    pub fn new(budget: IterationBudget) -> Self {
        Self {
            budget,
            observer: OptionalProgressObserver::none(),
        }
    }

    pub fn with_observer(mut self, observer: OptionalProgressObserver) -> Self {
        self.observer = observer;
        self
    }

    /// 本次运行的轮数上限
    pub fn budget_for(&self, state: &AllocationState) -> usize {
        self.budget.for_individuals(state.individuals.len())
    }

    /// 执行至不动点或轮数上限
    ///
    /// 轮数上限为经验值；达到上限时保留当下状态，属正常结束
    #[instrument(skip(self, state), fields(
        individuals_count = state.individuals.len(),
        resources_count = state.ledger.len()
    ))]
    pub fn run(&self, state: &mut AllocationState) -> ChainReactionReport {
        let budget = self.budget_for(state);
        let mut passes = 0;
        let mut moves = 0;
        let mut reached_fixed_point = false;

        while passes < budget {
            passes += 1;
            self.observer.notify(ProgressEvent {
                phase: AllocationPhase::ChainReaction,
                pass: passes,
                budget,
            });

            match self.run_pass(state) {
                PassOutcome::Moved(_) => moves += 1,
                PassOutcome::Stable => {
                    reached_fixed_point = true;
                    break;
                }
            }
        }

        let report = ChainReactionReport {
            passes,
            moves,
            budget,
            budget_exhausted: !reached_fixed_point,
        };

        info!(
            passes = report.passes,
            moves = report.moves,
            budget = report.budget,
            budget_exhausted = report.budget_exhausted,
            "连锁递补完成"
        );

        report
    }

    /// 执行单轮扫描
    ///
    /// 外部若需取消，只能在两轮之间判断，不可中断单轮
    pub fn run_pass(&self, state: &mut AllocationState) -> PassOutcome {
        state.iteration += 1;
        let iteration = state.iteration;

        for idx in 0..state.individuals.len() {
            if let Some(entry) = Self::try_improve(state, idx, iteration) {
                state.move_log.push(entry.clone());
                return PassOutcome::Moved(entry);
            }
        }

        PassOutcome::Stable
    }

    /// 为第 idx 位学生寻找更好的志愿，有则异动
    fn try_improve(
        state: &mut AllocationState,
        idx: usize,
        iteration: usize,
    ) -> Option<MoveLogEntry> {
        let individual = &state.individuals[idx];

        let rank = (0..individual.search_bound())
            .find(|&i| state.ledger.has_vacancy(&individual.preferences[i]))?;

        let entry = MoveLogEntry {
            iteration,
            individual_id: individual.id.clone(),
            display_name: individual.display_name.clone(),
            from_resource: individual.current_resource.clone(),
            to_resource: individual.preferences[rank].clone(),
            preference_rank: rank + 1,
        };

        state
            .ledger
            .transfer(&entry.individual_id, &entry.from_resource, &entry.to_resource);
        state.individuals[idx].assign(&entry.to_resource, rank);

        debug!(
            iteration,
            individual_id = %entry.individual_id,
            from = %entry.from_resource,
            to = %entry.to_resource,
            preference_rank = entry.preference_rank,
            "递补异动"
        );

        Some(entry)
    }
}

impl Default for ChainReactionAllocator {
    fn default() -> Self {
        Self::new(IterationBudget::default())
    }
}
