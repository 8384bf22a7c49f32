// ==========================================
// 学生转社分发系统 - 引擎编排器
// ==========================================
// 用途: 协调各引擎的执行顺序
// 流程: 前置检查 → 排序 → 年级判定/志愿过滤 → 建立名册
//       → 连锁递补 → 交换最佳化 → 整理结果
// ==========================================

use crate::config::AllocationConfig;
use crate::domain::allocation::{AllocationOutput, AllocationStats};
use crate::domain::individual::{order_by_submission, IndividualRecord};
use crate::domain::resource::QuotaRecord;
use crate::engine::chain_reaction::ChainReactionAllocator;
use crate::engine::events::{
    AllocationProgressObserver, OptionalProgressObserver, TracingProgressObserver,
};
use crate::engine::materializer::ResultMaterializer;
use crate::engine::preference::PreferenceListBuilder;
use crate::engine::state::AllocationState;
use crate::engine::swap::SwapOptimizer;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument};

/// 编排层错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error("学号重复，无法分发: {0}")]
    DuplicateIndividualId(String),
}

// ==========================================
// AllocationOrchestrator - 引擎编排器
// ==========================================
pub struct AllocationOrchestrator {
    config: AllocationConfig,
    observer: OptionalProgressObserver,
}

impl AllocationOrchestrator {
    /// 默认以 tracing 输出进度（间隔取自配置）
    pub fn new(config: AllocationConfig) -> Self {
        let observer = OptionalProgressObserver::with_observer(Arc::new(
            TracingProgressObserver::new(config.progress_report_interval),
        ));
        Self { config, observer }
    }

    pub fn with_observer(mut self, observer: Arc<dyn AllocationProgressObserver>) -> Self {
        self.observer = OptionalProgressObserver::with_observer(observer);
        self
    }

    pub fn config(&self) -> &AllocationConfig {
        &self.config
    }

    /// 建立初始状态（尚未执行任何异动）
    ///
    /// 学号唯一为前置条件，重复时直接拒绝
    pub fn prepare(
        &self,
        mut records: Vec<IndividualRecord>,
        quotas: &[QuotaRecord],
    ) -> Result<AllocationState, AllocationError> {
        let mut seen = HashSet::new();
        for record in &records {
            let id = record.id.trim();
            if !seen.insert(id.to_string()) {
                return Err(AllocationError::DuplicateIndividualId(id.to_string()));
            }
        }

        order_by_submission(&mut records);

        let builder = PreferenceListBuilder::new(
            self.config.eligibility.rules(),
            self.config.max_preference_slots,
        );
        let individuals = builder.build_all(&records);

        Ok(AllocationState::new(individuals, quotas))
    }

    /// 执行完整分发流程
    #[instrument(skip(self, records, quotas), fields(
        records_count = records.len(),
        quotas_count = quotas.len()
    ))]
    pub fn execute(
        &self,
        records: Vec<IndividualRecord>,
        quotas: &[QuotaRecord],
    ) -> Result<AllocationOutput, AllocationError> {
        // ==========================================
        // 步骤1: 初始化
        // ==========================================
        let mut state = self.prepare(records, quotas)?;

        info!(
            individuals = state.individuals.len(),
            resources = state.ledger.len(),
            "分发初始化完成"
        );

        // ==========================================
        // 步骤2: 连锁递补
        // ==========================================
        debug!("步骤2: 执行连锁递补");
        let chain = ChainReactionAllocator::new(self.config.iteration_budget)
            .with_observer(self.observer.clone())
            .run(&mut state);

        // ==========================================
        // 步骤3: 交换最佳化
        // ==========================================
        debug!("步骤3: 执行交换最佳化");
        let swap = SwapOptimizer::new(self.config.swap_budget(state.individuals.len()))
            .with_observer(self.observer.clone())
            .run(&mut state);

        // ==========================================
        // 步骤4: 整理结果
        // ==========================================
        let stats = AllocationStats {
            individuals: state.individuals.len(),
            resources: state.ledger.len(),
            moves: state.move_log.len(),
            swaps: state.swap_log.len(),
            chain_iterations: chain.passes,
            chain_budget: chain.budget,
            budget_exhausted: chain.budget_exhausted,
            swap_passes: swap.passes,
            swap_limit_reached: swap.limit_reached,
        };

        let output = ResultMaterializer::materialize(&state, stats);

        info!(
            run_id = %output.run_id,
            moves = output.stats.moves,
            swaps = output.stats.swaps,
            transferred = output.transferred().count(),
            "分发完成"
        );

        Ok(output)
    }
}

impl Default for AllocationOrchestrator {
    fn default() -> Self {
        Self::new(AllocationConfig::default())
    }
}
