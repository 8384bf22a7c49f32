// ==========================================
// 学生转社分发系统 - 结果整理
// ==========================================
// 输入: 引擎最终状态 + 运行统计
// 输出: AllocationOutput（分发结果 / 剩余缺额 / 递补日志 / 交换纪录）
// ==========================================

use crate::domain::allocation::{AllocationOutput, AllocationRecord, AllocationStats};
use crate::domain::individual::Individual;
use crate::domain::types::{FinalRank, Outcome};
use crate::engine::state::AllocationState;
use chrono::Utc;
use uuid::Uuid;

pub struct ResultMaterializer;

impl ResultMaterializer {
    /// 单一学生结果
    ///
    /// outcome 只比较社团名称；录取原社团（志愿中的原社团）仍为 Unchanged
    pub fn record_for(individual: &Individual) -> AllocationRecord {
        let outcome = if individual.current_resource != individual.home_resource {
            Outcome::Changed
        } else {
            Outcome::Unchanged
        };

        AllocationRecord {
            id: individual.id.clone(),
            display_name: individual.display_name.clone(),
            class_label: individual.class_label.clone(),
            original_resource: individual.home_resource.clone(),
            final_resource: individual.current_resource.clone(),
            final_rank: FinalRank::from_rank(individual.current_rank),
            outcome,
        }
    }

    /// 整理完整输出（学生依优先序，社团依名册顺序，日志原样）
    pub fn materialize(state: &AllocationState, stats: AllocationStats) -> AllocationOutput {
        AllocationOutput {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            records: state.individuals.iter().map(Self::record_for).collect(),
            remaining: state.ledger.remaining_capacities(),
            move_log: state.move_log.clone(),
            swap_log: state.swap_log.clone(),
            stats,
        }
    }
}
