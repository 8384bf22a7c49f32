// ==========================================
// 学生转社分发系统 - 分发结果模型
// ==========================================
// 职责: 分发结果、剩余缺额、递补日志、交换纪录
// 用途: 引擎产出，导出层只读
// ==========================================

use crate::domain::types::{FinalRank, Outcome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ==========================================
// AllocationRecord - 单一学生分发结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRecord {
    pub id: String,
    pub display_name: String,
    pub class_label: String,
    pub original_resource: String,
    pub final_resource: String,
    pub final_rank: FinalRank,
    pub outcome: Outcome,
}

// ==========================================
// RemainingCapacity - 社团剩余缺额
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemainingCapacity {
    pub resource_name: String,
    pub remaining_capacity: u32,
}

// ==========================================
// MoveLogEntry - 递补日志
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveLogEntry {
    pub iteration: usize,
    pub individual_id: String,
    pub display_name: String,
    pub from_resource: String,
    pub to_resource: String,
    pub preference_rank: usize, // 1-based
}

impl fmt::Display for MoveLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{}: {} ({}) 从 [{}] 转入 [{}] (志愿{})",
            self.iteration,
            self.display_name,
            self.individual_id,
            self.from_resource,
            self.to_resource,
            self.preference_rank
        )
    }
}

// ==========================================
// SwapLogEntry - 交换纪录
// ==========================================
// resource_1 为交换前 individual_1 所在社团
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapLogEntry {
    pub individual_id_1: String,
    pub display_name_1: String,
    pub individual_id_2: String,
    pub display_name_2: String,
    pub resource_1: String,
    pub resource_2: String,
}

impl fmt::Display for SwapLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) <-> {} ({}) : {} <-> {}",
            self.display_name_1,
            self.individual_id_1,
            self.display_name_2,
            self.individual_id_2,
            self.resource_1,
            self.resource_2
        )
    }
}

// ==========================================
// AllocationStats - 运行统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationStats {
    pub individuals: usize,
    pub resources: usize,
    pub moves: usize,
    pub swaps: usize,
    pub chain_iterations: usize,
    pub chain_budget: usize,
    pub budget_exhausted: bool, // 连锁递补在预算内未达不动点
    pub swap_passes: usize,
    pub swap_limit_reached: bool,
}

// ==========================================
// AllocationOutput - 一次分发的完整输出
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationOutput {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub records: Vec<AllocationRecord>,
    pub remaining: Vec<RemainingCapacity>,
    pub move_log: Vec<MoveLogEntry>,
    pub swap_log: Vec<SwapLogEntry>,
    pub stats: AllocationStats,
}

impl AllocationOutput {
    /// 成功转社名单
    pub fn transferred(&self) -> impl Iterator<Item = &AllocationRecord> {
        self.records
            .iter()
            .filter(|r| r.outcome == Outcome::Changed)
    }

    /// 按学号查询结果
    pub fn record(&self, id: &str) -> Option<&AllocationRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// 可读审计日志（先递补后交换）
    pub fn audit_lines(&self) -> Vec<String> {
        self.move_log
            .iter()
            .map(|m| m.to_string())
            .chain(self.swap_log.iter().map(|s| s.to_string()))
            .collect()
    }
}
