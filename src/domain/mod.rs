// ==========================================
// 学生转社分发系统 - 领域模型层
// ==========================================
// 职责: 定义学生、社团、分发结果等领域实体与类型
// 红线: 不含文件读写逻辑,不含引擎逻辑
// ==========================================

pub mod allocation;
pub mod individual;
pub mod resource;
pub mod types;

// 重导出核心类型
pub use allocation::{
    AllocationOutput, AllocationRecord, AllocationStats, MoveLogEntry, RemainingCapacity,
    SwapLogEntry,
};
pub use individual::{order_by_submission, Individual, IndividualRecord};
pub use resource::{QuotaRecord, Resource};
pub use types::{Cohort, FinalRank, Outcome};
