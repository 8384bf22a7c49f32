// ==========================================
// 学生转社分发系统 - 单次分发运行状态
// ==========================================
// 红线: 每次分发独占一份名册，不与其他运行共享
// ==========================================

use crate::domain::allocation::{MoveLogEntry, SwapLogEntry};
use crate::domain::individual::Individual;
use crate::domain::resource::QuotaRecord;
use crate::engine::ledger::{CapacityLedger, LedgerViolation};

/// 学生列表（固定优先序）+ 名册 + 两份审计日志
#[derive(Debug, Clone)]
pub struct AllocationState {
    pub individuals: Vec<Individual>,
    pub ledger: CapacityLedger,
    pub move_log: Vec<MoveLogEntry>,
    pub swap_log: Vec<SwapLogEntry>,
    /// 已执行的连锁递补轮数（跨多次 run 累计）
    pub iteration: usize,
}

impl AllocationState {
    /// individuals 须已依填写时间排序
    pub fn new(individuals: Vec<Individual>, quotas: &[QuotaRecord]) -> Self {
        let ledger = CapacityLedger::new(quotas, &individuals);
        Self {
            individuals,
            ledger,
            move_log: Vec::new(),
            swap_log: Vec::new(),
            iteration: 0,
        }
    }

    pub fn individual(&self, id: &str) -> Option<&Individual> {
        self.individuals.iter().find(|i| i.id == id)
    }

    /// 名册一致性检查
    pub fn verify(&self) -> Result<(), LedgerViolation> {
        self.ledger.verify(&self.individuals)
    }
}
