// ==========================================
// 学生转社分发系统 - 社团名册（容量账本）
// ==========================================
// 职责: 社团容量与成员名单的唯一记帐处
// 红线: 任一时刻 成员数 ≤ 总容量；总容量初始化后不可变
// ==========================================

use crate::domain::allocation::RemainingCapacity;
use crate::domain::individual::Individual;
use crate::domain::resource::{QuotaRecord, Resource};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// 名册一致性检查失败
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerViolation {
    #[error("社团 {resource} 超额: 成员 {occupancy} > 容量 {capacity}")]
    OverCapacity {
        resource: String,
        occupancy: usize,
        capacity: u32,
    },

    #[error("学生 {individual} 名册不一致: 记录社团 {recorded}, 名册所在 {found:?}")]
    MembershipMismatch {
        individual: String,
        recorded: String,
        found: Vec<String>,
    },
}

// ==========================================
// CapacityLedger - 社团名册
// ==========================================
#[derive(Debug, Clone)]
pub struct CapacityLedger {
    resources: Vec<Resource>,
    index: HashMap<String, usize>,
}

impl CapacityLedger {
    /// 建立名册
    ///
    /// # 规则
    /// 1. 缺额设定依 trim 后名称加总（名称排序）
    /// 2. 原社团不在设定中者自动补上（缺额 0，依学生顺序）
    /// 3. 总容量 = 初始缺额 + 原社团为该社团的学生数，之后不再变动
    /// 4. 初始成员 = 原社团为该社团的学生
    #[instrument(skip(quotas, individuals), fields(
        quotas_count = quotas.len(),
        individuals_count = individuals.len()
    ))]
    pub fn new(quotas: &[QuotaRecord], individuals: &[Individual]) -> Self {
        let mut aggregated: BTreeMap<String, u32> = BTreeMap::new();
        for quota in quotas {
            let name = quota.resource_name.trim();
            if name.is_empty() {
                warn!(open_quota = quota.open_quota, "忽略名称空白的缺额设定");
                continue;
            }
            let entry = aggregated.entry(name.to_string()).or_insert(0);
            *entry = entry.saturating_add(quota.open_quota);
        }

        let mut ledger = Self {
            resources: Vec::with_capacity(aggregated.len()),
            index: HashMap::new(),
        };

        for (name, open) in aggregated {
            ledger.insert(Resource::new(&name, open));
        }

        for individual in individuals {
            let home = individual.home_resource.as_str();
            if !home.is_empty() && !ledger.contains(home) {
                debug!(resource = home, "自动补上未设定缺额的原社团");
                ledger.insert(Resource::new(home, 0));
            }
        }

        for individual in individuals {
            if let Some(&idx) = ledger.index.get(individual.home_resource.as_str()) {
                ledger.resources[idx].members.insert(individual.id.clone());
            }
        }

        for resource in ledger.resources.iter_mut() {
            resource.total_capacity = resource
                .initial_open
                .saturating_add(resource.members.len() as u32);
        }

        ledger
    }

    fn insert(&mut self, resource: Resource) {
        self.index.insert(resource.name.clone(), self.resources.len());
        self.resources.push(resource);
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn get(&self, name: &str) -> Option<&Resource> {
        self.index.get(name).map(|&idx| &self.resources[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// 社团存在且 成员数 < 总容量
    pub fn has_vacancy(&self, name: &str) -> bool {
        self.get(name).map(Resource::has_vacancy).unwrap_or(false)
    }

    pub fn occupancy(&self, name: &str) -> Option<usize> {
        self.get(name).map(Resource::occupancy)
    }

    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// 剩余缺额（名册顺序）
    pub fn remaining_capacities(&self) -> Vec<RemainingCapacity> {
        self.resources
            .iter()
            .map(|r| RemainingCapacity {
                resource_name: r.name.clone(),
                remaining_capacity: r.remaining_capacity(),
            })
            .collect()
    }

    // ==========================================
    // 成员异动
    // ==========================================

    /// 学生由 from 转入 to
    ///
    /// from 不在名册中时不归还任何容量（未追踪社团本无容量预算）
    pub fn transfer(&mut self, individual_id: &str, from: &str, to: &str) {
        if let Some(&idx) = self.index.get(from) {
            self.resources[idx].members.remove(individual_id);
        }
        if let Some(&idx) = self.index.get(to) {
            self.resources[idx].members.insert(individual_id.to_string());
        }
    }

    /// 两人一对一交换社团，各社团人数不变
    pub fn exchange(&mut self, id_a: &str, resource_a: &str, id_b: &str, resource_b: &str) {
        if let Some(&idx) = self.index.get(resource_a) {
            let members = &mut self.resources[idx].members;
            members.remove(id_a);
            members.insert(id_b.to_string());
        }
        if let Some(&idx) = self.index.get(resource_b) {
            let members = &mut self.resources[idx].members;
            members.remove(id_b);
            members.insert(id_a.to_string());
        }
    }

    // ==========================================
    // 一致性检查
    // ==========================================

    /// 检查 容量上限 与 名册/学生记录一致性
    pub fn verify(&self, individuals: &[Individual]) -> Result<(), LedgerViolation> {
        for resource in &self.resources {
            if resource.occupancy() > resource.total_capacity as usize {
                return Err(LedgerViolation::OverCapacity {
                    resource: resource.name.clone(),
                    occupancy: resource.occupancy(),
                    capacity: resource.total_capacity,
                });
            }
        }

        for individual in individuals {
            let found: Vec<String> = self
                .resources
                .iter()
                .filter(|r| r.members.contains(&individual.id))
                .map(|r| r.name.clone())
                .collect();

            let consistent = if self.contains(&individual.current_resource) {
                found.len() == 1 && found[0] == individual.current_resource
            } else {
                found.is_empty()
            };

            if !consistent {
                return Err(LedgerViolation::MembershipMismatch {
                    individual: individual.id.clone(),
                    recorded: individual.current_resource.clone(),
                    found,
                });
            }
        }

        Ok(())
    }
}
