// ==========================================
// 学生转社分发系统 - 社团领域模型
// ==========================================
// 红线: 总容量初始化后不可变，只有成员名单会变动
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ==========================================
// QuotaRecord - 社团缺额设定
// ==========================================
// 同名多笔设定在建立名册时加总
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaRecord {
    pub resource_name: String,
    pub open_quota: u32, // 本次开放缺额（调用方已清洗为非负整数）
}

impl QuotaRecord {
    pub fn new(resource_name: &str, open_quota: u32) -> Self {
        Self {
            resource_name: resource_name.to_string(),
            open_quota,
        }
    }
}

// ==========================================
// Resource - 社团
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    pub initial_open: u32,         // 初始缺额
    pub total_capacity: u32,       // 总容量 = 初始缺额 + 初始成员数
    pub members: BTreeSet<String>, // 目前成员学号
}

impl Resource {
    pub fn new(name: &str, initial_open: u32) -> Self {
        Self {
            name: name.to_string(),
            initial_open,
            total_capacity: initial_open,
            members: BTreeSet::new(),
        }
    }

    /// 目前人数
    pub fn occupancy(&self) -> usize {
        self.members.len()
    }

    /// 是否还有空位
    pub fn has_vacancy(&self) -> bool {
        self.occupancy() < self.total_capacity as usize
    }

    /// 剩余缺额（报表口径，不为负）
    pub fn remaining_capacity(&self) -> u32 {
        (self.total_capacity as usize).saturating_sub(self.occupancy()) as u32
    }
}
