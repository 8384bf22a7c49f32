// ==========================================
// 学生转社分发系统 - 学生领域模型
// ==========================================
// 输入: IndividualRecord（导入层产出，已去重、已标准化）
// 运行: Individual（引擎内部状态，当前社团/志愿序可变）
// ==========================================

use crate::domain::types::Cohort;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

// ==========================================
// IndividualRecord - 学生输入记录
// ==========================================
// 用途: 导入层写入,引擎层只读
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualRecord {
    // ===== 主键 =====
    pub id: String, // 学号（唯一，由调用方保证）

    // ===== 基础信息 =====
    #[serde(default)]
    pub display_name: String, // 姓名（可缺省）
    #[serde(default)]
    pub class_label: String, // 班级原始字串

    // ===== 填写时间 =====
    #[serde(default)]
    pub submitted_at: Option<NaiveDateTime>, // 无法解析时为 None，排在最后

    // ===== 社团 =====
    #[serde(default)]
    pub home_resource: String, // 原社团（可为空）
    #[serde(default)]
    pub preferences: Vec<String>, // 志愿 1..K 原始值，空字串表示未填
}

impl IndividualRecord {
    pub fn new(id: &str, class_label: &str, home_resource: &str) -> Self {
        Self {
            id: id.to_string(),
            display_name: String::new(),
            class_label: class_label.to_string(),
            submitted_at: None,
            home_resource: home_resource.to_string(),
            preferences: Vec::new(),
        }
    }
}

/// 依填写时间升序排序（稳定排序，时间相同保持输入顺序；无时间者排最后）
pub fn order_by_submission(records: &mut [IndividualRecord]) {
    records.sort_by(|a, b| match (&a.submitted_at, &b.submitted_at) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

// ==========================================
// Individual - 引擎内学生状态
// ==========================================
// 红线: current_resource / current_rank 只能由连锁递补与交换最佳化修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    pub id: String,
    pub display_name: String,
    pub class_label: String,
    pub cohort: Option<Cohort>,
    pub home_resource: String,
    pub preferences: Vec<String>, // 已过滤的志愿列表（可含重复或未知社团）

    // ===== 可变状态 =====
    pub current_resource: String,
    pub current_rank: Option<usize>, // None = 未录取任何志愿（留在原社团）

    pub submission_order: usize, // 排序后的优先序（0 最优先）
}

impl Individual {
    /// 由输入记录构造，当前社团初始化为原社团
    pub fn new(
        record: &IndividualRecord,
        cohort: Option<Cohort>,
        preferences: Vec<String>,
        submission_order: usize,
    ) -> Self {
        let home = record.home_resource.trim().to_string();
        Self {
            id: record.id.trim().to_string(),
            display_name: record.display_name.clone(),
            class_label: record.class_label.trim().to_string(),
            cohort,
            current_resource: home.clone(),
            home_resource: home,
            preferences,
            current_rank: None,
            submission_order,
        }
    }

    /// 递补搜索上界: 未录取时搜索全部志愿，否则只搜索更前面的志愿
    pub fn search_bound(&self) -> usize {
        match self.current_rank {
            Some(rank) => rank.min(self.preferences.len()),
            None => self.preferences.len(),
        }
    }

    /// 志愿序 index 是否严格优于当前志愿序
    pub fn improves_on(&self, index: usize) -> bool {
        match self.current_rank {
            Some(rank) => index < rank,
            None => true,
        }
    }

    /// 社团在志愿列表中第一次出现的位置
    pub fn preference_index(&self, resource: &str) -> Option<usize> {
        self.preferences.iter().position(|p| p == resource)
    }

    /// 是否已录取第一志愿
    pub fn holds_first_choice(&self) -> bool {
        self.current_rank == Some(0)
    }

    /// 更新当前社团与志愿序
    pub fn assign(&mut self, resource: &str, rank: usize) {
        self.current_resource = resource.to_string();
        self.current_rank = Some(rank);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
    }

    #[test]
    fn test_order_by_submission_stable_ties_and_missing_last() {
        let mut a = IndividualRecord::new("A", "101", "X");
        a.submitted_at = at(10, 5);
        let mut b = IndividualRecord::new("B", "101", "X");
        b.submitted_at = None;
        let mut c = IndividualRecord::new("C", "101", "X");
        c.submitted_at = at(10, 0);
        let mut d = IndividualRecord::new("D", "101", "X");
        d.submitted_at = at(10, 5);

        let mut records = vec![a, b, c, d];
        order_by_submission(&mut records);

        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["C", "A", "D", "B"]);
    }

    #[test]
    fn test_search_bound_and_improves_on() {
        let record = IndividualRecord::new(" S1 ", "101", " Chess ");
        let mut s = Individual::new(
            &record,
            None,
            vec!["A".to_string(), "B".to_string(), "C".to_string()],
            0,
        );
        assert_eq!(s.id, "S1");
        assert_eq!(s.current_resource, "Chess");
        assert_eq!(s.search_bound(), 3);
        assert!(s.improves_on(2));

        s.assign("B", 1);
        assert_eq!(s.search_bound(), 1);
        assert!(s.improves_on(0));
        assert!(!s.improves_on(1));
        assert!(!s.holds_first_choice());
    }

    #[test]
    fn test_preference_index_first_occurrence() {
        let record = IndividualRecord::new("S1", "101", "X");
        let s = Individual::new(
            &record,
            None,
            vec!["A".to_string(), "B".to_string(), "A".to_string()],
            0,
        );
        assert_eq!(s.preference_index("A"), Some(0));
        assert_eq!(s.preference_index("B"), Some(1));
        assert_eq!(s.preference_index("Z"), None);
    }
}
