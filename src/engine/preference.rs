// ==========================================
// 学生转社分发系统 - 志愿列表建立
// ==========================================
// 输入: 年级 + 志愿栏位原始值 + 年级转入规则
// 输出: 过滤后的有序志愿列表
// ==========================================

use crate::config::{EligibilityRule, EligibilityRules};
use crate::domain::individual::{Individual, IndividualRecord};
use crate::engine::cohort::CohortClassifier;
use tracing::instrument;

// ==========================================
// PreferenceListBuilder - 志愿列表建立
// ==========================================
pub struct PreferenceListBuilder {
    rules: EligibilityRules,
    max_slots: usize,
}

impl PreferenceListBuilder {
    /// # 参数
    /// - rules: 各年级转入规则
    /// - max_slots: 读取的志愿栏位数 K
    pub fn new(rules: EligibilityRules, max_slots: usize) -> Self {
        Self { rules, max_slots }
    }

    /// 依规则过滤志愿栏位
    ///
    /// # 规则
    /// - BlanketBan: 不论填写内容，结果为空
    /// - 其余: 依序扫描栏位，trim 后非空且未被禁止者加入；被禁止者跳过后继续扫描
    /// - 不存在的社团名称保留（永远无法录取）；重复志愿不去重
    pub fn filter_slots(rule: &EligibilityRule, slots: &[String]) -> Vec<String> {
        if matches!(rule, EligibilityRule::BlanketBan) {
            return Vec::new();
        }

        slots
            .iter()
            .map(|slot| slot.trim())
            .filter(|slot| !slot.is_empty())
            .filter(|slot| rule.permits(slot))
            .map(str::to_string)
            .collect()
    }

    /// 建立单一学生的引擎状态（年级判定 + 志愿过滤）
    pub fn build(&self, record: &IndividualRecord, submission_order: usize) -> Individual {
        let cohort = CohortClassifier::classify(&record.class_label);
        let rule = self.rules.rule_for(cohort);
        let slots = &record.preferences[..record.preferences.len().min(self.max_slots)];
        let preferences = Self::filter_slots(rule, slots);

        Individual::new(record, cohort, preferences, submission_order)
    }

    /// 依既定顺序建立全部学生（submission_order 为列表位置）
    #[instrument(skip(self, records), fields(records_count = records.len()))]
    pub fn build_all(&self, records: &[IndividualRecord]) -> Vec<Individual> {
        records
            .iter()
            .enumerate()
            .map(|(order, record)| self.build(record, order))
            .collect()
    }
}
