// ==========================================
// 学生转社分发系统 - 转入限制配置
// ==========================================
// 输入口径: 每个年级一个「全面禁止」旗标 + 禁止转入社团清单
// 引擎口径: EligibilityRule 三态（无限制 / 禁止清单 / 全面禁止）
// ==========================================

use crate::domain::types::Cohort;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ==========================================
// EligibilityRule - 转入限制规则
// ==========================================
// 红线: 只在建立志愿列表时套用一次，之后不再变动
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EligibilityRule {
    Unrestricted,
    Forbidden(BTreeSet<String>),
    BlanketBan,
}

impl EligibilityRule {
    /// 是否允许转入该社团（名称需已 trim）
    pub fn permits(&self, resource: &str) -> bool {
        match self {
            EligibilityRule::Unrestricted => true,
            EligibilityRule::Forbidden(names) => !names.contains(resource),
            EligibilityRule::BlanketBan => false,
        }
    }
}

// ==========================================
// CohortRestriction - 单一年级限制设定
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortRestriction {
    /// 禁止该年级所有转社（完全冻结）
    #[serde(default)]
    pub ban_all: bool,

    /// 禁止转入的社团
    #[serde(default)]
    pub forbidden: Vec<String>,
}

impl CohortRestriction {
    pub fn ban_all() -> Self {
        Self {
            ban_all: true,
            forbidden: Vec::new(),
        }
    }

    pub fn forbid(names: &[&str]) -> Self {
        Self {
            ban_all: false,
            forbidden: names.iter().map(|n| n.to_string()).collect(),
        }
    }

    /// 转换为规则: ban_all 优先于禁止清单
    pub fn to_rule(&self) -> EligibilityRule {
        if self.ban_all {
            return EligibilityRule::BlanketBan;
        }

        let names: BTreeSet<String> = self
            .forbidden
            .iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();

        if names.is_empty() {
            EligibilityRule::Unrestricted
        } else {
            EligibilityRule::Forbidden(names)
        }
    }
}

// ==========================================
// EligibilityConfig - 各年级限制设定
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityConfig {
    #[serde(default)]
    pub first_group: CohortRestriction,
    #[serde(default)]
    pub second_group: CohortRestriction,
}

impl EligibilityConfig {
    pub fn rules(&self) -> EligibilityRules {
        EligibilityRules::new(self.first_group.to_rule(), self.second_group.to_rule())
    }
}

// ==========================================
// EligibilityRules - 引擎使用的规则表
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityRules {
    first_group: EligibilityRule,
    second_group: EligibilityRule,
    unresolved: EligibilityRule,
}

impl EligibilityRules {
    pub fn new(first_group: EligibilityRule, second_group: EligibilityRule) -> Self {
        Self {
            first_group,
            second_group,
            unresolved: EligibilityRule::Unrestricted,
        }
    }

    /// 各年级皆无限制
    pub fn unrestricted() -> Self {
        Self::new(EligibilityRule::Unrestricted, EligibilityRule::Unrestricted)
    }

    /// 查询年级适用的规则；无法判定年级者不受限制
    pub fn rule_for(&self, cohort: Option<Cohort>) -> &EligibilityRule {
        match cohort {
            Some(Cohort::FirstGroup) => &self.first_group,
            Some(Cohort::SecondGroup) => &self.second_group,
            None => &self.unresolved,
        }
    }
}

impl Default for EligibilityRules {
    fn default() -> Self {
        Self::unrestricted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ban_all_wins_over_forbidden_list() {
        let restriction = CohortRestriction {
            ban_all: true,
            forbidden: vec!["Chess".to_string()],
        };
        assert_eq!(restriction.to_rule(), EligibilityRule::BlanketBan);
    }

    #[test]
    fn test_empty_forbidden_is_unrestricted() {
        let restriction = CohortRestriction {
            ban_all: false,
            forbidden: vec!["  ".to_string()],
        };
        assert_eq!(restriction.to_rule(), EligibilityRule::Unrestricted);
    }

    #[test]
    fn test_forbidden_names_trimmed() {
        let rule = CohortRestriction::forbid(&[" Chess "]).to_rule();
        assert!(!rule.permits("Chess"));
        assert!(rule.permits("Drama"));
    }

    #[test]
    fn test_unresolved_cohort_unrestricted() {
        let config = EligibilityConfig {
            first_group: CohortRestriction::ban_all(),
            second_group: CohortRestriction::forbid(&["Drama"]),
        };
        let rules = config.rules();

        assert_eq!(rules.rule_for(Some(Cohort::FirstGroup)), &EligibilityRule::BlanketBan);
        assert!(!rules.rule_for(Some(Cohort::SecondGroup)).permits("Drama"));
        assert_eq!(rules.rule_for(None), &EligibilityRule::Unrestricted);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: EligibilityConfig =
            serde_json::from_str(r#"{"second_group": {"ban_all": true}}"#).unwrap();
        assert_eq!(config.first_group, CohortRestriction::default());
        assert!(config.second_group.ban_all);
    }
}
