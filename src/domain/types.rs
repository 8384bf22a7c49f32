// ==========================================
// 学生转社分发系统 - 领域类型定义
// ==========================================
// 职责: 年级分组、分发结果标签、录取志愿序
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 年级分组 (Cohort)
// ==========================================
// 由班级字串推导，决定适用哪一组转入限制
// 无法判定的班级不属于任何分组（不受限制）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cohort {
    FirstGroup,  // 一年级 (101-115)
    SecondGroup, // 二年级 (201-215)
}

impl fmt::Display for Cohort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cohort::FirstGroup => write!(f, "FIRST_GROUP"),
            Cohort::SecondGroup => write!(f, "SECOND_GROUP"),
        }
    }
}

// ==========================================
// 分发结果 (Outcome)
// ==========================================
// 判定口径: 最终社团 != 原社团 即为 Changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Changed,   // 成功转社
    Unchanged, // 维持原社团
}

impl Outcome {
    /// 报表显示文字
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Changed => "成功",
            Outcome::Unchanged => "未变更",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Changed => write!(f, "CHANGED"),
            Outcome::Unchanged => write!(f, "UNCHANGED"),
        }
    }
}

// ==========================================
// 录取志愿序 (FinalRank)
// ==========================================
// Preference 为 1-based 志愿序号
// NoTransfer 表示从未录取任何志愿（仍为初始状态）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinalRank {
    Preference(usize),
    NoTransfer,
}

impl FinalRank {
    /// 由 0-based 当前志愿序转换
    pub fn from_rank(rank: Option<usize>) -> Self {
        match rank {
            Some(index) => FinalRank::Preference(index + 1),
            None => FinalRank::NoTransfer,
        }
    }

    /// 报表显示文字
    pub fn label(&self) -> String {
        match self {
            FinalRank::Preference(n) => n.to_string(),
            FinalRank::NoTransfer => "未转社".to_string(),
        }
    }
}

impl fmt::Display for FinalRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinalRank::Preference(n) => write!(f, "{}", n),
            FinalRank::NoTransfer => write!(f, "NO_TRANSFER"),
        }
    }
}
