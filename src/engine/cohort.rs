// ==========================================
// 学生转社分发系统 - 年级判定纯函数
// ==========================================
// 职责: 由班级字串推导年级分组
// 红线: 无状态、无副作用、永不报错
// ==========================================

use crate::domain::types::Cohort;
use std::ops::RangeInclusive;

/// 一年级班级号范围
pub const FIRST_GROUP_CLASSES: RangeInclusive<u32> = 101..=115;
/// 二年级班级号范围
pub const SECOND_GROUP_CLASSES: RangeInclusive<u32> = 201..=215;

// ==========================================
// CohortClassifier - 年级判定
// ==========================================
pub struct CohortClassifier;

impl CohortClassifier {
    /// 由班级字串判定年级
    ///
    /// # 规则
    /// 1. 取出字串中所有数字字元（不要求连续），依原顺序串接
    /// 2. 取前三位解析为整数
    /// 3. 101-115 → FirstGroup；201-215 → SecondGroup；其余或无数字 → None
    ///
    /// # 示例
    /// - "高一 101 班" → 101 → FirstGroup
    /// - "1年05班" → "105" → FirstGroup
    /// - "101.0" → "1010" → 前三位 101 → FirstGroup
    pub fn classify(class_label: &str) -> Option<Cohort> {
        let number = Self::class_number(class_label)?;

        if FIRST_GROUP_CLASSES.contains(&number) {
            Some(Cohort::FirstGroup)
        } else if SECOND_GROUP_CLASSES.contains(&number) {
            Some(Cohort::SecondGroup)
        } else {
            None
        }
    }

    /// 串接所有数字后取前三位
    pub fn class_number(class_label: &str) -> Option<u32> {
        let digits: Vec<u32> = class_label.chars().filter_map(Self::digit_value).take(3).collect();

        if digits.is_empty() {
            return None;
        }

        Some(digits.iter().fold(0, |acc, d| acc * 10 + d))
    }

    /// ASCII 与全形数字
    fn digit_value(c: char) -> Option<u32> {
        match c {
            '0'..='9' => c.to_digit(10),
            '０'..='９' => Some(c as u32 - '０' as u32),
            _ => None,
        }
    }
}
