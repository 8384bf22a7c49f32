// ==========================================
// 学生转社分发系统 - 数据质量校验器实现
// ==========================================
// 职责: 学号 / 填写时间 / 年级 / 志愿名称校验 + DQ 报告生成
// 红线: 只产生报告，不修改数据；Error 级别须在分发前处理
// ==========================================

use crate::domain::resource::QuotaRecord;
use crate::engine::cohort::CohortClassifier;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::StudentRow;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

/// DQ 级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DqLevel {
    Error,
    Warning,
    Info,
}

/// DQ 问题类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DqKind {
    MissingId,
    DuplicateId,
    UnparsedSubmissionTime,
    QuotaCoerced,
    BlankResourceName,
    UnresolvedCohort,
    UnknownPreference,
}

impl DqKind {
    pub fn level(&self) -> DqLevel {
        match self {
            DqKind::MissingId | DqKind::DuplicateId => DqLevel::Error,
            DqKind::UnparsedSubmissionTime | DqKind::QuotaCoerced | DqKind::BlankResourceName => {
                DqLevel::Warning
            }
            DqKind::UnresolvedCohort | DqKind::UnknownPreference => DqLevel::Info,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DqViolation {
    pub row_number: usize,
    pub record_key: Option<String>, // 学号或社团名称
    pub kind: DqKind,
    pub level: DqLevel,
    pub field: String,
    pub message: String,
}

impl DqViolation {
    pub fn new(
        row_number: usize,
        record_key: Option<String>,
        kind: DqKind,
        field: &str,
        message: String,
    ) -> Self {
        Self {
            row_number,
            record_key,
            kind,
            level: kind.level(),
            field: field.to_string(),
            message,
        }
    }
}

// ==========================================
// DqReport - DQ 报告
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DqReport {
    pub violations: Vec<DqViolation>,
    pub error_count: usize,
    pub warning_count: usize,
}

impl DqReport {
    pub fn from_violations(violations: Vec<DqViolation>) -> Self {
        let error_count = violations
            .iter()
            .filter(|v| v.level == DqLevel::Error)
            .count();
        let warning_count = violations
            .iter()
            .filter(|v| v.level == DqLevel::Warning)
            .count();

        Self {
            violations,
            error_count,
            warning_count,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Error 级别转为导入错误（学号缺失优先于学号重复）
    pub fn ensure_no_errors(&self) -> ImportResult<()> {
        if let Some(missing) = self
            .violations
            .iter()
            .find(|v| v.kind == DqKind::MissingId)
        {
            return Err(ImportError::PrimaryKeyMissing(missing.row_number));
        }

        let mut duplicated: Vec<String> = Vec::new();
        for v in self.violations.iter().filter(|v| v.kind == DqKind::DuplicateId) {
            if let Some(id) = &v.record_key {
                if !duplicated.contains(id) {
                    duplicated.push(id.clone());
                }
            }
        }
        if !duplicated.is_empty() {
            return Err(ImportError::DuplicateIds(duplicated));
        }

        Ok(())
    }
}

// ==========================================
// DqValidator - 数据质量校验器
// ==========================================
pub struct DqValidator;

impl DqValidator {
    pub fn new() -> Self {
        Self
    }

    /// 执行全部校验
    pub fn validate(&self, students: &[StudentRow], quotas: &[QuotaRecord]) -> Vec<DqViolation> {
        let mut violations = self.validate_primary_key(students);
        violations.extend(self.validate_cohorts(students));
        violations.extend(self.validate_preferences(students, quotas));
        violations
    }

    /// 校验学号（非空且唯一）
    ///
    /// 同一学号出现多次时，第二次起每次都记一笔
    pub fn validate_primary_key(&self, students: &[StudentRow]) -> Vec<DqViolation> {
        let mut violations = Vec::new();
        let mut seen_ids: HashMap<String, usize> = HashMap::new();

        for row in students {
            let id = row.record.id.trim();
            if id.is_empty() {
                violations.push(DqViolation::new(
                    row.row_number,
                    None,
                    DqKind::MissingId,
                    "学号",
                    "学号缺失".to_string(),
                ));
                continue;
            }

            if let Some(&first_row) = seen_ids.get(id) {
                violations.push(DqViolation::new(
                    row.row_number,
                    Some(id.to_string()),
                    DqKind::DuplicateId,
                    "学号",
                    format!("学号重复（首次出现于第 {} 行）", first_row),
                ));
            } else {
                seen_ids.insert(id.to_string(), row.row_number);
            }
        }

        violations
    }

    /// 班级无法判定年级（不受转社限制，仅提示）
    pub fn validate_cohorts(&self, students: &[StudentRow]) -> Vec<DqViolation> {
        students
            .iter()
            .filter(|row| CohortClassifier::classify(&row.record.class_label).is_none())
            .map(|row| {
                DqViolation::new(
                    row.row_number,
                    Some(row.record.id.trim().to_string()),
                    DqKind::UnresolvedCohort,
                    "班级",
                    format!("班级 '{}' 不属于受限年级", row.record.class_label),
                )
            })
            .collect()
    }

    /// 志愿社团既不在缺额表、也不是任何人的原社团（永远无法录取，仅提示）
    pub fn validate_preferences(
        &self,
        students: &[StudentRow],
        quotas: &[QuotaRecord],
    ) -> Vec<DqViolation> {
        let known: HashSet<&str> = quotas
            .iter()
            .map(|q| q.resource_name.trim())
            .chain(students.iter().map(|s| s.record.home_resource.trim()))
            .filter(|name| !name.is_empty())
            .collect();

        let mut violations = Vec::new();
        for row in students {
            let unknown: BTreeSet<&str> = row
                .record
                .preferences
                .iter()
                .map(|p| p.trim())
                .filter(|p| !p.is_empty() && !known.contains(p))
                .collect();

            for name in unknown {
                violations.push(DqViolation::new(
                    row.row_number,
                    Some(row.record.id.trim().to_string()),
                    DqKind::UnknownPreference,
                    "志愿",
                    format!("志愿社团 '{}' 不存在", name),
                ));
            }
        }

        violations
    }
}

impl Default for DqValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::individual::IndividualRecord;

    fn row(id: &str, class: &str, row_number: usize) -> StudentRow {
        StudentRow {
            row_number,
            record: IndividualRecord::new(id, class, "围棋社"),
        }
    }

    #[test]
    fn test_validate_primary_key_missing() {
        let violations = DqValidator::new().validate_primary_key(&[row("  ", "101", 1)]);

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, DqKind::MissingId);
        assert_eq!(violations[0].level, DqLevel::Error);
    }

    #[test]
    fn test_validate_primary_key_duplicate() {
        let students = vec![row("S001", "101", 1), row("S001", "102", 2), row("S002", "103", 3)];

        let violations = DqValidator::new().validate_primary_key(&students);

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].row_number, 2);
        assert_eq!(violations[0].record_key.as_deref(), Some("S001"));
    }

    #[test]
    fn test_ensure_no_errors_lists_each_duplicate_once() {
        let students = vec![
            row("S002", "101", 1),
            row("S001", "101", 2),
            row("S002", "101", 3),
            row("S001", "101", 4),
            row("S002", "101", 5),
        ];
        let report =
            DqReport::from_violations(DqValidator::new().validate_primary_key(&students));

        assert_eq!(report.error_count, 3);
        match report.ensure_no_errors() {
            Err(ImportError::DuplicateIds(ids)) => assert_eq!(ids, vec!["S002", "S001"]),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_unresolved_cohort_is_info() {
        let violations = DqValidator::new().validate_cohorts(&[row("S1", "301", 1)]);

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].level, DqLevel::Info);

        let report = DqReport::from_violations(violations);
        assert!(report.ensure_no_errors().is_ok());
    }

    #[test]
    fn test_unknown_preference_reported_once() {
        let mut student = row("S1", "101", 1);
        student.record.preferences = vec![
            "话剧社".to_string(),
            "火星社".to_string(),
            "火星社".to_string(),
            "".to_string(),
        ];
        let quotas = vec![QuotaRecord::new("话剧社", 1)];

        let violations = DqValidator::new().validate_preferences(&[student], &quotas);

        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("火星社"));
    }
}
