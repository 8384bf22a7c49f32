// ==========================================
// 学生转社分发系统 - 字段映射器实现
// ==========================================
// 职责: 源字段 → 标准字段映射 + 类型转换
// 别名: 繁体中文 / 简体中文 / 英文栏位名皆可
// ==========================================

use crate::domain::individual::IndividualRecord;
use crate::domain::resource::QuotaRecord;
use crate::importer::dq_validator::{DqKind, DqViolation};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{RawRow, RawTable};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use tracing::warn;

/// 栏位别名表（第一个为显示名称）
pub mod columns {
    pub const ID: &[&str] = &["学号", "學號", "id"];
    pub const NAME: &[&str] = &["姓名", "name"];
    pub const CLASS: &[&str] = &["班级", "班級", "class"];
    pub const HOME: &[&str] = &["原社团", "原社團", "home"];
    pub const SUBMITTED_AT: &[&str] = &["填写时间", "填寫時間", "submitted_at"];
    pub const RESOURCE_NAME: &[&str] = &["社团名称", "社團名稱", "resource"];
    pub const OPEN_QUOTA: &[&str] = &["目前缺额", "目前缺額", "open_quota"];

    /// 第 slot 志愿的别名（1-based）
    pub fn preference(slot: usize) -> Vec<String> {
        vec![
            format!("志愿{}", slot),
            format!("志願{}", slot),
            format!("pref{}", slot),
        ]
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

// Excel 序列日起点 1899-12-30；上限为 9999-12-31
const EXCEL_SERIAL_MAX: f64 = 2_958_465.0;

/// 映射后的学生行
#[derive(Debug, Clone, PartialEq)]
pub struct StudentRow {
    pub row_number: usize,
    pub record: IndividualRecord,
}

/// 映射结果 + 映射过程产生的 DQ 问题
#[derive(Debug, Clone, PartialEq)]
pub struct MappingOutcome<T> {
    pub rows: Vec<T>,
    pub violations: Vec<DqViolation>,
}

pub struct FieldMapper {
    max_preference_slots: usize,
}

impl FieldMapper {
    /// # 参数
    /// - max_preference_slots: 读取的志愿栏数 K
    pub fn new(max_preference_slots: usize) -> Self {
        Self {
            max_preference_slots,
        }
    }

    /// 在表头中找出第一个存在的别名
    fn resolve_column<S: AsRef<str>>(table: &RawTable, aliases: &[S]) -> Option<String> {
        aliases
            .iter()
            .map(|a| a.as_ref())
            .find(|a| table.has_column(a))
            .map(|a| a.to_string())
    }

    /// 必要栏位，缺少者以第一个别名列出
    fn require_columns(
        table: &RawTable,
        source: &str,
        required: &[&[&str]],
    ) -> ImportResult<Vec<String>> {
        let mut resolved = Vec::new();
        let mut missing = Vec::new();
        for aliases in required {
            match Self::resolve_column(table, *aliases) {
                Some(column) => resolved.push(column),
                None => missing.push(aliases[0].to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(ImportError::MissingColumns {
                file: source.to_string(),
                columns: missing,
            });
        }
        Ok(resolved)
    }

    fn cell(row: &RawRow, column: Option<&String>) -> String {
        column
            .and_then(|c| row.get(c))
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }

    // ==========================================
    // 学生志愿表
    // ==========================================

    /// 学生志愿表 → IndividualRecord
    ///
    /// 必要栏位: 学号、班级、填写时间、原社团；姓名与志愿栏可缺
    pub fn map_students(
        &self,
        table: &RawTable,
        source: &str,
    ) -> ImportResult<MappingOutcome<StudentRow>> {
        let required = Self::require_columns(
            table,
            source,
            &[
                columns::ID,
                columns::CLASS,
                columns::SUBMITTED_AT,
                columns::HOME,
            ],
        )?;
        let (id_col, class_col, time_col, home_col) =
            (&required[0], &required[1], &required[2], &required[3]);
        let name_col = Self::resolve_column(table, columns::NAME);
        let pref_cols: Vec<Option<String>> = (1..=self.max_preference_slots)
            .map(|slot| Self::resolve_column(table, columns::preference(slot).as_slice()))
            .collect();

        let mut rows = Vec::with_capacity(table.rows.len());
        let mut violations = Vec::new();

        for raw in &table.rows {
            let id = Self::cell(raw, Some(id_col));
            let raw_time = Self::cell(raw, Some(time_col));
            let submitted_at = parse_submission_time(&raw_time);

            if submitted_at.is_none() {
                violations.push(DqViolation::new(
                    raw.row_number,
                    Some(id.clone()),
                    DqKind::UnparsedSubmissionTime,
                    time_col,
                    format!("填写时间无法解析: '{}'，排在最后", raw_time),
                ));
            }

            let record = IndividualRecord {
                display_name: Self::cell(raw, name_col.as_ref()),
                class_label: Self::cell(raw, Some(class_col)),
                submitted_at,
                home_resource: Self::cell(raw, Some(home_col)),
                preferences: pref_cols
                    .iter()
                    .map(|col| Self::cell(raw, col.as_ref()))
                    .collect(),
                id,
            };

            rows.push(StudentRow {
                row_number: raw.row_number,
                record,
            });
        }

        Ok(MappingOutcome { rows, violations })
    }

    // ==========================================
    // 社团缺额表
    // ==========================================

    /// 社团缺额表 → QuotaRecord
    ///
    /// 社团名称空白的行跳过；缺额转为非负整数
    pub fn map_quotas(
        &self,
        table: &RawTable,
        source: &str,
    ) -> ImportResult<MappingOutcome<QuotaRecord>> {
        let required = Self::require_columns(
            table,
            source,
            &[columns::RESOURCE_NAME, columns::OPEN_QUOTA],
        )?;
        let (name_col, quota_col) = (&required[0], &required[1]);

        let mut rows = Vec::with_capacity(table.rows.len());
        let mut violations = Vec::new();

        for raw in &table.rows {
            let name = Self::cell(raw, Some(name_col));
            if name.is_empty() {
                warn!(row = raw.row_number, source, "社团名称空白，跳过该行");
                violations.push(DqViolation::new(
                    raw.row_number,
                    None,
                    DqKind::BlankResourceName,
                    name_col,
                    "社团名称空白，已跳过".to_string(),
                ));
                continue;
            }

            let raw_quota = Self::cell(raw, Some(quota_col));
            let (open_quota, coercion) = coerce_quota(&raw_quota);
            if let Some(message) = coercion {
                warn!(row = raw.row_number, resource = %name, value = %raw_quota, "缺额已修正");
                violations.push(DqViolation::new(
                    raw.row_number,
                    Some(name.clone()),
                    DqKind::QuotaCoerced,
                    quota_col,
                    message,
                ));
            }

            rows.push(QuotaRecord {
                resource_name: name,
                open_quota,
            });
        }

        Ok(MappingOutcome { rows, violations })
    }
}

/// 解析填写时间
///
/// 支持常见日期时间格式、RFC 3339、纯日期与 Excel 序列值；无法解析时返回 None
pub fn parse_submission_time(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    value
        .parse::<f64>()
        .ok()
        .filter(|serial| serial.is_finite() && *serial > 0.0 && *serial <= EXCEL_SERIAL_MAX)
        .and_then(excel_serial_to_datetime)
}

fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let seconds = (serial * 86_400.0).round() as i64;
    epoch.checked_add_signed(Duration::seconds(seconds))
}

/// 缺额转为非负整数
///
/// # 返回
/// (缺额, 修正说明)；无需修正时说明为 None
pub fn coerce_quota(value: &str) -> (u32, Option<String>) {
    let value = value.trim();
    let parsed = match value.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => return (0, Some(format!("缺额 '{}' 不是数值，视为 0", value))),
    };

    if parsed < 0.0 {
        return (0, Some(format!("缺额 {} 为负数，视为 0", value)));
    }
    if parsed > u32::MAX as f64 {
        return (u32::MAX, Some(format!("缺额 {} 过大，截为 {}", value, u32::MAX)));
    }

    let truncated = parsed.trunc();
    if truncated != parsed {
        return (
            truncated as u32,
            Some(format!("缺额 {} 不是整数，取 {}", value, truncated)),
        );
    }

    (truncated as u32, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .enumerate()
                .map(|(idx, values)| RawRow {
                    row_number: idx + 1,
                    fields: headers
                        .iter()
                        .zip(values.iter())
                        .map(|(h, v)| (h.to_string(), v.to_string()))
                        .collect::<HashMap<_, _>>(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_map_students_traditional_headers() {
        let t = table(
            &["學號", "姓名", "班級", "填寫時間", "原社團", "志願1", "志願2"],
            &[&["S001", "王小明", "101", "2024-09-01 08:00:00", "围棋社", "话剧社", ""]],
        );

        let outcome = FieldMapper::new(3).map_students(&t, "students.csv").unwrap();

        assert!(outcome.violations.is_empty());
        let record = &outcome.rows[0].record;
        assert_eq!(record.id, "S001");
        assert_eq!(record.display_name, "王小明");
        assert_eq!(record.home_resource, "围棋社");
        // 缺少的第 3 志愿栏视为空白
        assert_eq!(record.preferences, vec!["话剧社", "", ""]);
        assert!(record.submitted_at.is_some());
    }

    #[test]
    fn test_map_students_missing_columns() {
        let t = table(&["id", "name", "home"], &[]);

        let result = FieldMapper::new(10).map_students(&t, "students.csv");

        match result {
            Err(ImportError::MissingColumns { columns, .. }) => {
                assert_eq!(columns, vec!["班级", "填写时间"])
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_map_students_unparsed_time_is_warning() {
        let t = table(
            &["id", "class", "submitted_at", "home"],
            &[&["S1", "101", "昨天", "A"]],
        );

        let outcome = FieldMapper::new(10).map_students(&t, "s.csv").unwrap();

        assert_eq!(outcome.rows[0].record.submitted_at, None);
        assert_eq!(outcome.violations.len(), 1);
        assert_eq!(outcome.violations[0].kind, DqKind::UnparsedSubmissionTime);
    }

    #[test]
    fn test_map_quotas_coercion_and_blank_names() {
        let t = table(
            &["社團名稱", "目前缺額"],
            &[
                &["话剧社", "3"],
                &["", "5"],
                &["围棋社", "abc"],
                &["篮球社", "2.7"],
                &["吉他社", "-1"],
            ],
        );

        let outcome = FieldMapper::new(10).map_quotas(&t, "quotas.csv").unwrap();

        let quotas: Vec<(&str, u32)> = outcome
            .rows
            .iter()
            .map(|q| (q.resource_name.as_str(), q.open_quota))
            .collect();
        assert_eq!(
            quotas,
            vec![("话剧社", 3), ("围棋社", 0), ("篮球社", 2), ("吉他社", 0)]
        );
        assert_eq!(outcome.violations.len(), 4);
        assert_eq!(outcome.violations[0].kind, DqKind::BlankResourceName);
    }

    #[test]
    fn test_parse_submission_time_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 9, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0);

        assert_eq!(parse_submission_time("2024-09-01 08:30:00"), expected);
        assert_eq!(parse_submission_time("2024/09/01 08:30"), expected);
        assert_eq!(parse_submission_time("2024-09-01T08:30:00+08:00"), expected);
        assert_eq!(
            parse_submission_time("2024-09-01"),
            NaiveDate::from_ymd_opt(2024, 9, 1).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_submission_time(""), None);
        assert_eq!(parse_submission_time("not a time"), None);
    }

    #[test]
    fn test_parse_submission_time_excel_serial() {
        // 45536 = 2024-09-01；0.5 天 = 12:00
        assert_eq!(
            parse_submission_time("45536.5"),
            NaiveDate::from_ymd_opt(2024, 9, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
        );
    }

    #[test]
    fn test_coerce_quota() {
        assert_eq!(coerce_quota("4"), (4, None));
        assert_eq!(coerce_quota(" 4.0 ").0, 4);
        assert!(coerce_quota(" 4.0 ").1.is_none());
        assert_eq!(coerce_quota("").0, 0);
        assert!(coerce_quota("").1.is_some());
        assert_eq!(coerce_quota("NaN").0, 0);
    }
}
