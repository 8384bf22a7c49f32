// ==========================================
// 学生转社分发系统 - 报表输出
// ==========================================
// 输出: 分发结果 / 转社名单 / 剩余缺额 / 递补日志 / 交换纪录
//       / 可读审计日志 / 运行摘要
// 格式: CSV（UTF-8 BOM，方便 Excel 开启）+ 文本 + JSON
// ==========================================

use crate::domain::allocation::{AllocationOutput, AllocationRecord, AllocationStats};
use crate::domain::resource::QuotaRecord;
use chrono::{DateTime, Utc};
use csv::Writer;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("文件写入失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV 写入失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON 序列化失败: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;

pub mod file_names {
    pub const RESULTS: &str = "results.csv";
    pub const TRANSFERRED: &str = "transferred.csv";
    pub const REMAINING_CAPACITY: &str = "remaining_capacity.csv";
    pub const MOVE_LOG: &str = "move_log.csv";
    pub const SWAP_LOG: &str = "swap_log.csv";
    pub const AUDIT_LOG: &str = "audit_log.txt";
    pub const SUMMARY: &str = "summary.json";
}

const RESULT_HEADER: &[&str] = &["学号", "姓名", "班级", "原社团", "最终社团", "录取志愿", "状态"];
const REMAINING_HEADER: &[&str] = &["社团名称", "剩余缺额"];
const MOVE_LOG_HEADER: &[&str] = &["轮次", "学号", "姓名", "原社团", "转入社团", "志愿序"];
const SWAP_LOG_HEADER: &[&str] = &["学号1", "姓名1", "学号2", "姓名2", "社团1", "社团2"];
const QUOTA_HEADER: &[&str] = &["社团名称", "目前缺额"];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 运行摘要（summary.json）
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub transferred: usize,
    #[serde(flatten)]
    pub stats: AllocationStats,
}

impl RunSummary {
    pub fn from_output(output: &AllocationOutput) -> Self {
        Self {
            run_id: output.run_id,
            generated_at: output.generated_at,
            transferred: output.transferred().count(),
            stats: output.stats.clone(),
        }
    }
}

fn result_row(record: &AllocationRecord) -> Vec<String> {
    vec![
        record.id.clone(),
        record.display_name.clone(),
        record.class_label.clone(),
        record.original_resource.clone(),
        record.final_resource.clone(),
        record.final_rank.label(),
        record.outcome.label().to_string(),
    ]
}

// ==========================================
// ReportWriter - 报表输出
// ==========================================
pub struct ReportWriter;

impl ReportWriter {
    fn create_csv(path: &Path, header: &[&str]) -> ExportResult<Writer<File>> {
        let mut file = File::create(path)?;
        file.write_all(UTF8_BOM)?;
        let mut wtr = Writer::from_writer(file);
        wtr.write_record(header)?;
        Ok(wtr)
    }

    pub fn write_results<'a, I>(path: &Path, records: I) -> ExportResult<()>
    where
        I: IntoIterator<Item = &'a AllocationRecord>,
    {
        let mut wtr = Self::create_csv(path, RESULT_HEADER)?;
        for record in records {
            wtr.write_record(&result_row(record))?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn write_remaining_capacity(path: &Path, output: &AllocationOutput) -> ExportResult<()> {
        let mut wtr = Self::create_csv(path, REMAINING_HEADER)?;
        for remaining in &output.remaining {
            wtr.write_record(&[
                remaining.resource_name.clone(),
                remaining.remaining_capacity.to_string(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn write_move_log(path: &Path, output: &AllocationOutput) -> ExportResult<()> {
        let mut wtr = Self::create_csv(path, MOVE_LOG_HEADER)?;
        for entry in &output.move_log {
            wtr.write_record(&[
                entry.iteration.to_string(),
                entry.individual_id.clone(),
                entry.display_name.clone(),
                entry.from_resource.clone(),
                entry.to_resource.clone(),
                entry.preference_rank.to_string(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn write_swap_log(path: &Path, output: &AllocationOutput) -> ExportResult<()> {
        let mut wtr = Self::create_csv(path, SWAP_LOG_HEADER)?;
        for entry in &output.swap_log {
            wtr.write_record(&[
                entry.individual_id_1.clone(),
                entry.display_name_1.clone(),
                entry.individual_id_2.clone(),
                entry.display_name_2.clone(),
                entry.resource_1.clone(),
                entry.resource_2.clone(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn write_audit_log(path: &Path, output: &AllocationOutput) -> ExportResult<()> {
        let mut file = File::create(path)?;
        writeln!(file, "=== 连锁递补 ({} 笔) ===", output.move_log.len())?;
        for entry in &output.move_log {
            writeln!(file, "{}", entry)?;
        }
        writeln!(file, "=== 交换最佳化 ({} 笔) ===", output.swap_log.len())?;
        for entry in &output.swap_log {
            writeln!(file, "{}", entry)?;
        }
        Ok(())
    }

    pub fn write_summary(path: &Path, output: &AllocationOutput) -> ExportResult<()> {
        let json = serde_json::to_string_pretty(&RunSummary::from_output(output))?;
        fs::write(path, json)?;
        Ok(())
    }

    /// 缺额表范本
    pub fn write_quota_template(path: &Path, quotas: &[QuotaRecord]) -> ExportResult<()> {
        let mut wtr = Self::create_csv(path, QUOTA_HEADER)?;
        for quota in quotas {
            wtr.write_record(&[quota.resource_name.clone(), quota.open_quota.to_string()])?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// 输出全部报表到目录（目录不存在时建立）
    ///
    /// # 返回
    /// 已写入的文件路径
    #[instrument(skip(output), fields(run_id = %output.run_id))]
    pub fn write_all(output: &AllocationOutput, dir: &Path) -> ExportResult<Vec<PathBuf>> {
        fs::create_dir_all(dir)?;
        let path = |name: &str| dir.join(name);

        Self::write_results(&path(file_names::RESULTS), &output.records)?;
        Self::write_results(&path(file_names::TRANSFERRED), output.transferred())?;
        Self::write_remaining_capacity(&path(file_names::REMAINING_CAPACITY), output)?;
        Self::write_move_log(&path(file_names::MOVE_LOG), output)?;
        Self::write_swap_log(&path(file_names::SWAP_LOG), output)?;
        Self::write_audit_log(&path(file_names::AUDIT_LOG), output)?;
        Self::write_summary(&path(file_names::SUMMARY), output)?;

        let files: Vec<PathBuf> = [
            file_names::RESULTS,
            file_names::TRANSFERRED,
            file_names::REMAINING_CAPACITY,
            file_names::MOVE_LOG,
            file_names::SWAP_LOG,
            file_names::AUDIT_LOG,
            file_names::SUMMARY,
        ]
        .iter()
        .map(|name| dir.join(name))
        .collect();

        info!(dir = %dir.display(), files = files.len(), "报表输出完成");
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::allocation::{MoveLogEntry, RemainingCapacity};
    use crate::domain::types::{FinalRank, Outcome};

    fn sample_output() -> AllocationOutput {
        AllocationOutput {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            records: vec![
                AllocationRecord {
                    id: "S1".to_string(),
                    display_name: "甲".to_string(),
                    class_label: "101".to_string(),
                    original_resource: "A".to_string(),
                    final_resource: "B".to_string(),
                    final_rank: FinalRank::Preference(1),
                    outcome: Outcome::Changed,
                },
                AllocationRecord {
                    id: "S2".to_string(),
                    display_name: "乙".to_string(),
                    class_label: "102".to_string(),
                    original_resource: "A".to_string(),
                    final_resource: "A".to_string(),
                    final_rank: FinalRank::NoTransfer,
                    outcome: Outcome::Unchanged,
                },
            ],
            remaining: vec![RemainingCapacity {
                resource_name: "B".to_string(),
                remaining_capacity: 0,
            }],
            move_log: vec![MoveLogEntry {
                iteration: 1,
                individual_id: "S1".to_string(),
                display_name: "甲".to_string(),
                from_resource: "A".to_string(),
                to_resource: "B".to_string(),
                preference_rank: 1,
            }],
            swap_log: vec![],
            stats: AllocationStats {
                individuals: 2,
                resources: 2,
                moves: 1,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_write_all_creates_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("out");

        let files = ReportWriter::write_all(&sample_output(), &out_dir).unwrap();

        assert_eq!(files.len(), 7);
        assert!(files.iter().all(|f| f.exists()));
    }

    #[test]
    fn test_transferred_only_lists_changed() {
        let dir = tempfile::tempdir().unwrap();
        ReportWriter::write_all(&sample_output(), dir.path()).unwrap();

        let content = fs::read_to_string(dir.path().join(file_names::TRANSFERRED)).unwrap();
        let lines: Vec<&str> = content.trim_start_matches('\u{feff}').lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "S1,甲,101,A,B,1,成功");

        let results = fs::read_to_string(dir.path().join(file_names::RESULTS)).unwrap();
        assert!(results.contains("S2,乙,102,A,A,未转社,未变更"));
    }

    #[test]
    fn test_summary_json_fields() {
        let dir = tempfile::tempdir().unwrap();
        let output = sample_output();
        ReportWriter::write_all(&output, dir.path()).unwrap();

        let content = fs::read_to_string(dir.path().join(file_names::SUMMARY)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(json["run_id"], output.run_id.to_string());
        assert_eq!(json["transferred"], 1);
        assert_eq!(json["moves"], 1);
        assert_eq!(json["budget_exhausted"], false);
    }

    #[test]
    fn test_audit_log_lines() {
        let dir = tempfile::tempdir().unwrap();
        ReportWriter::write_all(&sample_output(), dir.path()).unwrap();

        let content = fs::read_to_string(dir.path().join(file_names::AUDIT_LOG)).unwrap();
        assert!(content.contains("#1: 甲 (S1) 从 [A] 转入 [B] (志愿1)"));
        assert!(content.contains("=== 交换最佳化 (0 笔) ==="));
    }
}
