// ==========================================
// 学生转社分发系统 - 输出层
// ==========================================
// 职责: 分发结果写出为 CSV / 文本 / JSON
// ==========================================

pub mod report_writer;

pub use report_writer::{file_names, ExportError, ExportResult, ReportWriter, RunSummary};
