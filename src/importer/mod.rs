// ==========================================
// 学生转社分发系统 - 导入层
// ==========================================
// 职责: 外部文件导入，生成分发输入与 DQ 报告
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod allocation_importer;
pub mod dq_validator;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod resource_discovery;

// 重导出核心类型
pub use allocation_importer::{AllocationImporter, ImportBatch};
pub use dq_validator::{DqKind, DqLevel, DqReport, DqValidator, DqViolation};
pub use error::{ImportError, ImportResult};
pub use field_mapper::{
    coerce_quota, parse_submission_time, FieldMapper, MappingOutcome, StudentRow,
};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRow, RawTable, UniversalFileParser};
pub use resource_discovery::{discover_resource_names, known_resource_names, quota_template};
