// ==========================================
// 学生转社分发系统 - 分发资料导入器
// ==========================================
// 职责: 整合导入流程，从文件到分发输入
// 流程: 解析 → 映射 → 校验 → DQ 报告
// 红线: 导入器不拒绝资料，是否中止由调用方依 DQ 报告决定
// ==========================================

use crate::domain::individual::IndividualRecord;
use crate::domain::resource::QuotaRecord;
use crate::importer::dq_validator::{DqReport, DqValidator};
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::{FieldMapper, MappingOutcome, StudentRow};
use crate::importer::file_parser::UniversalFileParser;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// 一次导入的结果
#[derive(Debug, Clone)]
pub struct ImportBatch {
    pub batch_id: String,
    pub students: Vec<IndividualRecord>,
    pub quotas: Vec<QuotaRecord>,
    pub dq_report: DqReport,
    pub elapsed_ms: u128,
}

// ==========================================
// AllocationImporter - 分发资料导入器
// ==========================================
pub struct AllocationImporter {
    file_parser: UniversalFileParser,
    field_mapper: FieldMapper,
    dq_validator: DqValidator,
}

impl AllocationImporter {
    /// # 参数
    /// - max_preference_slots: 读取的志愿栏数 K
    pub fn new(max_preference_slots: usize) -> Self {
        Self {
            file_parser: UniversalFileParser,
            field_mapper: FieldMapper::new(max_preference_slots),
            dq_validator: DqValidator::new(),
        }
    }

    /// 读取学生志愿表
    pub fn import_students<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> ImportResult<MappingOutcome<StudentRow>> {
        let path = path.as_ref();
        let table = self.file_parser.parse(path)?;
        debug!(rows = table.rows.len(), file = %path.display(), "学生志愿表解析完成");
        self.field_mapper
            .map_students(&table, &path.display().to_string())
    }

    /// 读取社团缺额表
    pub fn import_quotas<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> ImportResult<MappingOutcome<QuotaRecord>> {
        let path = path.as_ref();
        let table = self.file_parser.parse(path)?;
        debug!(rows = table.rows.len(), file = %path.display(), "社团缺额表解析完成");
        self.field_mapper
            .map_quotas(&table, &path.display().to_string())
    }

    /// 导入学生志愿表与社团缺额表
    ///
    /// # 返回
    /// - Ok(ImportBatch): 资料与 DQ 报告（可能含 Error 级别问题）
    /// - Err: 文件无法读取或缺少必要栏位
    #[instrument(skip(self, students_path, quotas_path), fields(batch_id))]
    pub fn import<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        students_path: P,
        quotas_path: Q,
    ) -> ImportResult<ImportBatch> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        // === 步骤 1: 解析与映射 ===
        let students = self.import_students(students_path)?;
        let quotas = self.import_quotas(quotas_path)?;

        // === 步骤 2: 数据质量校验 ===
        let mut violations = students.violations;
        violations.extend(quotas.violations);
        violations.extend(self.dq_validator.validate(&students.rows, &quotas.rows));
        let dq_report = DqReport::from_violations(violations);

        let batch = ImportBatch {
            batch_id,
            students: students.rows.into_iter().map(|row| row.record).collect(),
            quotas: quotas.rows,
            dq_report,
            elapsed_ms: start_time.elapsed().as_millis(),
        };

        info!(
            students = batch.students.len(),
            quotas = batch.quotas.len(),
            dq_errors = batch.dq_report.error_count,
            dq_warnings = batch.dq_report.warning_count,
            elapsed_ms = batch.elapsed_ms as u64,
            "导入完成"
        );

        Ok(batch)
    }
}
