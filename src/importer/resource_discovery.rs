// ==========================================
// 学生转社分发系统 - 社团名称收集
// ==========================================
// 职责: 从学生志愿表收集社团名称，产生缺额表范本
// ==========================================

use crate::domain::individual::IndividualRecord;
use crate::domain::resource::QuotaRecord;
use std::collections::BTreeSet;

/// 收集所有原社团与志愿中出现的社团名称（去重、升序）
pub fn discover_resource_names(records: &[IndividualRecord]) -> Vec<String> {
    let mut names = BTreeSet::new();
    for record in records {
        let candidates = std::iter::once(&record.home_resource).chain(record.preferences.iter());
        for name in candidates {
            let name = name.trim();
            if !name.is_empty() {
                names.insert(name.to_string());
            }
        }
    }
    names.into_iter().collect()
}

/// 缺额表范本（每个社团缺额为 0，供人工填写）
pub fn quota_template(records: &[IndividualRecord]) -> Vec<QuotaRecord> {
    discover_resource_names(records)
        .into_iter()
        .map(|name| QuotaRecord {
            resource_name: name,
            open_quota: 0,
        })
        .collect()
}

/// 可供设定转社限制的社团名称（学生资料 + 缺额表，去重、升序）
pub fn known_resource_names(records: &[IndividualRecord], quotas: &[QuotaRecord]) -> Vec<String> {
    let mut names: BTreeSet<String> = discover_resource_names(records).into_iter().collect();
    names.extend(
        quotas
            .iter()
            .map(|q| q.resource_name.trim())
            .filter(|n| !n.is_empty())
            .map(str::to_string),
    );
    names.into_iter().collect()
}
