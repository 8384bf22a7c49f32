// ==========================================
// 学生转社分发系统 - 配置层
// ==========================================
// 职责: 分发参数、年级转入限制
// 存储: JSON 文件（缺省值可直接使用）
// ==========================================

pub mod allocation_config;
pub mod eligibility_config;

use thiserror::Error;

// 重导出核心配置
pub use allocation_config::{config_keys, default_config_path, AllocationConfig, IterationBudget};
pub use eligibility_config::{
    CohortRestriction, EligibilityConfig, EligibilityRule, EligibilityRules,
};

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {message}")]
    FileReadError { path: String, message: String },

    #[error("配置解析失败: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("配置值错误 (key: {key}): {message}")]
    InvalidValue { key: String, message: String },
}
