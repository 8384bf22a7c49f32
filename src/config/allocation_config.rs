// ==========================================
// 学生转社分发系统 - 分发参数配置
// ==========================================
// 存储: JSON 文件，所有字段皆有默认值
// ==========================================

use crate::config::eligibility_config::EligibilityConfig;
use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 配置键名（用于错误讯息）
pub mod config_keys {
    pub const MAX_PREFERENCE_SLOTS: &str = "max_preference_slots";
    pub const PROGRESS_REPORT_INTERVAL: &str = "progress_report_interval";
    pub const SWAP_PASS_LIMIT: &str = "swap_pass_limit";
}

pub const DEFAULT_MAX_PREFERENCE_SLOTS: usize = 10;
pub const DEFAULT_BUDGET_PER_INDIVIDUAL: usize = 10;
pub const DEFAULT_BUDGET_BASE: usize = 2000;
pub const DEFAULT_PROGRESS_REPORT_INTERVAL: usize = 5;

// ==========================================
// IterationBudget - 连锁递补轮数上限
// ==========================================
// 上限 = 学生数 × per_individual + base
// 经验值，并非终止性证明；达到上限时以当下状态结束
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterationBudget {
    #[serde(default = "default_per_individual")]
    pub per_individual: usize,
    #[serde(default = "default_base")]
    pub base: usize,
}

fn default_per_individual() -> usize {
    DEFAULT_BUDGET_PER_INDIVIDUAL
}

fn default_base() -> usize {
    DEFAULT_BUDGET_BASE
}

impl IterationBudget {
    pub fn for_individuals(&self, count: usize) -> usize {
        count
            .saturating_mul(self.per_individual)
            .saturating_add(self.base)
    }
}

impl Default for IterationBudget {
    fn default() -> Self {
        Self {
            per_individual: DEFAULT_BUDGET_PER_INDIVIDUAL,
            base: DEFAULT_BUDGET_BASE,
        }
    }
}

// ==========================================
// AllocationConfig - 分发参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationConfig {
    /// 读取的志愿栏位数 K（志愿1..志愿K）
    #[serde(default = "default_max_preference_slots")]
    pub max_preference_slots: usize,

    #[serde(default)]
    pub iteration_budget: IterationBudget,

    /// 交换最佳化轮数上限；None 使用推导上界 n × (K + 1) + 1
    #[serde(default)]
    pub swap_pass_limit: Option<usize>,

    /// 进度日志间隔（轮）
    #[serde(default = "default_progress_report_interval")]
    pub progress_report_interval: usize,

    #[serde(default)]
    pub eligibility: EligibilityConfig,
}

fn default_max_preference_slots() -> usize {
    DEFAULT_MAX_PREFERENCE_SLOTS
}

fn default_progress_report_interval() -> usize {
    DEFAULT_PROGRESS_REPORT_INTERVAL
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            max_preference_slots: DEFAULT_MAX_PREFERENCE_SLOTS,
            iteration_budget: IterationBudget::default(),
            swap_pass_limit: None,
            progress_report_interval: DEFAULT_PROGRESS_REPORT_INTERVAL,
            eligibility: EligibilityConfig::default(),
        }
    }
}

impl AllocationConfig {
    /// 从 JSON 字串读取并校验
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: AllocationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 文件读取并校验
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&content)
    }

    /// 读取默认位置的配置；文件不存在时使用默认值
    pub fn load_default() -> Result<Self, ConfigError> {
        match default_config_path() {
            Some(path) if path.exists() => {
                tracing::info!(path = %path.display(), "读取默认配置");
                Self::load(path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_preference_slots == 0 {
            return Err(ConfigError::InvalidValue {
                key: config_keys::MAX_PREFERENCE_SLOTS.to_string(),
                message: "至少需要 1 个志愿栏位".to_string(),
            });
        }
        if self.progress_report_interval == 0 {
            return Err(ConfigError::InvalidValue {
                key: config_keys::PROGRESS_REPORT_INTERVAL.to_string(),
                message: "进度间隔必须大于 0".to_string(),
            });
        }
        if self.swap_pass_limit == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: config_keys::SWAP_PASS_LIMIT.to_string(),
                message: "交换轮数上限必须大于 0".to_string(),
            });
        }
        Ok(())
    }

    /// 连锁递补轮数上限
    pub fn chain_budget(&self, individuals: usize) -> usize {
        self.iteration_budget.for_individuals(individuals)
    }

    /// 交换最佳化轮数上限
    ///
    /// 每次交换使两人志愿序都严格变好，总交换次数不超过 n × (K + 1)，
    /// 每个有交换的轮次至少一次交换，因此推导上界不会在正常结束前触及。
    pub fn swap_budget(&self, individuals: usize) -> usize {
        match self.swap_pass_limit {
            Some(limit) => limit,
            None => individuals
                .saturating_mul(self.max_preference_slots.saturating_add(1))
                .saturating_add(1),
        }
    }
}

/// 默认配置文件位置: <config_dir>/club-transfer/config.json
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("club-transfer").join("config.json"))
}
