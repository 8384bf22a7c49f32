// ==========================================
// 学生转社分发系统 - 核心库
// ==========================================
// 技术栈: Rust（同步单线程引擎）+ CSV/Excel 导入导出
// 系统定位: 依填写时间优先序的连锁递补 + 两两交换最佳化
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 配置层 - 分发配置
pub mod config;

// 引擎层 - 分发规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 输出层 - 报表
pub mod exporter;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{Cohort, FinalRank, Outcome};

// 领域实体
pub use domain::{
    AllocationOutput, AllocationRecord, AllocationStats, Individual, IndividualRecord,
    MoveLogEntry, QuotaRecord, RemainingCapacity, Resource, SwapLogEntry,
};

// 配置
pub use config::{AllocationConfig, EligibilityConfig, EligibilityRule, IterationBudget};

// 引擎
pub use engine::{
    AllocationError, AllocationOrchestrator, AllocationState, CapacityLedger,
    ChainReactionAllocator, CohortClassifier, PreferenceListBuilder, ResultMaterializer,
    SwapOptimizer,
};

// 导入 / 输出
pub use exporter::{ExportError, ReportWriter};
pub use importer::{AllocationImporter, DqReport, ImportError};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "学生转社分发系统";
