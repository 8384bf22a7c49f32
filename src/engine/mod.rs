// ==========================================
// 学生转社分发系统 - 引擎层
// ==========================================
// 职责: 年级判定、志愿过滤、社团名册、连锁递补、交换最佳化、结果整理
// 红线: 引擎不读写文件；单线程同步执行
// ==========================================

pub mod chain_reaction;
pub mod cohort;
pub mod events;
pub mod ledger;
pub mod materializer;
pub mod orchestrator;
pub mod preference;
pub mod state;
pub mod swap;

// 重导出核心引擎
pub use chain_reaction::{ChainReactionAllocator, ChainReactionReport, PassOutcome};
pub use cohort::CohortClassifier;
pub use events::{
    AllocationPhase, AllocationProgressObserver, NoOpProgressObserver, OptionalProgressObserver,
    ProgressEvent, TracingProgressObserver,
};
pub use ledger::{CapacityLedger, LedgerViolation};
pub use materializer::ResultMaterializer;
pub use orchestrator::{AllocationError, AllocationOrchestrator};
pub use preference::PreferenceListBuilder;
pub use state::AllocationState;
pub use swap::{SwapOptimizer, SwapReport};
