// ==========================================
// 学生转社分发系统 - 引擎进度事件
// ==========================================
// 职责: 定义进度观察 trait，供外部显示进度
// 红线: 观察者只读轮次，不得影响扫描顺序与异动结果
// ==========================================

use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ==========================================
// 进度事件
// ==========================================

/// 引擎阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocationPhase {
    /// 连锁递补
    ChainReaction,
    /// 交换最佳化
    SwapOptimization,
}

impl AllocationPhase {
    pub fn as_str(&self) -> &str {
        match self {
            AllocationPhase::ChainReaction => "ChainReaction",
            AllocationPhase::SwapOptimization => "SwapOptimization",
        }
    }
}

/// 进度事件（每轮开始时发出）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub phase: AllocationPhase,
    /// 第几轮（1-based）
    pub pass: usize,
    /// 该阶段轮数上限
    pub budget: usize,
}

// ==========================================
// 进度观察 Trait
// ==========================================

/// 进度观察者
///
/// 由调用方实现（进度条、日志等）；引擎只在轮与轮之间通知
pub trait AllocationProgressObserver: Send + Sync {
    fn on_pass_started(&self, event: &ProgressEvent);
}

/// 空操作观察者
#[derive(Debug, Clone, Default)]
pub struct NoOpProgressObserver;

impl AllocationProgressObserver for NoOpProgressObserver {
    fn on_pass_started(&self, _event: &ProgressEvent) {}
}

/// 以 tracing 输出进度，每 interval 轮一次
#[derive(Debug, Clone)]
pub struct TracingProgressObserver {
    interval: usize,
}

impl TracingProgressObserver {
    pub fn new(interval: usize) -> Self {
        Self {
            interval: interval.max(1),
        }
    }
}

impl AllocationProgressObserver for TracingProgressObserver {
    fn on_pass_started(&self, event: &ProgressEvent) {
        if event.pass % self.interval == 0 {
            tracing::info!(
                phase = event.phase.as_str(),
                pass = event.pass,
                budget = event.budget,
                "正在进行第 {} 轮扫描",
                event.pass
            );
        }
    }
}

/// 可选的观察者包装
#[derive(Clone, Default)]
pub struct OptionalProgressObserver {
    inner: Option<Arc<dyn AllocationProgressObserver>>,
}

impl OptionalProgressObserver {
    pub fn with_observer(observer: Arc<dyn AllocationProgressObserver>) -> Self {
        Self {
            inner: Some(observer),
        }
    }

    pub fn none() -> Self {
        Self { inner: None }
    }

    pub fn notify(&self, event: ProgressEvent) {
        if let Some(observer) = &self.inner {
            observer.on_pass_started(&event);
        }
    }

    pub fn is_configured(&self) -> bool {
        self.inner.is_some()
    }
}
