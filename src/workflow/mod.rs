//! 流程层（Workflow Layer）
//!
//! 定义"一次运行"的完整流程：
//! - `cleaning_flow` - 清洗执行流程（前置检查 → 合成进度 → 调用 → 收尾）
//! - `document_flow` - pipeline / inference 共用的文档处理流程
//! - `run_ctx` - 运行上下文（会话 + 代号快照）
//! - `progress` - 合成进度计时器

pub mod cleaning_flow;
pub mod document_flow;
pub mod progress;
pub mod run_ctx;

pub use cleaning_flow::{CleaningFlow, ProcessingRun};
pub use document_flow::{DocumentFlow, DocumentMode, DocumentRun};
pub use progress::ProgressTicker;
pub use run_ctx::RunCtx;

/// 一次运行的状态机
///
/// `Idle → Submitting → { ResultsReady | Failed }`
/// 结果到达后可以任意切换选中项而不离开 ResultsReady；
/// 新的上传会回到 Idle 并丢弃全部旧结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Submitting,
    ResultsReady,
    Failed,
}
