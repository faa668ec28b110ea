//! # Data Cleaning Client
//!
//! 财务数据清洗工作台的命令行客户端：上传报表/markdown 文件、
//! 选指标、开关清洗规则，调用后端完成清洗或文档转换，再把产出取回本地。
//! 清洗算法、AI 推理和 DOCX 生成全部在外部服务器上，本仓库只做会话级的
//! 工作流编排。
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（reqwest 客户端），只暴露能力
//! - `HttpExecutor` - 唯一的 client owner，提供 post/get 能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个服务只管一件事
//! - `UploadService` - 上传换会话能力
//! - `CleaningService` - 端点选择 / 请求体组装 / 清洗调用能力
//! - `PipelineService` / `InferenceService` - 文档端点调用能力
//! - `DownloadService` / `DocxWriter` - 产出取回与文档落盘能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次运行"的完整处理流程
//! - `RunCtx` - 上下文封装（会话 ID + 代号）
//! - `CleaningFlow` - 清洗流程编排（前置检查 → 进度 → 调用 → 收尾）
//! - `DocumentFlow` - 文档流程编排（单发/批量二选一 → 收结果）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/` - 一次完整运行的调度，唯一持有 HttpExecutor
//!
//! 共享状态集中在 `state::AppState`，所有修改都走命名意图。
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod state;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::HttpExecutor;
pub use models::{Metric, MetricSelection, ProcessResult, RuleName, RuleSet};
pub use orchestrator::App;
pub use state::AppState;
pub use workflow::{CleaningFlow, DocumentFlow, DocumentMode, RunState};
