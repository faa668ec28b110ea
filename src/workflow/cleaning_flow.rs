//! 清洗执行流程 - 流程层
//!
//! 核心职责：定义"一次清洗运行"的完整流程
//!
//! 流程顺序：
//! 1. 前置检查（会话存在、指标有端点）→ 不满足则不发任何请求
//! 2. 启动合成进度 → 调用清洗端点 → 成功置 100 / 失败停在原地
//! 3. 规则开关里开了去重时，追加一次输出去重调用

use std::time::Duration;

use anyhow::Result;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::StateError;
use crate::infrastructure::HttpExecutor;
use crate::services::CleaningService;
use crate::state::AppState;
use crate::workflow::progress::ProgressTicker;
use crate::workflow::run_ctx::RunCtx;
use crate::workflow::RunState;

/// 一次清洗运行的全部状态
///
/// 每次运行开始时重置；cleaned_files 只会从成功的终态响应里填充，
/// 不会增量出现
#[derive(Debug)]
pub struct ProcessingRun {
    pub state: RunState,
    /// 合成进度，成功后为 100，失败时停在中断处
    pub progress: u8,
    pub cleaned_files: Vec<String>,
    pub logs: Vec<String>,
}

impl ProcessingRun {
    fn new() -> Self {
        Self {
            state: RunState::Idle,
            progress: 0,
            cleaned_files: Vec::new(),
            logs: Vec::new(),
        }
    }

    /// 追加一条带时间戳的运行日志
    pub fn push_log(&mut self, message: impl AsRef<str>) {
        self.logs.push(format!(
            "[{}] {}",
            chrono::Local::now().format("%H:%M:%S"),
            message.as_ref()
        ));
    }
}

/// 清洗执行流程
///
/// - 编排一次清洗运行：前置检查 → 进度 → 调用 → 收尾
/// - 不持有 HttpExecutor（由编排层传入）
/// - 只依赖业务能力（CleaningService）
pub struct CleaningFlow {
    cleaning: CleaningService,
    progress_step: u8,
    progress_interval: Duration,
    progress_cap: u8,
}

impl CleaningFlow {
    /// 创建新的清洗执行流程
    pub fn new(config: &Config) -> Self {
        Self {
            cleaning: CleaningService::new(),
            progress_step: config.progress_step,
            progress_interval: Duration::from_millis(config.progress_interval_ms),
            progress_cap: config.progress_cap,
        }
    }

    /// 执行一次清洗运行
    ///
    /// 前置条件不满足返回 Err（没有发出任何网络请求）；
    /// 网络/服务器错误不抛出，折叠进返回的 ProcessingRun
    pub async fn run(&self, executor: &HttpExecutor, state: &AppState) -> Result<ProcessingRun> {
        // ========== 前置检查 ==========
        let Some(session_id) = state.session() else {
            warn!("⚠️ 尚未上传文件，拒绝运行清洗");
            return Err(StateError::MissingSession.into());
        };
        // 指标没有端点时同样不发请求
        CleaningService::endpoint_for(state.selection())?;

        let ctx = RunCtx::new(
            session_id,
            state.generation(),
            state.selection().metric.name(),
        );

        let mut run = ProcessingRun::new();
        run.state = RunState::Submitting;
        run.push_log(format!("{} 开始清洗", ctx));
        info!("{} 🚀 开始清洗运行", ctx);

        // 合成进度：纯装饰，只在响应成功后到 100
        let ticker = ProgressTicker::start(
            self.progress_step,
            self.progress_interval,
            self.progress_cap,
        );

        let outcome = self
            .cleaning
            .run(
                executor,
                &ctx.session_id,
                state.selection(),
                state.rules(),
                state.bulk_mode(),
                state.vendor_analysis_type(),
            )
            .await;

        match outcome {
            Ok(response) => {
                // 过期响应：会话已被清除或替换，丢弃而不是回写
                if !state.is_current(ctx.generation) {
                    run.progress = ticker.halt();
                    run.state = RunState::Failed;
                    run.push_log("结果已过期（会话被替换），丢弃");
                    warn!("{} ⚠️ 过期结果被丢弃", ctx);
                    return Ok(run);
                }

                run.progress = ticker.finish();
                run.cleaned_files = response.cleaned_files;
                if let Some(server_logs) = response.logs {
                    run.push_log(server_logs);
                }
                run.push_log(format!(
                    "✅ 清洗完成，产出 {} 个文件",
                    run.cleaned_files.len()
                ));
                run.state = RunState::ResultsReady;
                info!("{} ✅ 清洗完成: {} 个产出文件", ctx, run.cleaned_files.len());

                // ========== 追加步骤：输出去重 ==========
                if state.rules().remove_duplicates {
                    self.remove_duplicates(executor, &ctx, &mut run).await;
                }
            }
            Err(e) => {
                run.progress = ticker.halt();
                run.push_log(format!("❌ 清洗失败: {}", e));
                run.state = RunState::Failed;
                error!("{} ❌ 清洗失败: {}", ctx, e);
            }
        }

        Ok(run)
    }

    /// 对输出做一次文件级去重
    ///
    /// 失败只记日志，不影响已经拿到的产出列表
    async fn remove_duplicates(
        &self,
        executor: &HttpExecutor,
        ctx: &RunCtx,
        run: &mut ProcessingRun,
    ) {
        match self.cleaning.remove_duplicates(executor, &ctx.session_id).await {
            Ok(response) => {
                if let Some(kept) = response.cleaned_files {
                    info!("{} 🧹 去重后保留 {} 个文件", ctx, kept.len());
                    run.push_log(format!("去重后保留 {} 个文件", kept.len()));
                    run.cleaned_files = kept;
                } else if let Some(message) = response.message {
                    run.push_log(message);
                }
            }
            Err(e) => {
                warn!("{} ⚠️ 去重步骤失败: {}", ctx, e);
                run.push_log(format!("去重步骤失败: {}", e));
            }
        }
    }
}
