//! 应用编排器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责一次完整工作流的调度和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：启动运行日志、创建 HttpExecutor、建立共享状态
//! 2. **状态装配**：把配置翻译成命名意图（选指标、开关规则、批量模式）
//! 3. **指标分派**：清洗类指标走 上传 → 清洗 → 下载；
//!    文档类指标走 提交 → 收结果 → 写出文档
//! 4. **资源所有者**：唯一持有 HttpExecutor 的模块，向下按引用借出
//! 5. **全局统计**：汇总一次运行的成败并落运行日志

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::infrastructure::HttpExecutor;
use crate::models::{FileSelection, FileStatus, Metric, VendorAnalysisType};
use crate::services::{
    CleaningService, DocxWriter, DownloadService, InferenceService, PreviewKind, UploadService,
};
use crate::state::AppState;
use crate::utils::logging::{append_run_log, init_log_file, truncate_text};
use crate::workflow::{CleaningFlow, DocumentFlow, DocumentMode, RunState};

/// 应用主结构
pub struct App {
    config: Config,
    executor: HttpExecutor,
    state: AppState,
}

/// 一次运行的统计
#[derive(Debug, Default)]
struct RunStats {
    produced: usize,
    saved: usize,
    failed: usize,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化运行日志文件
        init_log_file(&config.run_log_file)?;

        log_startup(&config);

        let executor = HttpExecutor::new(
            &config.server_base_url,
            std::time::Duration::from_secs(config.request_timeout_secs),
        )?;

        Ok(Self {
            config,
            executor,
            state: AppState::new(),
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&mut self) -> Result<()> {
        // 把配置翻译成状态意图
        self.apply_config_to_state()?;

        // 收集输入文件
        let mut selection = self.load_selection().await?;
        if selection.is_empty() {
            warn!("⚠️ 输入路径下没有任何文件，程序结束");
            return Ok(());
        }
        log_selection(&selection, self.state.bulk_mode());

        // 按指标分派
        let metric = self.state.selection().metric;
        let stats = if metric.is_document_mode() {
            self.run_documents(metric, &mut selection).await?
        } else {
            self.run_cleaning(&mut selection).await?
        };

        print_final_stats(&stats, &self.config);
        Ok(())
    }

    /// 把配置翻译成命名意图
    fn apply_config_to_state(&mut self) -> Result<()> {
        let metric = Metric::from_key(&self.config.metric)
            .with_context(|| format!("配置里的指标无效: {}", self.config.metric))?;
        self.state.select_metric(metric);

        if let Some(sub_metric) = self.config.sub_metric.clone() {
            self.state
                .select_sub_metric(&sub_metric)
                .with_context(|| format!("配置里的子指标无效: {}", sub_metric))?;
        }

        match VendorAnalysisType::from_key(&self.config.vendor_analysis_type) {
            Some(analysis_type) => self.state.set_vendor_analysis_type(analysis_type),
            None => warn!(
                "⚠️ 未知的供应商分析类型 '{}'，使用默认值 mom",
                self.config.vendor_analysis_type
            ),
        }

        self.state.set_rules(self.config.rules.clone());
        self.state.set_bulk_mode(self.config.bulk_mode);
        Ok(())
    }

    /// 收集输入文件；输入是文件夹时自动进入批量模式
    async fn load_selection(&mut self) -> Result<FileSelection> {
        info!("\n📁 正在扫描输入文件...");
        let path = PathBuf::from(&self.config.input_path);
        let is_dir = tokio::fs::metadata(&path)
            .await
            .with_context(|| format!("无法访问输入路径: {}", path.display()))?
            .is_dir();

        if is_dir {
            self.state.set_bulk_mode(true);
        }
        FileSelection::from_path(&path).await
    }

    // ========== 清洗类指标 ==========

    async fn run_cleaning(&mut self, selection: &mut FileSelection) -> Result<RunStats> {
        let mut stats = RunStats::default();

        // 上传换会话；失败时会话保持为空，后续流程直接拒绝运行
        let upload_service = UploadService::new();
        match upload_service.upload(&self.executor, selection).await {
            Ok(session_id) => self.state.store_session(session_id),
            Err(e) => {
                error!("❌ 上传失败: {}", e);
                stats.failed = selection.len();
                return Ok(stats);
            }
        }

        if self.config.preview_data {
            self.log_preview(PreviewKind::Raw).await;
        }

        selection.mark_all(FileStatus::Processing);
        let flow = CleaningFlow::new(&self.config);
        let run = flow.run(&self.executor, &self.state).await?;

        // 运行日志落盘（无论成败）
        if let Err(e) = append_run_log(&self.config.run_log_file, &run.logs) {
            warn!("⚠️ 写运行日志失败: {}", e);
        }

        match run.state {
            RunState::ResultsReady => {
                selection.mark_all(FileStatus::Cleaned);
                stats.produced = run.cleaned_files.len();
                log_cleaned_files(&run.cleaned_files, run.progress);

                if self.config.preview_data {
                    self.log_preview(PreviewKind::Cleaned).await;
                }

                stats.saved = self.download_outputs(&run.cleaned_files).await;
                stats.failed = stats.produced - stats.saved;
            }
            _ => {
                selection.mark_all(FileStatus::Error);
                stats.failed = selection.len();
                info!("进度停在 {}%", run.progress);
            }
        }

        Ok(stats)
    }

    /// 把产出文件拉回本地（可选再拉整包 zip）
    async fn download_outputs(&self, cleaned_files: &[String]) -> usize {
        // 会话在上传成功后一定存在
        let Some(session_id) = self.state.session() else {
            return 0;
        };

        let download_service = DownloadService::new(&self.config.output_dir);
        let report = download_service
            .download_all(&self.executor, session_id, cleaned_files)
            .await;

        for (name, reason) in &report.failures {
            error!("❌ {} 下载失败: {}", name, reason);
        }

        if self.config.zip_download {
            match download_service.download_zip(&self.executor, session_id).await {
                Ok(path) => info!("📦 整包已保存: {}", path.display()),
                Err(e) => error!("❌ 整包下载失败: {}", e),
            }
        }

        report.saved.len()
    }

    /// 拉一次数据预览并打进日志
    async fn log_preview(&self, kind: PreviewKind) {
        let Some(session_id) = self.state.session() else {
            return;
        };

        let cleaning_service = CleaningService::new();
        match cleaning_service
            .preview(&self.executor, session_id, kind, self.state.selection())
            .await
        {
            Ok(preview) => {
                info!(
                    "🔎 预览 {}: 共 {} 行，展示前 {} 行",
                    preview.filename,
                    preview.total_rows,
                    preview.data.len()
                );
                if self.config.verbose_logging {
                    for row in &preview.data {
                        info!("   {}", truncate_text(&serde_json::json!(row).to_string(), 160));
                    }
                }
            }
            Err(e) => warn!("⚠️ 预览获取失败: {}", e),
        }
    }

    // ========== 文档类指标 ==========

    async fn run_documents(
        &mut self,
        metric: Metric,
        selection: &mut FileSelection,
    ) -> Result<RunStats> {
        let mode = match metric {
            Metric::Inference => {
                let inference_service = InferenceService::new();
                let prompt = inference_service
                    .resolve_prompt(self.config.prompt_file.as_deref().map(Path::new))
                    .await?;
                DocumentMode::Inference { prompt }
            }
            _ => DocumentMode::Pipeline,
        };

        let mut stats = RunStats::default();
        selection.mark_all(FileStatus::Processing);

        let flow = DocumentFlow::new();
        let run = flow
            .run(&self.executor, selection, self.state.bulk_mode(), &mode)
            .await?;

        match run.state {
            RunState::ResultsReady => {
                selection.mark_all(FileStatus::Cleaned);
                stats.produced = run.results.len();

                // 自动选中的第一个结果展示详情
                if let Some(result) = run.selected_result() {
                    log_result_detail(result, &mode, self.config.verbose_logging);
                }

                let writer = DocxWriter::new(&self.config.output_dir);
                let report = writer.save_successful(&run.results).await;
                stats.saved = report.saved.len();
                stats.failed = run.results.len() - report.saved.len();

                if report.skipped > 0 {
                    info!("⚠️ {} 个失败的结果被跳过", report.skipped);
                }
                for (name, reason) in &report.failures {
                    error!("❌ {} 的文档写出失败: {}", name, reason);
                }
            }
            _ => {
                selection.mark_all(FileStatus::Error);
                stats.failed = selection.len();
                if let Some(reason) = &run.error {
                    error!("❌ 运行失败: {}", reason);
                }
            }
        }

        Ok(stats)
    }
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 数据清洗工作台客户端");
    info!("🌐 服务器: {}", config.server_base_url);
    info!("📊 指标: {}", config.metric);
    info!("{}", "=".repeat(60));
}

fn log_selection(selection: &FileSelection, bulk_mode: bool) {
    info!(
        "✓ 选中 {} 个文件 (来自 {}){}",
        selection.len(),
        selection.display_name(),
        if bulk_mode { " [批量模式]" } else { "" }
    );
    for file in selection.files() {
        info!("   - {} ({} 字节)", file.name, file.size);
    }
}

fn log_cleaned_files(cleaned_files: &[String], progress: u8) {
    info!("\n{}", "─".repeat(60));
    info!("✅ 清洗完成 (进度 {}%)，产出 {} 个文件:", progress, cleaned_files.len());
    for name in cleaned_files {
        info!("   - {}", name);
    }
    info!("{}", "─".repeat(60));
}

/// 展示一个结果的详情（对应界面上的详情标签页）
fn log_result_detail(
    result: &crate::models::ProcessResult,
    mode: &DocumentMode,
    verbose_logging: bool,
) {
    info!("\n{}", "─".repeat(60));
    info!("📋 结果详情: {}", result.filename);

    if result.result.success {
        if let DocumentMode::Inference { .. } = mode {
            if let Some(response) = &result.result.response {
                info!("润色结果:\n{}", truncate_text(response, 800));
            }
            if let Some(stats) = &result.result.stats {
                info!(
                    "token 统计: 输入 {} / 指令 {} / 输出 {} / 合计 {}",
                    stats.input_tokens,
                    stats.prompt_tokens,
                    stats.output_tokens,
                    stats.total_tokens
                );
            }
        }
    } else if let Some(error_message) = &result.result.error {
        info!("❌ 处理失败: {}", error_message);
    }

    if !result.logs.is_empty() {
        if verbose_logging {
            info!("处理日志:\n{}", result.logs);
        } else {
            info!("处理日志:\n{}", truncate_text(&result.logs, 400));
        }
    }
    info!("{}", "─".repeat(60));
}

fn print_final_stats(stats: &RunStats, config: &Config) {
    info!("\n{}", "=".repeat(60));
    info!("📊 本次运行统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 产出: {} | 已保存: {}", stats.produced, stats.saved);
    info!("❌ 失败: {}", stats.failed);
    info!("{}", "=".repeat(60));
    info!("\n运行日志已保存至: {}", config.run_log_file);
}
