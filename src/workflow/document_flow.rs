//! 文档处理流程 - 流程层
//!
//! pipeline（markdown → DOCX）和 inference（AI 润色）共用的一套流程：
//! 选文件 → 单发/批量二选一 → 收结果列表 → 默认选中第一个供详情展示
//!
//! 单发/批量的判定：批量开关打开，或者选了超过一个文件。
//! 即使开关没开，两个以上文件也一律走批量端点

use anyhow::Result;
use tracing::{error, info};

use crate::error::StateError;
use crate::infrastructure::HttpExecutor;
use crate::models::{FileSelection, ProcessResult};
use crate::services::{InferenceService, PipelineService};
use crate::workflow::RunState;

/// 文档处理模式
#[derive(Debug, Clone)]
pub enum DocumentMode {
    /// markdown → DOCX 转换
    Pipeline,
    /// AI 润色（带指令文本）
    Inference { prompt: String },
}

impl DocumentMode {
    pub fn name(&self) -> &'static str {
        match self {
            DocumentMode::Pipeline => "pipeline",
            DocumentMode::Inference { .. } => "inference",
        }
    }
}

/// 一次文档处理运行的全部状态
///
/// 结果收到后不可变；切换选中项只动 `selected`，不离开 ResultsReady
#[derive(Debug)]
pub struct DocumentRun {
    pub state: RunState,
    pub results: Vec<ProcessResult>,
    /// 详情展示选中的结果下标（结果到达时自动选中第一个）
    pub selected: usize,
    pub error: Option<String>,
}

impl DocumentRun {
    fn new() -> Self {
        Self {
            state: RunState::Idle,
            results: Vec::new(),
            selected: 0,
            error: None,
        }
    }

    /// 当前选中的结果
    pub fn selected_result(&self) -> Option<&ProcessResult> {
        self.results.get(self.selected)
    }

    /// 切换详情展示的结果
    pub fn select(&mut self, index: usize) -> Result<(), StateError> {
        if index >= self.results.len() {
            return Err(StateError::IndexOutOfRange {
                index,
                len: self.results.len(),
            });
        }
        self.selected = index;
        Ok(())
    }

    /// 成功的结果数
    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.result.success).count()
    }
}

/// 文档处理流程
///
/// - 编排单发/批量二选一和结果收取
/// - 不持有 HttpExecutor
/// - 只依赖业务能力（PipelineService / InferenceService）
pub struct DocumentFlow {
    pipeline: PipelineService,
    inference: InferenceService,
}

impl DocumentFlow {
    /// 创建新的文档处理流程
    pub fn new() -> Self {
        Self {
            pipeline: PipelineService::new(),
            inference: InferenceService::new(),
        }
    }

    /// 单发/批量判定
    pub fn should_use_bulk(bulk_mode: bool, file_count: usize) -> bool {
        bulk_mode || file_count > 1
    }

    /// 执行一次文档处理运行
    ///
    /// 没有选文件返回 Err（不发请求）；
    /// 网络/服务器错误折叠进返回的 DocumentRun
    pub async fn run(
        &self,
        executor: &HttpExecutor,
        selection: &FileSelection,
        bulk_mode: bool,
        mode: &DocumentMode,
    ) -> Result<DocumentRun> {
        if selection.is_empty() {
            return Err(StateError::NoFilesSelected.into());
        }

        let mut run = DocumentRun::new();
        run.state = RunState::Submitting;

        let use_bulk = Self::should_use_bulk(bulk_mode, selection.len());
        info!(
            "🚀 提交 {} 运行: {} 个文件 ({})",
            mode.name(),
            selection.len(),
            if use_bulk { "批量" } else { "单发" }
        );

        let paths: Vec<_> = selection.paths().collect();
        let outcome = if use_bulk {
            match mode {
                DocumentMode::Pipeline => self.pipeline.run_bulk(executor, &paths).await,
                DocumentMode::Inference { prompt } => {
                    self.inference.run_bulk(executor, &paths, prompt).await
                }
            }
        } else {
            // 单发端点返回单个结果，包装成单元素列表统一后续处理
            let single = match mode {
                DocumentMode::Pipeline => self.pipeline.run_single(executor, paths[0]).await,
                DocumentMode::Inference { prompt } => {
                    self.inference.run_single(executor, paths[0], prompt).await
                }
            };
            single.map(|result| vec![result])
        };

        match outcome {
            Ok(results) => {
                run.results = results;
                run.selected = 0; // 自动选中第一个结果
                run.state = RunState::ResultsReady;
                info!(
                    "✅ {} 运行完成: {}/{} 个成功",
                    mode.name(),
                    run.success_count(),
                    run.results.len()
                );
            }
            Err(e) => {
                run.error = Some(e.to_string());
                run.state = RunState::Failed;
                error!("❌ {} 运行失败: {}", mode.name(), e);
            }
        }

        Ok(run)
    }
}

impl Default for DocumentFlow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileOutcome;

    fn result(filename: &str, success: bool) -> ProcessResult {
        ProcessResult {
            filename: filename.to_string(),
            result: FileOutcome {
                success,
                error: if success {
                    None
                } else {
                    Some("boom".to_string())
                },
                response: None,
                stats: None,
                docx_filename: None,
                docx_base64: None,
            },
            logs: String::new(),
        }
    }

    #[test]
    fn test_bulk_decision_table() {
        // 开关开 → 批量；两个以上文件 → 批量（开关状态无关）
        assert!(!DocumentFlow::should_use_bulk(false, 1));
        assert!(DocumentFlow::should_use_bulk(true, 1));
        assert!(DocumentFlow::should_use_bulk(false, 2));
        assert!(DocumentFlow::should_use_bulk(true, 3));
    }

    #[test]
    fn test_select_is_bounds_checked() {
        let mut run = DocumentRun::new();
        run.results = vec![result("a.md", true), result("b.md", false)];
        run.state = RunState::ResultsReady;

        run.select(1).unwrap();
        assert_eq!(run.selected_result().unwrap().filename, "b.md");
        // 切换选中不离开 ResultsReady
        assert_eq!(run.state, RunState::ResultsReady);

        assert!(run.select(2).is_err());
        assert_eq!(run.selected, 1);
    }

    #[test]
    fn test_success_count_skips_failures() {
        let mut run = DocumentRun::new();
        run.results = vec![
            result("a.md", true),
            result("b.md", false),
            result("c.md", true),
        ];
        assert_eq!(run.success_count(), 2);
    }
}
