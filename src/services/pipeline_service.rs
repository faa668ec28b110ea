//! 文档流水线服务 - 业务能力层
//!
//! markdown → DOCX 转换端点的调用封装（转换本身在服务器上）

use std::path::Path;

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use tokio::fs;
use tracing::info;

use crate::infrastructure::HttpExecutor;
use crate::models::{BulkResponse, ProcessResult};

/// 文档流水线服务
///
/// 职责：
/// - 单文件走 `/run_pipeline`（字段名 `file`）
/// - 多文件走 `/run_pipeline/bulk`（字段名 `files` 重复）
/// - 不关心结果怎么展示、保存
pub struct PipelineService;

impl PipelineService {
    /// 创建新的文档流水线服务
    pub fn new() -> Self {
        Self
    }

    /// 单文件转换
    pub async fn run_single(
        &self,
        executor: &HttpExecutor,
        path: &Path,
    ) -> Result<ProcessResult> {
        let name = file_name(path);
        let bytes = fs::read(path)
            .await
            .with_context(|| format!("无法读取文件: {}", path.display()))?;

        info!("📄 提交单文件转换: {}", name);
        let form = Form::new().part("file", Part::bytes(bytes).file_name(name));

        let result: ProcessResult = executor.post_form("run_pipeline", form).await?;
        Ok(result)
    }

    /// 批量转换
    pub async fn run_bulk(
        &self,
        executor: &HttpExecutor,
        paths: &[&Path],
    ) -> Result<Vec<ProcessResult>> {
        let mut form = Form::new();
        for path in paths {
            let bytes = fs::read(path)
                .await
                .with_context(|| format!("无法读取文件: {}", path.display()))?;
            form = form.part("files", Part::bytes(bytes).file_name(file_name(path)));
        }

        info!("📚 提交批量转换: {} 个文件", paths.len());
        let response: BulkResponse = executor.post_form("run_pipeline/bulk", form).await?;
        Ok(response.bulk_results)
    }
}

impl Default for PipelineService {
    fn default() -> Self {
        Self::new()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}
