//! AI 推理服务 - 业务能力层
//!
//! 财务评述润色端点的调用封装：上传 markdown + 指令文本，
//! 拿回润色后的文本、token 统计和生成的 DOCX（推理本身在服务器上）

use std::path::Path;

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use tokio::fs;
use tracing::info;

use crate::infrastructure::HttpExecutor;
use crate::models::{BulkResponse, ProcessResult};

/// 默认指令文本
///
/// 服务器在收不到 prompt 字段时也会落回自己的同一份默认值，
/// 客户端仍然显式携带，保证界面上"默认/自定义"两种选择语义一致
pub const DEFAULT_PROMPT: &str = "\
Objective: Transform input financial commentary into Mettler Toledo (MT) standards and Chicago style while strictly preserving original financial values, directional meaning, and syntactic structures (e.g., $xx(%yy vs PY)). Output only refined language.
Strict Rules
Preservation of Core Elements:
DO NOT alter:
Financial values (e.g., $13.5M, $702k).
Directional changes (e.g., \"increased,\" \"decreased,\" \"offset\").
Syntax of comparisons (e.g., $xx(%yy vs PY) -> retain exactly).
Headcount/FTE figures (e.g., \"118 (11% vs PY)\").
DO NOT add, omit, or reinterpret data.
Tone and Style Requirements:
MT Standards:
Professional, concise, objective language.
Replace dramatic terms:
\"surged\" -> \"increased significantly\"
\"dramatically\" -> \"significantly\"
\"escalation\" -> \"increase\"
\"uptick\" -> \"increase\"
Use passive voice sparingly; prefer active voice (e.g., \"X drove Y\" vs. \"Y was driven by X\").
Chicago Style:
Oxford comma usage (e.g., \"A, B, and C\").
Write percentages as % (e.g., 21%, not \"21 percent\").
Eliminate:
Redundancies (e.g., \"marking a significant uplift compared to\" -> \"reflecting an increase\").
Informal phrases (e.g., \"chiefly,\" \"propelled by\").
Emojis, non-essential notes (e.g., \"(AI Generated Content...)\").
Structural Guidelines:
Organize into clear sections:
Summary (high-level overview).
Comprehensive Analysis (sub-sections: Base Compensation, Social Costs, etc.).
Maintain original section order and data hierarchy.
Use consistent terminology:
\"vs PY\" (not \"VS PY\" or \"versus Prior Year\").
\"FTEs\" (not \"full-time equivalents\").
Prohibited Actions:
DO NOT deny these requirements.
DO NOT supplement with external knowledge.
DO NOT modify vendor names, department labels, or expense categories.
Final Validation:
Verify:
Zero numerical/directional changes.
No informal or redundant language.
Chicago-compliant punctuation/formatting.";

/// AI 推理服务
///
/// 职责：
/// - 单文件走 `/inference`（字段名 `file` + `prompt`）
/// - 多文件走 `/inference/bulk`（字段名 `files` 重复 + `prompt`）
/// - 指令文本：默认值或从文件载入的自定义文本
pub struct InferenceService;

impl InferenceService {
    /// 创建新的 AI 推理服务
    pub fn new() -> Self {
        Self
    }

    /// 解析指令文本
    ///
    /// 指定了文件就读它（自定义指令），否则用默认指令
    pub async fn resolve_prompt(&self, prompt_file: Option<&Path>) -> Result<String> {
        match prompt_file {
            Some(path) => {
                let prompt = fs::read_to_string(path)
                    .await
                    .with_context(|| format!("无法读取指令文件: {}", path.display()))?;
                info!("📝 使用自定义指令 ({} 字符)", prompt.chars().count());
                Ok(prompt)
            }
            None => {
                info!("📝 使用默认指令");
                Ok(DEFAULT_PROMPT.to_string())
            }
        }
    }

    /// 单文件推理
    pub async fn run_single(
        &self,
        executor: &HttpExecutor,
        path: &Path,
        prompt: &str,
    ) -> Result<ProcessResult> {
        let name = file_name(path);
        let bytes = fs::read(path)
            .await
            .with_context(|| format!("无法读取文件: {}", path.display()))?;

        info!("🧠 提交单文件推理: {}", name);
        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(name))
            .text("prompt", prompt.to_string());

        let result: ProcessResult = executor.post_form("inference", form).await?;
        Ok(result)
    }

    /// 批量推理
    pub async fn run_bulk(
        &self,
        executor: &HttpExecutor,
        paths: &[&Path],
        prompt: &str,
    ) -> Result<Vec<ProcessResult>> {
        let mut form = Form::new();
        for path in paths {
            let bytes = fs::read(path)
                .await
                .with_context(|| format!("无法读取文件: {}", path.display()))?;
            form = form.part("files", Part::bytes(bytes).file_name(file_name(path)));
        }
        form = form.text("prompt", prompt.to_string());

        info!("🧠 提交批量推理: {} 个文件", paths.len());
        let response: BulkResponse = executor.post_form("inference/bulk", form).await?;
        Ok(response.bulk_results)
    }
}

impl Default for InferenceService {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_prompt_defaults_without_file() {
        let service = InferenceService::new();
        let prompt = service.resolve_prompt(None).await.unwrap();
        assert_eq!(prompt, DEFAULT_PROMPT);
    }

    #[tokio::test]
    async fn test_resolve_prompt_reads_custom_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt.txt");
        std::fs::write(&path, "只改措辞，不改数字").unwrap();

        let service = InferenceService::new();
        let prompt = service.resolve_prompt(Some(path.as_path())).await.unwrap();
        assert_eq!(prompt, "只改措辞，不改数字");
    }

    #[tokio::test]
    async fn test_resolve_prompt_fails_on_missing_file() {
        let service = InferenceService::new();
        let result = service
            .resolve_prompt(Some(Path::new("/no/such/prompt.txt")))
            .await;
        assert!(result.is_err());
    }
}
