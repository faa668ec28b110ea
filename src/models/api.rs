//! 后端接口的线上数据结构
//!
//! 服务器是黑盒，这里只声明客户端消费的字段形状

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// `/upload` 的成功响应
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub session_id: String,
}

/// `/clean_*` 端点的成功响应
#[derive(Debug, Clone, Deserialize)]
pub struct CleanResponse {
    /// 产出文件名列表（终态一次性返回，不会增量出现）
    #[serde(default)]
    pub cleaned_files: Vec<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// 部分步骤失败时服务器会附带说明（例如分组失败但仍返回了文件）
    #[serde(default)]
    pub logs: Option<String>,
}

/// `/remove_duplicates/{sid}` 的响应
#[derive(Debug, Clone, Deserialize)]
pub struct DuplicateRemovalResponse {
    #[serde(default)]
    pub message: Option<String>,
    /// 去重后保留的文件；没有可处理文件时服务器只回 message
    #[serde(default)]
    pub cleaned_files: Option<Vec<String>>,
}

/// `/preview/{sid}` 的响应
#[derive(Debug, Clone, Deserialize)]
pub struct PreviewResponse {
    pub filename: String,
    /// 前几行数据，每行是 列名 → 值 的映射
    #[serde(default)]
    pub data: Vec<serde_json::Map<String, JsonValue>>,
    pub total_rows: u64,
    #[serde(default)]
    pub preview_type: Option<String>,
    #[serde(default)]
    pub processing_type: Option<String>,
    #[serde(default)]
    pub sheet_name: Option<String>,
}

/// 单个文件的处理结果（pipeline / inference 共用）
///
/// 收到后不可变；切换详情展示不会修改它
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResult {
    pub filename: String,
    pub result: FileOutcome,
    #[serde(default)]
    pub logs: String,
}

impl ProcessResult {
    /// 生成文档的落盘文件名
    ///
    /// 优先用服务器给的名字，否则从原始文件名推导：
    /// `processed_<去掉 .md 后缀的原名>.docx`
    pub fn output_filename(&self) -> String {
        if let Some(name) = self.result.docx_filename.as_deref() {
            if !name.is_empty() {
                return name.to_string();
            }
        }
        let stem = self
            .filename
            .strip_suffix(".md")
            .unwrap_or(&self.filename);
        format!("processed_{}.docx", stem)
    }
}

/// 单个文件的处理结局
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOutcome {
    pub success: bool,
    /// 失败时的错误信息（原样展示）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// inference 模式下 AI 返回的文本
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    /// inference 模式下的 token 统计
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<InferenceStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docx_filename: Option<String>,
    /// base64 编码的生成文档
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docx_base64: Option<String>,
}

/// token 用量统计
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InferenceStats {
    pub input_tokens: u64,
    pub prompt_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

/// 批量端点的响应
#[derive(Debug, Clone, Deserialize)]
pub struct BulkResponse {
    pub bulk_results: Vec<ProcessResult>,
}

/// 非 2xx 响应的 JSON 体
///
/// 清洗端点的部分失败用 `message` 字段，其余端点用 `error` 字段
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorBody {
    /// 取服务器给的错误原文
    pub fn into_message(self) -> Option<String> {
        self.error.or(self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_filename_prefers_server_name() {
        let result: ProcessResult = serde_json::from_value(serde_json::json!({
            "filename": "commentary.md",
            "result": { "success": true, "docx_filename": "commentary_final.docx" },
            "logs": ""
        }))
        .unwrap();
        assert_eq!(result.output_filename(), "commentary_final.docx");
    }

    #[test]
    fn test_output_filename_derives_from_md_name() {
        let result: ProcessResult = serde_json::from_value(serde_json::json!({
            "filename": "june_report.md",
            "result": { "success": true },
        }))
        .unwrap();
        assert_eq!(result.output_filename(), "processed_june_report.docx");
    }

    #[test]
    fn test_output_filename_keeps_non_md_name_whole() {
        let result: ProcessResult = serde_json::from_value(serde_json::json!({
            "filename": "notes.txt",
            "result": { "success": true },
        }))
        .unwrap();
        assert_eq!(result.output_filename(), "processed_notes.txt.docx");
    }

    #[test]
    fn test_error_body_prefers_error_field() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"error": "Invalid session ID", "message": "ignored"}"#)
                .unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Invalid session ID"));

        let body: ApiErrorBody =
            serde_json::from_str(r#"{"message": "Sales processing failed"}"#).unwrap();
        assert_eq!(
            body.into_message().as_deref(),
            Some("Sales processing failed")
        );
    }

    #[test]
    fn test_bulk_response_shape() {
        let response: BulkResponse = serde_json::from_value(serde_json::json!({
            "bulk_results": [
                {
                    "filename": "a.md",
                    "result": { "success": true, "docx_base64": "UEsDBA==" },
                    "logs": "Success"
                },
                {
                    "filename": "b.md",
                    "result": { "success": false, "error": "Output file not found" },
                    "logs": "Pipeline executed, but specific output file missing."
                }
            ]
        }))
        .unwrap();
        assert_eq!(response.bulk_results.len(), 2);
        assert!(response.bulk_results[0].result.success);
        assert_eq!(
            response.bulk_results[1].result.error.as_deref(),
            Some("Output file not found")
        );
    }
}
