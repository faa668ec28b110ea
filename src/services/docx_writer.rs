//! 文档写出服务 - 业务能力层
//!
//! 只负责"把结果里的 base64 文档解码落盘"能力，不关心流程

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult, DecodeError};
use crate::models::ProcessResult;
use crate::utils::filename::sanitize_filename;

/// 批量写出的结果清单
#[derive(Debug, Default)]
pub struct SaveReport {
    /// 成功落盘的本地路径
    pub saved: Vec<PathBuf>,
    /// 因 result.success == false 被跳过的数量
    pub skipped: usize,
    /// 解码/写盘失败的 (文件名, 错误信息)
    pub failures: Vec<(String, String)>,
}

/// 文档写出服务
///
/// 职责：
/// - 解码单个结果里的 base64 DOCX 数据
/// - 文件名优先用服务器给的，否则按原名推导
/// - 解码失败只影响当前结果，不影响同批次的其他结果
pub struct DocxWriter {
    output_dir: PathBuf,
}

impl DocxWriter {
    /// 创建新的文档写出服务
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 把一个结果的生成文档写到输出目录
    ///
    /// # 参数
    /// - `result`: 单个文件的处理结果（必须带 docx_base64）
    ///
    /// # 返回
    /// 返回落盘后的本地路径
    pub async fn save(&self, result: &ProcessResult) -> AppResult<PathBuf> {
        let payload = result
            .result
            .docx_base64
            .as_deref()
            .ok_or_else(|| DecodeError::MissingPayload {
                filename: result.filename.clone(),
            })?;

        let bytes = BASE64
            .decode(payload)
            .map_err(|e| DecodeError::Base64DecodeFailed {
                filename: result.filename.clone(),
                source: Box::new(e),
            })?;

        debug!(
            "解码 {} 的文档数据: {} 字节",
            result.filename,
            bytes.len()
        );

        fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| AppError::file_write_failed(self.output_dir.display().to_string(), e))?;

        let local_path = self
            .output_dir
            .join(sanitize_filename(&result.output_filename()));
        fs::write(&local_path, &bytes)
            .await
            .map_err(|e| AppError::file_write_failed(local_path.display().to_string(), e))?;

        info!("⬇ 已保存文档: {}", local_path.display());
        Ok(local_path)
    }

    /// 写出一批结果里所有成功的文档
    ///
    /// 失败的结果静默跳过，解码失败只记录、不中断其余写出
    pub async fn save_successful(&self, results: &[ProcessResult]) -> SaveReport {
        let mut report = SaveReport::default();

        for result in results {
            if !result.result.success {
                report.skipped += 1;
                continue;
            }
            match self.save(result).await {
                Ok(path) => report.saved.push(path),
                Err(e) => {
                    warn!("⚠️ 写出 {} 的文档失败: {}", result.filename, e);
                    report.failures.push((result.filename.clone(), e.to_string()));
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileOutcome;

    fn result_with_payload(filename: &str, payload: Option<String>, success: bool) -> ProcessResult {
        ProcessResult {
            filename: filename.to_string(),
            result: FileOutcome {
                success,
                error: None,
                response: None,
                stats: None,
                docx_filename: None,
                docx_base64: payload,
            },
            logs: String::new(),
        }
    }

    #[tokio::test]
    async fn test_save_decodes_and_writes() {
        let dir = tempfile::tempdir().unwrap();
        let writer = DocxWriter::new(dir.path());
        let result = result_with_payload("report.md", Some(BASE64.encode(b"PK\x03\x04docx")), true);

        let path = writer.save(&result).await.unwrap();
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            "processed_report.docx"
        );
        assert_eq!(std::fs::read(&path).unwrap(), b"PK\x03\x04docx");
    }

    #[tokio::test]
    async fn test_save_reports_missing_payload() {
        let dir = tempfile::tempdir().unwrap();
        let writer = DocxWriter::new(dir.path());
        let result = result_with_payload("report.md", None, true);

        let err = writer.save(&result).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Decode(DecodeError::MissingPayload { .. })
        ));
    }

    #[tokio::test]
    async fn test_save_reports_malformed_base64() {
        let dir = tempfile::tempdir().unwrap();
        let writer = DocxWriter::new(dir.path());
        let result = result_with_payload("report.md", Some("!!!不是base64!!!".to_string()), true);

        let err = writer.save(&result).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Decode(DecodeError::Base64DecodeFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_save_successful_skips_failed_entries() {
        let dir = tempfile::tempdir().unwrap();
        let writer = DocxWriter::new(dir.path());

        let results = vec![
            result_with_payload("a.md", Some(BASE64.encode(b"aaa")), true),
            result_with_payload("b.md", Some(BASE64.encode(b"bbb")), false),
            result_with_payload("c.md", Some(BASE64.encode(b"ccc")), true),
        ];

        let report = writer.save_successful(&results).await;
        // 成功 2 个，失败的 1 个被静默跳过
        assert_eq!(report.saved.len(), 2);
        assert_eq!(report.skipped, 1);
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn test_save_successful_isolates_decode_failures() {
        let dir = tempfile::tempdir().unwrap();
        let writer = DocxWriter::new(dir.path());

        let results = vec![
            result_with_payload("a.md", Some("@@broken@@".to_string()), true),
            result_with_payload("b.md", Some(BASE64.encode(b"bbb")), true),
        ];

        let report = writer.save_successful(&results).await;
        // 解码失败只影响自己
        assert_eq!(report.saved.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, "a.md");
    }
}
