//! 上传服务 - 业务能力层
//!
//! 只负责"把选中的文件传给服务器换一个会话 ID"这一件事

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use tokio::fs;
use tracing::{debug, info};

use crate::error::StateError;
use crate::infrastructure::HttpExecutor;
use crate::models::{FileSelection, UploadResponse};

/// 上传服务
///
/// 职责：
/// - 把一批本地文件打包成 multipart 请求（统一字段名 `files`）
/// - 调用 `/upload`，返回服务器签发的会话 ID
/// - 一次请求覆盖全部文件，客户端视角没有部分成功
pub struct UploadService;

impl UploadService {
    /// 创建新的上传服务
    pub fn new() -> Self {
        Self
    }

    /// 上传一批文件，返回会话 ID
    ///
    /// # 参数
    /// - `executor`: HTTP 执行器
    /// - `selection`: 选中的文件清单（必须非空）
    ///
    /// # 返回
    /// 返回服务器签发的不透明会话 ID
    pub async fn upload(
        &self,
        executor: &HttpExecutor,
        selection: &FileSelection,
    ) -> Result<String> {
        if selection.is_empty() {
            return Err(StateError::NoFilesSelected.into());
        }

        info!(
            "📤 正在上传 {} 个文件 ({} 字节)...",
            selection.len(),
            selection.total_size()
        );

        let mut form = Form::new();
        for file in selection.files() {
            let bytes = fs::read(&file.path)
                .await
                .with_context(|| format!("无法读取文件: {}", file.path.display()))?;
            debug!("附加文件: {} ({} 字节)", file.name, bytes.len());
            form = form.part("files", Part::bytes(bytes).file_name(file.name.clone()));
        }

        let response: UploadResponse = executor.post_form("upload", form).await?;

        info!("✓ 上传完成，会话 ID: {}", response.session_id);
        Ok(response.session_id)
    }
}

impl Default for UploadService {
    fn default() -> Self {
        Self::new()
    }
}
