//! 下载服务 - 业务能力层
//!
//! 清洗产出的取回：逐个文件下载、整包 zip 下载
//! 统一用"拉取字节再落盘"的方式，每条路径都有明确的成败反馈

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use futures::future::join_all;
use tokio::fs;
use tracing::{info, warn};

use crate::infrastructure::HttpExecutor;
use crate::utils::filename::sanitize_filename;

/// 一次批量下载的结果清单
#[derive(Debug, Default)]
pub struct DownloadReport {
    /// 成功落盘的本地路径
    pub saved: Vec<PathBuf>,
    /// 失败的 (文件名, 错误信息)
    pub failures: Vec<(String, String)>,
}

/// 下载服务
///
/// 职责：
/// - 从 `/download/{sid}/{filename}` 和 `/download/zip/{sid}` 拉取字节
/// - 清理服务器给的文件名后写进输出目录
/// - 批量下载逐个汇报成败，互不影响
pub struct DownloadService {
    output_dir: PathBuf,
}

impl DownloadService {
    /// 创建新的下载服务
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 下载单个产出文件
    pub async fn download_one(
        &self,
        executor: &HttpExecutor,
        session_id: &str,
        filename: &str,
    ) -> Result<PathBuf> {
        let path = format!("download/{}/{}", session_id, filename);
        let bytes = executor.get_bytes(&path).await?;

        let local_path = self.output_dir.join(sanitize_filename(filename));
        self.write_bytes(&local_path, &bytes).await?;

        info!("⬇ 已保存: {} ({} 字节)", local_path.display(), bytes.len());
        Ok(local_path)
    }

    /// 下载整个会话的 zip 包
    pub async fn download_zip(
        &self,
        executor: &HttpExecutor,
        session_id: &str,
    ) -> Result<PathBuf> {
        let path = format!("download/zip/{}", session_id);
        let bytes = executor.get_bytes(&path).await?;

        let local_path = self
            .output_dir
            .join(format!("processed_data_{}.zip", session_id));
        self.write_bytes(&local_path, &bytes).await?;

        info!("⬇ 已保存压缩包: {}", local_path.display());
        Ok(local_path)
    }

    /// 并发下载一批产出文件
    ///
    /// 各文件互不影响：失败的记入清单，成功的照常落盘
    pub async fn download_all(
        &self,
        executor: &HttpExecutor,
        session_id: &str,
        filenames: &[String],
    ) -> DownloadReport {
        let tasks = filenames
            .iter()
            .map(|name| async move {
                let outcome = self.download_one(executor, session_id, name).await;
                (name.clone(), outcome)
            })
            .collect::<Vec<_>>();

        let mut report = DownloadReport::default();
        for (name, outcome) in join_all(tasks).await {
            match outcome {
                Ok(path) => report.saved.push(path),
                Err(e) => {
                    warn!("⚠️ 下载 {} 失败: {}", name, e);
                    report.failures.push((name, e.to_string()));
                }
            }
        }
        report
    }

    async fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| format!("无法创建输出目录: {}", self.output_dir.display()))?;
        fs::write(path, bytes)
            .await
            .with_context(|| format!("无法写入文件: {}", path.display()))?;
        Ok(())
    }
}
