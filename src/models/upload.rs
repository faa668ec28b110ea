//! 本地文件选择
//!
//! 把"选了哪些文件/哪个文件夹"变成一份带展示信息的清单
//! 状态字段只是界面提示，处理结果以服务器为准

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::fs;

/// 单个文件的界面状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Uploaded,
    Processing,
    Cleaned,
    Error,
}

/// 选中的一个本地文件
#[derive(Debug, Clone)]
pub struct UploadedFileRef {
    pub id: usize,
    pub name: String,
    pub size: u64,
    pub status: FileStatus,
    pub path: PathBuf,
}

/// 一次选择的全部文件
#[derive(Debug, Clone)]
pub struct FileSelection {
    files: Vec<UploadedFileRef>,
    /// 展示用的名称：文件夹名或第一个文件所在目录名，不做一致性校验
    display_name: String,
}

impl FileSelection {
    /// 从一个路径构建选择：目录则扫描其中的文件，否则就是单个文件
    pub async fn from_path(path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path)
            .await
            .with_context(|| format!("无法访问路径: {}", path.display()))?;

        if metadata.is_dir() {
            Self::from_folder(path).await
        } else {
            Self::from_files(&[path.to_path_buf()]).await
        }
    }

    /// 扫描文件夹里的所有普通文件（不递归）
    pub async fn from_folder(folder: &Path) -> Result<Self> {
        let mut paths = Vec::new();
        let mut entries = fs::read_dir(folder)
            .await
            .with_context(|| format!("无法读取文件夹: {}", folder.display()))?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_file() {
                paths.push(path);
            }
        }
        // 固定顺序，方便日志对照
        paths.sort();

        let mut selection = Self::from_files(&paths).await?;
        selection.display_name = folder
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        Ok(selection)
    }

    /// 从明确的文件列表构建选择
    pub async fn from_files(paths: &[PathBuf]) -> Result<Self> {
        let mut files = Vec::with_capacity(paths.len());
        for (id, path) in paths.iter().enumerate() {
            let metadata = fs::metadata(path)
                .await
                .with_context(|| format!("无法读取文件信息: {}", path.display()))?;
            files.push(UploadedFileRef {
                id,
                name: path
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
                    .to_string(),
                size: metadata.len(),
                status: FileStatus::Uploaded,
                path: path.clone(),
            });
        }

        // 展示名取第一个文件所在的目录名
        let display_name = paths
            .first()
            .and_then(|p| p.parent())
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Self {
            files,
            display_name,
        })
    }

    pub fn files(&self) -> &[UploadedFileRef] {
        &self.files
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(|f| f.path.as_path())
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// 总字节数（日志展示用）
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    /// 整批更新界面状态
    pub fn mark_all(&mut self, status: FileStatus) {
        for file in &mut self.files {
            file.status = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_folder_scan_collects_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "b.xlsx", b"bb");
        write_file(dir.path(), "a.xlsx", b"aaa");
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let selection = FileSelection::from_folder(dir.path()).await.unwrap();
        let names: Vec<_> = selection.files().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a.xlsx", "b.xlsx"]);
        // 子目录不计入
        assert_eq!(selection.len(), 2);
        assert_eq!(selection.total_size(), 5);
    }

    #[tokio::test]
    async fn test_display_name_from_first_file_parent() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_file(dir.path(), "only.csv", b"x");

        let selection = FileSelection::from_files(&[file]).await.unwrap();
        assert_eq!(
            selection.display_name(),
            dir.path().file_name().unwrap().to_string_lossy()
        );
        assert_eq!(selection.files()[0].status, FileStatus::Uploaded);
    }
}
