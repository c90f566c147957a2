//! 源目录树扫描

use crate::core::pattern::PatternSet;
use crate::error::SyncError;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::info;
use walkdir::WalkDir;

/// 命中模式的源文件
#[derive(Debug, Clone)]
pub struct MatchedFile {
    /// 源文件绝对路径
    pub absolute: PathBuf,
    /// 相对源根目录的路径（统一使用 / 分隔符），原样用作目标侧相对路径
    pub relative: String,
}

/// 文件扫描器
pub struct FileScanner {
    root: PathBuf,
    patterns: PatternSet,
}

impl FileScanner {
    pub fn new(root: PathBuf, patterns: PatternSet) -> Self {
        Self { root, patterns }
    }

    /// 规范化路径分隔符（统一使用 /）
    fn normalize_path(path: &str) -> String {
        path.replace('\\', "/")
    }

    /// 递归扫描，返回命中模式的文件列表
    ///
    /// 目录遍历是同步 IO，放到 blocking 线程池执行；每个条目之间检查一次取消信号，
    /// 取消时整体返回 Cancelled 而不是半截列表。只对文件的基础名做匹配，目录不参与
    /// 匹配也不出现在结果里。返回顺序由文件系统枚举顺序决定，调用方不应依赖。
    pub async fn scan(&self, cancel: &CancellationToken) -> Result<Vec<MatchedFile>, SyncError> {
        if cancel.is_cancelled() {
            return Err(SyncError::Cancelled);
        }

        info!("开始扫描源目录: {}", self.root.display());

        let root = self.root.clone();
        let patterns = self.patterns.clone();
        let cancel = cancel.clone();

        let matched = tokio::task::spawn_blocking(move || {
            let mut matched = Vec::new();

            for entry in WalkDir::new(&root).follow_links(false) {
                if cancel.is_cancelled() {
                    return Err(SyncError::Cancelled);
                }

                let entry = entry?;
                if entry.file_type().is_dir() {
                    continue;
                }

                // 只用基础名（不含目录部分）做匹配
                let file_name = match entry.file_name().to_str() {
                    Some(name) => name,
                    None => continue,
                };
                if !patterns.matches(file_name) {
                    continue;
                }

                let relative = match entry.path().strip_prefix(&root) {
                    Ok(relative) => relative,
                    Err(_) => continue,
                };
                let relative = match relative.to_str() {
                    Some(relative) => relative,
                    None => continue,
                };

                matched.push(MatchedFile {
                    absolute: entry.path().to_path_buf(),
                    relative: Self::normalize_path(relative),
                });
            }

            Ok(matched)
        })
        .await??;

        info!("扫描完成: 命中 {} 个文件", matched.len());

        Ok(matched)
    }
}
