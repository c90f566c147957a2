//! 同步级错误类型

use std::path::PathBuf;
use thiserror::Error;

/// 让整次运行中止的错误（校验、准备、取消）
///
/// 单个文件的失败不会以该类型出现，而是被吸收进 `SyncResult` 的统计里。
#[derive(Debug, Error)]
pub enum SyncError {
    /// 参数校验失败（空路径、空模式串）
    #[error("invalid argument: {0}")]
    InvalidInput(&'static str),

    /// 模式串拆分后没有任何非空片段
    #[error("no usable pattern in `{0}`")]
    EmptyPatterns(String),

    /// 某个模式片段无法编译
    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// 源目录不存在
    #[error("source directory not found: {0}")]
    SourceNotFound(PathBuf),

    /// 目标根目录无法创建
    #[error("cannot create destination directory {path}: {source}")]
    DestinationUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 遍历源目录树失败
    #[error("directory scan failed: {0}")]
    Scan(#[from] walkdir::Error),

    /// 扫描任务本身异常退出
    #[error("scan worker failed: {0}")]
    ScanWorker(#[from] tokio::task::JoinError),

    /// 运行被取消
    #[error("sync cancelled")]
    Cancelled,
}
