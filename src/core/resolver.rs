//! 单文件动作决策

use anyhow::Result;
use std::path::Path;
use tokio::fs;

/// 单个文件的同步动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    /// 目标不存在，需要新建
    Create,
    /// 源比目标新，需要覆盖
    Update,
    /// 目标不旧于源，跳过
    Skip,
}

/// 决定单个文件的同步动作
///
/// 纯只读探测（存在性 + 修改时间），不做任何写操作。
/// 修改时间严格大于才覆盖；相等时跳过，保证重复同步幂等。
pub async fn resolve(source: &Path, dest: &Path) -> Result<FileAction> {
    let dest_meta = match fs::metadata(dest).await {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(FileAction::Create),
        Err(e) => return Err(e.into()),
    };

    let source_modified = fs::metadata(source).await?.modified()?;
    let dest_modified = dest_meta.modified()?;

    if source_modified > dest_modified {
        Ok(FileAction::Update)
    } else {
        Ok(FileAction::Skip)
    }
}
