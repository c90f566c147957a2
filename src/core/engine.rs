//! 同步引擎
//!
//! 入口是 [`Synchronizer::synchronize`]：校验输入 → 编译模式 → 扫描源树 →
//! 信号量限流并发执行每个文件 → 汇总结果。单文件失败进统计，不中断整次运行。

use crate::config::SyncRequest;
use crate::core::pattern::PatternSet;
use crate::core::progress::ProgressReporter;
use crate::core::report::{Aggregator, FileOutcome, OutcomeKind, SyncResult};
use crate::core::resolver::{self, FileAction};
use crate::core::scanner::{FileScanner, MatchedFile};
use crate::error::SyncError;
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// 重试基础延迟（毫秒），第 n 次失败后等待 base × 2^(n-1)
const RETRY_BASE_DELAY_MS: u64 = 100;

/// 同步器
///
/// 并发上限在构造时固定；每次 synchronize 的其余输入都来自 [`SyncRequest`]。
pub struct Synchronizer {
    max_concurrency: usize,
}

impl Synchronizer {
    /// 创建同步器，`max_concurrency` 为 0 时取可用 CPU 数
    pub fn new(max_concurrency: usize) -> Self {
        let max_concurrency = if max_concurrency == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        } else {
            max_concurrency
        };
        Self { max_concurrency }
    }

    /// 执行一次同步
    ///
    /// 校验和准备阶段的错误直接返回 Err（调用方拿不到部分结果）；
    /// 单个文件的失败被吸收进返回的 [`SyncResult`]。
    pub async fn synchronize(
        &self,
        request: &SyncRequest,
        progress: Option<Arc<dyn ProgressReporter>>,
        cancel: Option<CancellationToken>,
    ) -> Result<SyncResult, SyncError> {
        let cancel = cancel.unwrap_or_default();

        // 参数校验，先于一切 IO
        if request.origin.trim().is_empty() {
            return Err(SyncError::InvalidInput("origin path is empty"));
        }
        if request.destination.trim().is_empty() {
            return Err(SyncError::InvalidInput("destination path is empty"));
        }
        if request.patterns.trim().is_empty() {
            return Err(SyncError::InvalidInput("pattern string is empty"));
        }

        let patterns = PatternSet::compile(&request.patterns)?;

        let origin = PathBuf::from(&request.origin);
        let destination = PathBuf::from(&request.destination);

        info!(
            "开始同步: {} -> {} (模式 {} 个, 重试上限 {}, dry_run={})",
            origin.display(),
            destination.display(),
            patterns.len(),
            request.max_retries,
            request.dry_run,
        );

        // 先确认源存在，再创建目标根目录，顺序不能反
        match fs::metadata(&origin).await {
            Ok(meta) if meta.is_dir() => {}
            _ => return Err(SyncError::SourceNotFound(origin)),
        }

        // 目标根目录总是创建，dry-run 也一样（用来验证可写性）
        if let Err(source) = fs::create_dir_all(&destination).await {
            return Err(SyncError::DestinationUnavailable {
                path: destination,
                source,
            });
        }

        let scanner = FileScanner::new(origin, patterns);
        let files = scanner.scan(&cancel).await?;

        let aggregator = Arc::new(Aggregator::new(request.dry_run, files.len(), progress));
        aggregator.report_start();

        self.dispatch(files, &destination, request, &cancel, &aggregator)
            .await;

        if cancel.is_cancelled() {
            warn!("同步被取消");
            return Err(SyncError::Cancelled);
        }

        aggregator.report_finished();

        let result = aggregator.result();
        info!("{}", result);
        Ok(result)
    }

    /// 并发调度所有命中文件
    ///
    /// 信号量限制在飞数量；permit 随任务走，任务退出（成功、失败、取消）即归还。
    async fn dispatch(
        &self,
        files: Vec<MatchedFile>,
        destination: &Path,
        request: &SyncRequest,
        cancel: &CancellationToken,
        aggregator: &Arc<Aggregator>,
    ) {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut handles = Vec::with_capacity(files.len());

        for file in files {
            // 取消后不再接纳新文件；等待准入期间同样响应取消
            let permit = tokio::select! {
                _ = cancel.cancelled() => break,
                permit = semaphore.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let destination = destination.to_path_buf();
            let aggregator = aggregator.clone();
            let cancel = cancel.clone();
            let max_retries = request.max_retries;
            let dry_run = request.dry_run;

            let handle = tokio::spawn(async move {
                if let Some(outcome) =
                    execute_with_retry(&file, &destination, max_retries, dry_run, &cancel).await
                {
                    aggregator.record(outcome);
                }
                drop(permit);
            });

            handles.push(handle);
        }

        // 等待所有已派发的任务结束
        for handle in handles {
            let _ = handle.await;
        }
    }
}

impl Default for Synchronizer {
    fn default() -> Self {
        Self::new(0)
    }
}

/// 带重试的单文件执行
///
/// 返回 None 表示该文件因取消而中止，不记为失败。
async fn execute_with_retry(
    file: &MatchedFile,
    destination: &Path,
    max_retries: u32,
    dry_run: bool,
    cancel: &CancellationToken,
) -> Option<FileOutcome> {
    let mut attempt: u32 = 1;

    loop {
        if cancel.is_cancelled() {
            return None;
        }

        match attempt_once(file, destination, dry_run).await {
            Ok(action) => {
                let kind = match action {
                    FileAction::Create => OutcomeKind::Created,
                    FileAction::Update => OutcomeKind::Updated,
                    FileAction::Skip => OutcomeKind::Skipped,
                };
                return Some(FileOutcome {
                    relative: file.relative.clone(),
                    attempts: attempt,
                    kind,
                });
            }
            Err(e) => {
                if attempt > max_retries {
                    error!("文件最终失败 (尝试 {} 次): {} - {}", attempt, file.relative, e);
                    return Some(FileOutcome {
                        relative: file.relative.clone(),
                        attempts: attempt,
                        kind: OutcomeKind::Failed(e),
                    });
                }

                // 指数退避，退避期间响应取消
                let delay = Duration::from_millis(RETRY_BASE_DELAY_MS * 2u64.pow(attempt - 1));
                warn!(
                    "文件操作失败，{}ms 后重试 ({}/{}): {} - {}",
                    delay.as_millis(),
                    attempt,
                    max_retries,
                    file.relative,
                    e
                );

                tokio::select! {
                    _ = cancel.cancelled() => return None,
                    _ = tokio::time::sleep(delay) => {}
                }

                attempt += 1;
            }
        }
    }
}

/// 执行一次完整的决策 + 复制
async fn attempt_once(file: &MatchedFile, destination: &Path, dry_run: bool) -> Result<FileAction> {
    let dest_path = destination.join(&file.relative);

    // dry-run 不创建任何目标子目录
    if !dry_run {
        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent).await?;
        }
    }

    let action = resolver::resolve(&file.absolute, &dest_path).await?;

    if !dry_run && matches!(action, FileAction::Create | FileAction::Update) {
        let bytes = copy_file(&file.absolute, &dest_path).await?;
        debug!(
            "复制: {} -> {} ({} 字节)",
            file.absolute.display(),
            dest_path.display(),
            bytes
        );
    } else {
        debug!("{:?}: {}", action, file.relative);
    }

    Ok(action)
}

/// 流式复制整个文件（固定大小缓冲，覆盖写入）
async fn copy_file(source: &Path, dest: &Path) -> Result<u64> {
    let mut reader = fs::File::open(source).await?;
    let mut writer = fs::File::create(dest).await?;

    let bytes = tokio::io::copy(&mut reader, &mut writer).await?;
    writer.flush().await?;

    Ok(bytes)
}
