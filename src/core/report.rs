//! 结果统计
//!
//! 每个文件产出一个结局，由统计器在单把锁下汇总，并顺带发出对应的进度事件。

use crate::core::progress::{ProgressEvent, ProgressReporter};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};

/// 单文件同步结局
#[derive(Debug)]
pub enum OutcomeKind {
    Created,
    Updated,
    Skipped,
    /// 重试耗尽后的终态错误
    Failed(anyhow::Error),
}

/// 单文件结果
///
/// 由重试执行器产出一次，随即被统计器消费，不在别处保留。
#[derive(Debug)]
pub struct FileOutcome {
    /// 相对路径
    pub relative: String,
    /// 消耗的尝试次数（≥1）
    pub attempts: u32,
    pub kind: OutcomeKind,
}

/// 一次同步运行的最终汇总
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub dry_run: bool,
    /// 命中模式的文件总数
    pub total: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
    /// 所有文件的重试次数之和（每个文件计 attempts-1）
    pub retries: u32,
    /// 每个失败文件一条，格式 "相对路径: 错误信息"，无序
    pub errors: Vec<String>,
}

impl SyncResult {
    /// 是否全部成功（没有任何失败文件）
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

impl fmt::Display for SyncResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dry_run {
            write!(f, "[DRY RUN] ")?;
        }
        write!(
            f,
            "Sync completed: {} total, {} created, {} updated, {} skipped, {} failed",
            self.total, self.created, self.updated, self.skipped, self.failed
        )?;
        if self.retries > 0 {
            write!(f, ", {} retries", self.retries)?;
        }
        Ok(())
    }
}

/// 可变统计状态，整体由一把锁保护
#[derive(Debug, Default)]
struct Tally {
    processed: usize,
    created: usize,
    updated: usize,
    skipped: usize,
    failed: usize,
    retries: u32,
    errors: Vec<String>,
}

/// 线程安全的结果统计器
///
/// 生命周期只覆盖一次同步运行。record 在完成该文件的任务上调用，
/// 回调也在同一任务上同步执行。
pub struct Aggregator {
    dry_run: bool,
    total: usize,
    tally: Mutex<Tally>,
    reporter: Option<Arc<dyn ProgressReporter>>,
}

impl Aggregator {
    pub fn new(dry_run: bool, total: usize, reporter: Option<Arc<dyn ProgressReporter>>) -> Self {
        Self {
            dry_run,
            total,
            tally: Mutex::new(Tally::default()),
            reporter,
        }
    }

    fn prefix(&self) -> &'static str {
        if self.dry_run {
            "[DRY RUN] "
        } else {
            ""
        }
    }

    fn action_label(&self, kind: &OutcomeKind) -> &'static str {
        match (kind, self.dry_run) {
            (OutcomeKind::Created, false) => "Created",
            (OutcomeKind::Created, true) => "Would Create",
            (OutcomeKind::Updated, false) => "Updated",
            (OutcomeKind::Updated, true) => "Would Update",
            (OutcomeKind::Skipped, false) => "Skipped",
            (OutcomeKind::Skipped, true) => "Would Skip",
            (OutcomeKind::Failed(_), _) => "Failed",
        }
    }

    fn emit(&self, processed: usize, operation: String) {
        if let Some(reporter) = &self.reporter {
            reporter.report(&ProgressEvent::new(processed, self.total, operation));
        }
    }

    /// 发出起始进度（processed = 0）
    pub fn report_start(&self) {
        self.emit(0, format!("{}Starting", self.prefix()));
    }

    /// 发出结束进度（processed = total），必须在所有文件都记账之后调用
    pub fn report_finished(&self) {
        self.emit(self.total, format!("{}Completed", self.prefix()));
    }

    /// 记录一个文件结局并发出对应进度事件
    pub fn record(&self, outcome: FileOutcome) {
        let label = format!(
            "{}{}: {}",
            self.prefix(),
            self.action_label(&outcome.kind),
            outcome.relative
        );

        let processed = {
            let mut tally = self.tally.lock().unwrap();

            match &outcome.kind {
                OutcomeKind::Created => tally.created += 1,
                OutcomeKind::Updated => tally.updated += 1,
                OutcomeKind::Skipped => tally.skipped += 1,
                OutcomeKind::Failed(error) => {
                    tally.failed += 1;
                    tally.errors.push(format!("{}: {}", outcome.relative, error));
                }
            }

            if outcome.attempts > 1 {
                tally.retries += outcome.attempts - 1;
            }

            tally.processed += 1;
            tally.processed
        };

        self.emit(processed, label);
    }

    /// 生成最终结果快照
    pub fn result(&self) -> SyncResult {
        let tally = self.tally.lock().unwrap();
        SyncResult {
            dry_run: self.dry_run,
            total: self.total,
            created: tally.created,
            updated: tally.updated,
            skipped: tally.skipped,
            failed: tally.failed,
            retries: tally.retries,
            errors: tally.errors.clone(),
        }
    }
}
