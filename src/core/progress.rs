//! 进度事件与进度回调

use serde::{Deserialize, Serialize};
use std::fmt;

/// 进度快照
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    /// 已完成文件数
    pub processed: usize,
    /// 命中文件总数
    pub total: usize,
    /// 当前操作描述
    pub operation: String,
}

impl ProgressEvent {
    pub fn new(processed: usize, total: usize, operation: impl Into<String>) -> Self {
        Self {
            processed,
            total,
            operation: operation.into(),
        }
    }

    /// 完成百分比（总数为 0 时返回 0）
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.processed as f64 / self.total as f64 * 100.0
        }
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} ({:.1}%) - {}",
            self.processed,
            self.total,
            self.percent(),
            self.operation
        )
    }
}

/// 进度观察者
///
/// 在完成该文件的任务上同步调用；任意 `Fn(&ProgressEvent)` 闭包都可以直接当回调用。
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: &ProgressEvent);
}

impl<F> ProgressReporter for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn report(&self, event: &ProgressEvent) {
        self(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_format() {
        let event = ProgressEvent::new(3, 10, "Created: a.txt");
        assert_eq!(event.to_string(), "3/10 (30.0%) - Created: a.txt");
    }

    #[test]
    fn test_percent_zero_when_total_zero() {
        let event = ProgressEvent::new(0, 0, "Starting");
        assert_eq!(event.percent(), 0.0);
        assert_eq!(event.to_string(), "0/0 (0.0%) - Starting");
    }

    #[test]
    fn test_closure_is_a_reporter() {
        let reporter = |event: &ProgressEvent| {
            assert_eq!(event.total, 1);
        };
        reporter.report(&ProgressEvent::new(0, 1, "Starting"));
    }
}
