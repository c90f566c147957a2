//! 文件名模式匹配
//!
//! 把分号分隔的正则表达式串编译成模式集合，对文件名做「任一命中」判断。

use crate::error::SyncError;
use regex::{Regex, RegexBuilder};

/// 已编译的模式集合
///
/// 所有模式均不区分大小写；匹配是子串语义，不会隐式锚定到整个文件名。
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<Regex>,
}

impl PatternSet {
    /// 编译分号分隔的模式串
    ///
    /// 片段先做 trim，空片段直接丢弃；没有任何有效片段或任一片段编译失败都视为非法输入。
    pub fn compile(raw: &str) -> Result<Self, SyncError> {
        let mut patterns = Vec::new();

        for segment in raw.split(';') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }

            let regex = RegexBuilder::new(segment)
                .case_insensitive(true)
                .build()
                .map_err(|source| SyncError::InvalidPattern {
                    pattern: segment.to_string(),
                    source,
                })?;

            patterns.push(regex);
        }

        if patterns.is_empty() {
            return Err(SyncError::EmptyPatterns(raw.to_string()));
        }

        Ok(Self { patterns })
    }

    /// 文件名是否命中任一模式
    pub fn matches(&self, file_name: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(file_name))
    }

    /// 模式数量
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
