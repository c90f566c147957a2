//! 同步请求配置

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

/// 一次同步运行的全部输入
///
/// 并发上限不在这里：它属于同步器实例，构造时固定。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    /// 源根目录
    pub origin: String,
    /// 目标根目录
    pub destination: String,
    /// 分号分隔的文件名正则模式
    pub patterns: String,
    /// 单文件最大重试次数（0 表示只尝试一次）
    #[serde(default)]
    pub max_retries: u32,
    /// 只计算并报告动作，不写目标树
    #[serde(default)]
    pub dry_run: bool,
}

impl SyncRequest {
    pub fn new(
        origin: impl Into<String>,
        destination: impl Into<String>,
        patterns: impl Into<String>,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            patterns: patterns.into(),
            max_retries: 0,
            dry_run: false,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// 从配置文件读取 sync 配置段
    pub fn load(config_dir: &Path) -> Option<Self> {
        let config_file = config_dir.join("config.json");
        let content = fs::read_to_string(config_file).ok()?;
        let config: serde_json::Value = serde_json::from_str(&content).ok()?;
        serde_json::from_value(config.get("sync")?.clone()).ok()
    }

    /// 保存 sync 配置段（其余配置段原样保留）
    pub fn save(&self, config_dir: &Path) -> io::Result<()> {
        let config_file = config_dir.join("config.json");

        // 读取现有配置
        let mut config: serde_json::Value = if config_file.exists() {
            let content = fs::read_to_string(&config_file)?;
            serde_json::from_str(&content).unwrap_or_else(|_| serde_json::json!({}))
        } else {
            serde_json::json!({})
        };

        // 更新 sync 配置段
        config["sync"] = serde_json::to_value(self).unwrap();

        // 写入文件
        let content = serde_json::to_string_pretty(&config).unwrap();
        fs::write(&config_file, content)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_serde_uses_camel_case() {
        let request = SyncRequest::new("/src", "/dst", r"\.txt$").with_max_retries(3);
        let json = serde_json::to_string(&request).unwrap();

        assert!(json.contains("\"maxRetries\":3"));
        assert!(json.contains("\"dryRun\":false"));

        let parsed: SyncRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.max_retries, 3);
        assert_eq!(parsed.origin, "/src");
    }

    #[test]
    fn test_optional_fields_default() {
        let parsed: SyncRequest = serde_json::from_str(
            r#"{"origin":"/a","destination":"/b","patterns":".*"}"#,
        )
        .unwrap();

        assert_eq!(parsed.max_retries, 0);
        assert!(!parsed.dry_run);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let request = SyncRequest::new("/src", "/dst", r"\.txt$;\.md$")
            .with_max_retries(2)
            .with_dry_run(true);

        request.save(dir.path()).unwrap();
        let loaded = SyncRequest::load(dir.path()).unwrap();

        assert_eq!(loaded.origin, "/src");
        assert_eq!(loaded.patterns, r"\.txt$;\.md$");
        assert_eq!(loaded.max_retries, 2);
        assert!(loaded.dry_run);
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(SyncRequest::load(dir.path()).is_none());
    }
}
