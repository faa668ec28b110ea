use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::models::RuleSet;

/// 程序配置文件
///
/// 优先级：client.toml < 环境变量
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 后端服务器地址
    pub server_base_url: String,
    /// 输入路径：单个文件或文件夹（文件夹自动进入批量模式）
    pub input_path: String,
    /// 产出文件的本地输出目录
    pub output_dir: String,
    /// 指标名（sales / pex / oe / working-capital / inference / processing-pipeline）
    pub metric: String,
    /// 子指标名（不填则用该指标的第一个子选项）
    pub sub_metric: Option<String>,
    /// 供应商分析类型（mom / qtd，仅 pex-vendor 使用）
    pub vendor_analysis_type: String,
    /// 批量模式开关
    pub bulk_mode: bool,
    /// 清洗完成后是否额外下载整包 zip
    pub zip_download: bool,
    /// 是否拉取数据预览
    pub preview_data: bool,
    /// 自定义指令文件（不填则用默认指令，仅 inference 使用）
    pub prompt_file: Option<String>,
    /// 请求超时（秒）
    pub request_timeout_secs: u64,
    /// 合成进度的步长（百分比）
    pub progress_step: u8,
    /// 合成进度的间隔（毫秒）
    pub progress_interval_ms: u64,
    /// 合成进度的封顶值
    pub progress_cap: u8,
    /// 运行日志文件
    pub run_log_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 清洗规则开关
    pub rules: RuleSet,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_base_url: "http://localhost:8080".to_string(),
            input_path: "input".to_string(),
            output_dir: "output".to_string(),
            metric: "sales".to_string(),
            sub_metric: None,
            vendor_analysis_type: "mom".to_string(),
            bulk_mode: false,
            zip_download: false,
            preview_data: false,
            prompt_file: None,
            request_timeout_secs: 600,
            progress_step: 7,
            progress_interval_ms: 400,
            progress_cap: 90,
            run_log_file: "run_log.txt".to_string(),
            verbose_logging: false,
            rules: RuleSet::default(),
        }
    }
}

impl Config {
    /// 载入配置：有 client.toml 就用它打底，再叠加环境变量
    pub fn load() -> Result<Self> {
        let base = if Path::new("client.toml").exists() {
            let content =
                std::fs::read_to_string("client.toml").context("无法读取 client.toml")?;
            toml::from_str(&content).context("无法解析 client.toml")?
        } else {
            Self::default()
        };
        Ok(base.with_env_overrides())
    }

    /// 只用默认值 + 环境变量
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    fn with_env_overrides(self) -> Self {
        let mut rules = self.rules.clone();
        rules.remove_duplicates = env_bool("RULE_REMOVE_DUPLICATES").unwrap_or(rules.remove_duplicates);
        rules.group_units = env_bool("RULE_GROUP_UNITS").unwrap_or(rules.group_units);
        rules.validate_formats = env_bool("RULE_VALIDATE_FORMATS").unwrap_or(rules.validate_formats);
        rules.standardize_names = env_bool("RULE_STANDARDIZE_NAMES").unwrap_or(rules.standardize_names);
        rules.remove_outliers = env_bool("RULE_REMOVE_OUTLIERS").unwrap_or(rules.remove_outliers);
        rules.normalize_data = env_bool("RULE_NORMALIZE_DATA").unwrap_or(rules.normalize_data);

        Self {
            server_base_url: std::env::var("SERVER_BASE_URL").unwrap_or(self.server_base_url),
            input_path: std::env::var("INPUT_PATH").unwrap_or(self.input_path),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(self.output_dir),
            metric: std::env::var("METRIC").unwrap_or(self.metric),
            sub_metric: std::env::var("SUB_METRIC").ok().or(self.sub_metric),
            vendor_analysis_type: std::env::var("VENDOR_ANALYSIS_TYPE").unwrap_or(self.vendor_analysis_type),
            bulk_mode: env_bool("BULK_MODE").unwrap_or(self.bulk_mode),
            zip_download: env_bool("ZIP_DOWNLOAD").unwrap_or(self.zip_download),
            preview_data: env_bool("PREVIEW_DATA").unwrap_or(self.preview_data),
            prompt_file: std::env::var("PROMPT_FILE").ok().or(self.prompt_file),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.request_timeout_secs),
            progress_step: std::env::var("PROGRESS_STEP").ok().and_then(|v| v.parse().ok()).unwrap_or(self.progress_step),
            progress_interval_ms: std::env::var("PROGRESS_INTERVAL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.progress_interval_ms),
            progress_cap: std::env::var("PROGRESS_CAP").ok().and_then(|v| v.parse().ok()).unwrap_or(self.progress_cap),
            run_log_file: std::env::var("RUN_LOG_FILE").unwrap_or(self.run_log_file),
            verbose_logging: env_bool("VERBOSE_LOGGING").unwrap_or(self.verbose_logging),
            rules,
        }
    }
}

fn env_bool(var_name: &str) -> Option<bool> {
    std::env::var(var_name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_overrides_partial_fields() {
        let config: Config = toml::from_str(
            r#"
            server_base_url = "http://10.0.0.2:8080"
            metric = "working-capital"
            sub_metric = "overhead"

            [rules]
            groupUnits = false
            "#,
        )
        .unwrap();

        assert_eq!(config.server_base_url, "http://10.0.0.2:8080");
        assert_eq!(config.metric, "working-capital");
        assert_eq!(config.sub_metric.as_deref(), Some("overhead"));
        // 没写的字段保持默认
        assert_eq!(config.output_dir, "output");
        assert!(!config.rules.group_units);
        assert!(config.rules.remove_duplicates);
    }

    #[test]
    fn test_empty_toml_is_all_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.metric, "sales");
        assert_eq!(config.progress_cap, 90);
        assert_eq!(config.rules, RuleSet::default());
    }
}
