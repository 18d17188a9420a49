//! 程序配置
//!
//! 所有常量都集中在 `Config` 中，由 `main` 构造后显式传给 `App`。
//! 加载顺序：默认值 ← TOML 配置文件（可选）← 环境变量。

use crate::error::ConfigError;
use reqwest::Url;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "pvgis.toml";

/// PVGIS PVcalc 接口
pub const DEFAULT_API_URL: &str = "https://re.jrc.ec.europa.eu/api/v5_2/PVcalc";

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 输入 CSV 所在目录
    pub input_dir: PathBuf,
    /// 结果 CSV 输出目录
    pub output_dir: PathBuf,
    /// 输入文件扩展名（不含点）
    pub input_extension: String,
    /// 输出文件名后缀，追加在原文件名之后
    pub output_suffix: String,
    /// 表头之前需要跳过的元数据行数
    pub header_skip_lines: usize,
    /// PVGIS 接口地址
    pub api_url: String,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    /// 每次请求之后的固定等待（秒）
    pub request_delay_secs: f64,
    // --- PVGIS 固定参数 ---
    /// 装机功率 (kWp)
    pub peak_power: f64,
    /// 系统损耗 (%)
    pub loss: f64,
    pub vertical_axis: u8,
    /// 倾角（度）
    pub angle: f64,
    /// 基准方位角（度）
    pub azimuth: f64,
    pub output_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("data/01_raw"),
            output_dir: PathBuf::from("data/02_interim"),
            input_extension: "csv".to_string(),
            output_suffix: "_results".to_string(),
            header_skip_lines: 8,
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: 45,
            request_delay_secs: 0.5,
            peak_power: 1.0,
            loss: 14.0,
            vertical_axis: 1,
            angle: 90.0,
            azimuth: 0.0,
            output_format: "json".to_string(),
        }
    }
}

impl Config {
    /// 完整加载：默认值 ← 配置文件 ← 环境变量
    ///
    /// 配置文件路径取自 `PVGIS_CONFIG`，未设置时尝试当前目录下的 `pvgis.toml`，
    /// 文件不存在则直接使用默认值。
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = std::env::var("PVGIS_CONFIG").ok().map(PathBuf::from);
        let path = explicit
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let base = if path.exists() {
            Self::from_toml_file(&path)?
        } else if let Some(path) = explicit {
            return Err(ConfigError::FileNotFound { path });
        } else {
            Self::default()
        };

        let config = base.with_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文件读取，缺省字段使用默认值
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::Toml { source, .. } => ConfigError::Toml {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Toml {
            path: PathBuf::new(),
            source: e,
        })
    }

    /// 用给定的查找函数覆盖字段，便于测试时不依赖进程环境
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("PVGIS_INPUT_DIR") {
            self.input_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("PVGIS_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("PVGIS_API_URL") {
            self.api_url = v;
        }
        if let Some(v) = lookup("PVGIS_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_env("PVGIS_TIMEOUT_SECS", &v, "u64")?;
        }
        if let Some(v) = lookup("PVGIS_DELAY_SECS") {
            self.request_delay_secs = parse_env("PVGIS_DELAY_SECS", &v, "f64")?;
        }
        Ok(self)
    }

    /// 校验取值范围，配置文件和环境变量都合并完之后调用
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Err(e) = Duration::try_from_secs_f64(self.request_delay_secs) {
            return Err(ConfigError::InvalidValue {
                field: "request_delay_secs".to_string(),
                value: self.request_delay_secs.to_string(),
                reason: e.to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs".to_string(),
                value: "0".to_string(),
                reason: "超时必须大于 0".to_string(),
            });
        }
        self.api_base_url()?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// 未通过 `validate` 的取值按 0 处理
    pub fn request_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.request_delay_secs).unwrap_or(Duration::ZERO)
    }

    pub fn api_base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.api_url).map_err(|e| ConfigError::InvalidUrl {
            url: self.api_url.clone(),
            reason: e.to_string(),
        })
    }
}

fn parse_env<T: std::str::FromStr>(
    var_name: &str,
    value: &str,
    expected_type: &str,
) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::EnvVarParseFailed {
            var_name: var_name.to_string(),
            value: value.to_string(),
            expected_type: expected_type.to_string(),
        })
}
