use std::path::PathBuf;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 输入文件错误（只影响当前文件）
    #[error("输入文件错误: {0}")]
    Load(#[from] LoadError),
    /// 结果写入错误（只影响当前文件）
    #[error("结果写入错误: {0}")]
    Write(#[from] WriteError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// HTTP 客户端初始化失败
    #[error("HTTP 客户端初始化失败: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// 输入文件错误
///
/// 任何一种都会让当前文件被跳过，继续处理下一个文件。
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("文件不存在: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("读取文件失败 ({}): {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV 解析失败 ({}): {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// 跳过元数据行之后没有表头
    #[error("没有可用的表头 ({}): 跳过 {skipped} 行元数据后文件为空", .path.display())]
    NoHeader { path: PathBuf, skipped: usize },

    /// 第 `line` 行的字段数多于表头
    #[error("第 {line} 行有 {found} 个字段，表头只有 {expected} 列 ({})", .path.display())]
    RaggedRow {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("缺少坐标列 'lat'/'lon' ({})，投影坐标转换不在本程序范围内", .path.display())]
    MissingCoordinates { path: PathBuf },

    #[error("缺少必需列 ({}): {}", .path.display(), .columns.join(", "))]
    MissingColumns { path: PathBuf, columns: Vec<String> },

    #[error("清洗后没有剩余数据 ({})", .path.display())]
    EmptyAfterCleaning { path: PathBuf },
}

/// 结果文件写入错误
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("无法创建输出目录 ({}): {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV 序列化失败 ({}): {source}", .path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("写入文件失败 ({}): {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("无法从输入文件名推导输出文件名: {}", .path.display())]
    NoFileStem { path: PathBuf },
}

/// 单次 PVGIS 查询失败的原因
///
/// 只用于日志区分，调用方拿到的永远是 `Option<f64>`。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchFailure {
    #[error("请求超时")]
    Timeout,

    #[error("HTTP 错误状态码 {0}")]
    HttpStatus(u16),

    #[error("响应不是合法 JSON: {0}")]
    InvalidJson(String),

    #[error("响应中缺少 outputs.totals.fixed.E_y")]
    MissingField,

    #[error("E_y 不是数值: {0}")]
    NonNumericField(String),

    #[error("网络请求失败: {0}")]
    Transport(String),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("配置文件不存在: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("读取配置文件失败 ({}): {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML 解析失败 ({}): {source}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },

    #[error("接口地址无效 '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// 能解析但取值不可用，例如负数或过大的等待秒数
    #[error("配置项 {field} 的值 '{value}' 无效: {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// 应用程序结果类型
pub type Result<T> = std::result::Result<T, AppError>;
