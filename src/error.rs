use std::fmt;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// API 调用错误
    Api(ApiError),
    /// 文件操作错误
    File(FileError),
    /// 会话/状态错误
    State(StateError),
    /// 结果解码错误
    Decode(DecodeError),
    /// 配置错误
    Config(ConfigError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Api(e) => write!(f, "API错误: {}", e),
            AppError::File(e) => write!(f, "文件错误: {}", e),
            AppError::State(e) => write!(f, "状态错误: {}", e),
            AppError::Decode(e) => write!(f, "解码错误: {}", e),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Api(e) => Some(e),
            AppError::File(e) => Some(e),
            AppError::State(e) => Some(e),
            AppError::Decode(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// API 调用错误
#[derive(Debug)]
pub enum ApiError {
    /// 网络请求失败（连接、超时、读取响应体）
    RequestFailed {
        endpoint: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 服务器返回了非 2xx 状态
    ///
    /// `message` 是服务器 JSON 响应里的 `error`（或 `message`）字段原文
    ServerRejected {
        endpoint: String,
        status: u16,
        message: String,
    },
    /// 响应 JSON 解析失败
    JsonParseFailed {
        endpoint: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::RequestFailed { endpoint, source } => {
                write!(f, "请求 {} 失败: {}", endpoint, source)
            }
            ApiError::ServerRejected {
                endpoint,
                status,
                message,
            } => {
                write!(f, "服务器拒绝 {} (HTTP {}): {}", endpoint, status, message)
            }
            ApiError::JsonParseFailed { endpoint, source } => {
                write!(f, "解析 {} 的响应失败: {}", endpoint, source)
            }
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::RequestFailed { source, .. } | ApiError::JsonParseFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            ApiError::ServerRejected { .. } => None,
        }
    }
}

impl ApiError {
    /// 服务器返回的错误原文（没有则为状态行描述）
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::ServerRejected { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// 文件操作错误
#[derive(Debug)]
pub enum FileError {
    /// 读取文件失败
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入文件失败
    WriteFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 路径不存在
    NotFound { path: String },
    /// TOML 解析失败
    TomlParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::ReadFailed { path, source } => {
                write!(f, "读取文件失败 {}: {}", path, source)
            }
            FileError::WriteFailed { path, source } => {
                write!(f, "写入文件失败 {}: {}", path, source)
            }
            FileError::NotFound { path } => write!(f, "路径不存在: {}", path),
            FileError::TomlParseFailed { path, source } => {
                write!(f, "解析TOML失败 {}: {}", path, source)
            }
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileError::ReadFailed { source, .. }
            | FileError::WriteFailed { source, .. }
            | FileError::TomlParseFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            FileError::NotFound { .. } => None,
        }
    }
}

/// 会话/状态错误
///
/// 前置条件错误：在发出任何网络请求之前就能在客户端检出
#[derive(Debug)]
pub enum StateError {
    /// 会话不存在（还没有成功上传过文件）
    MissingSession,
    /// 没有选中任何文件
    NoFilesSelected,
    /// 当前指标没有对应的清洗端点
    UnsupportedMetric { metric: String },
    /// 子指标不属于当前指标
    UnknownSubMetric { metric: String, sub_metric: String },
    /// 结果索引超出范围
    IndexOutOfRange { index: usize, len: usize },
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::MissingSession => write!(f, "请先上传文件，再运行处理"),
            StateError::NoFilesSelected => write!(f, "没有选中任何文件"),
            StateError::UnsupportedMetric { metric } => {
                write!(f, "指标 {} 没有对应的清洗端点", metric)
            }
            StateError::UnknownSubMetric { metric, sub_metric } => {
                write!(f, "子指标 {} 不属于指标 {}", sub_metric, metric)
            }
            StateError::IndexOutOfRange { index, len } => {
                write!(f, "结果索引 {} 超出范围 [0, {})", index, len)
            }
        }
    }
}

impl std::error::Error for StateError {}

/// 结果解码错误
#[derive(Debug)]
pub enum DecodeError {
    /// 结果里没有 base64 文档数据
    MissingPayload { filename: String },
    /// base64 解码失败
    Base64DecodeFailed {
        filename: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::MissingPayload { filename } => {
                write!(f, "结果 {} 不包含文档数据", filename)
            }
            DecodeError::Base64DecodeFailed { filename, source } => {
                write!(f, "文档 {} 的base64数据解码失败: {}", filename, source)
            }
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Base64DecodeFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            DecodeError::MissingPayload { .. } => None,
        }
    }
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 环境变量解析失败
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 未知的指标名
    UnknownMetric { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EnvVarParseFailed {
                var_name,
                value,
                expected_type,
            } => {
                write!(
                    f,
                    "环境变量 {} 解析失败: 值 '{}' 无法转换为 {}",
                    var_name, value, expected_type
                )
            }
            ConfigError::UnknownMetric { value } => {
                write!(f, "未知的指标名: {}", value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ========== 从常见错误类型转换 ==========
// 注意：不需要手动实现 From<AppError> for anyhow::Error，
// 因为 anyhow 已经为所有实现了 std::error::Error 的类型提供了自动实现

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        AppError::Api(err)
    }
}

impl From<StateError> for AppError {
    fn from(err: StateError) -> Self {
        AppError::State(err)
    }
}

impl From<DecodeError> for AppError {
    fn from(err: DecodeError) -> Self {
        AppError::Decode(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Api(ApiError::JsonParseFailed {
            endpoint: String::new(),
            source: Box::new(err),
        })
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::File(FileError::TomlParseFailed {
            path: String::new(), // TOML错误通常不包含路径信息
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建API请求失败错误
    pub fn api_request_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
