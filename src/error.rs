use std::fmt;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 配置错误
    Config(ConfigError),
    /// 宿主存储错误
    Store(StoreError),
    /// 提交错误
    Submission(SubmissionError),
    /// 其他错误
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(e) => write!(f, "配置错误: {}", e),
            AppError::Store(e) => write!(f, "存储错误: {}", e),
            AppError::Submission(e) => write!(f, "提交错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(e) => Some(e),
            AppError::Store(e) => Some(e),
            AppError::Submission(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 无法识别的答题模式（构建答案控件前必须拒绝）
    UnknownQuizMode { value: String },
    /// 环境变量解析失败
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownQuizMode { value } => {
                write!(f, "未实现的答题模式: '{}' (只支持 single / multiple)", value)
            }
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
        }
    }
}

impl std::error::Error for ConfigError {}

/// 宿主存储错误
#[derive(Debug)]
pub enum StoreError {
    /// 读取文档失败
    RetrieveFailed {
        document: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 替换文档失败
    ReplaceFailed {
        document: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// JSON 解析失败
    JsonParseFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 文档键不合法
    InvalidDocumentKey { key: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::RetrieveFailed { document, source } => {
                write!(f, "读取文档失败 ({}): {}", document, source)
            }
            StoreError::ReplaceFailed { document, source } => {
                write!(f, "替换文档失败 ({}): {}", document, source)
            }
            StoreError::JsonParseFailed { source } => write!(f, "JSON解析失败: {}", source),
            StoreError::InvalidDocumentKey { key } => write!(f, "文档键不合法: '{}'", key),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::RetrieveFailed { source, .. }
            | StoreError::ReplaceFailed { source, .. }
            | StoreError::JsonParseFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            StoreError::InvalidDocumentKey { .. } => None,
        }
    }
}

/// 提交错误
#[derive(Debug)]
pub enum SubmissionError {
    /// 上一次提交尚未保存完成，提交按钮处于禁用状态
    AlreadySubmitting,
    /// 评分调用失败
    GradingFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for SubmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionError::AlreadySubmitting => write!(f, "正在提交中，请等待保存完成"),
            SubmissionError::GradingFailed { source } => write!(f, "评分调用失败: {}", source),
        }
    }
}

impl std::error::Error for SubmissionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SubmissionError::GradingFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            SubmissionError::AlreadySubmitting => None,
        }
    }
}

// ========== 从常见错误类型转换 ==========

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Store(StoreError::JsonParseFailed {
            source: Box::new(err),
        })
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Store(StoreError::JsonParseFailed {
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Store(StoreError::RetrieveFailed {
            document: String::new(),
            source: Box::new(err),
        })
    }
}

impl From<crate::models::ParseQuizModeError> for AppError {
    fn from(err: crate::models::ParseQuizModeError) -> Self {
        AppError::Config(ConfigError::UnknownQuizMode { value: err.value })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文档读取错误
    pub fn retrieve_failed(
        document: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Store(StoreError::RetrieveFailed {
            document: document.into(),
            source: Box::new(source),
        })
    }

    /// 创建文档替换错误
    pub fn replace_failed(
        document: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Store(StoreError::ReplaceFailed {
            document: document.into(),
            source: Box::new(source),
        })
    }

    /// 创建评分失败错误
    pub fn grading_failed(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppError::Submission(SubmissionError::GradingFailed {
            source: Box::new(source),
        })
    }

    /// 是否为重复提交
    pub fn is_already_submitting(&self) -> bool {
        matches!(self, AppError::Submission(SubmissionError::AlreadySubmitting))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
