use std::time::Duration;

use crate::error::{AppError, AppResult, ConfigError};

/// 运行的工具类型
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolKind {
    /// 出题工具（setup）
    Author,
    /// 答题工具（display）
    Display,
}

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 文本编辑防抖的静默时长（毫秒）
    pub debounce_ms: u64,
    /// JSON 文档存放目录
    pub data_dir: String,
    /// 当前学习者 ID（用户选择文档的作用域）
    pub user_id: String,
    /// 驱动的工具
    pub tool: ToolKind,
    /// 首次运行时的 TOML 种子文件
    pub seed_file: Option<String>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            data_dir: "quiz_data".to_string(),
            user_id: "local-user".to_string(),
            tool: ToolKind::Author,
            seed_file: None,
            verbose_logging: false,
            output_log_file: "quiz_session.log".to_string(),
        }
    }
}

impl Config {
    /// 从环境变量加载，缺省时使用默认值
    pub fn from_env() -> AppResult<Self> {
        let default = Self::default();
        Ok(Self {
            debounce_ms: parse_env("QUIZ_DEBOUNCE_MS", "u64")?.unwrap_or(default.debounce_ms),
            data_dir: std::env::var("QUIZ_DATA_DIR").unwrap_or(default.data_dir),
            user_id: std::env::var("QUIZ_USER_ID").unwrap_or(default.user_id),
            tool: match std::env::var("QUIZ_TOOL") {
                Ok(value) => parse_tool(&value)?,
                Err(_) => default.tool,
            },
            seed_file: std::env::var("QUIZ_SEED_FILE").ok().or(default.seed_file),
            verbose_logging: parse_env("VERBOSE_LOGGING", "bool")?
                .unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
        })
    }

    /// 防抖时长
    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn parse_env<T: std::str::FromStr>(var_name: &str, expected_type: &str) -> AppResult<Option<T>> {
    match std::env::var(var_name) {
        Ok(value) => value.trim().parse().map(Some).map_err(|_| {
            AppError::Config(ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            })
        }),
        Err(_) => Ok(None),
    }
}

fn parse_tool(value: &str) -> AppResult<ToolKind> {
    match value.trim() {
        "author" | "setup" => Ok(ToolKind::Author),
        "display" => Ok(ToolKind::Display),
        other => Err(AppError::Config(ConfigError::EnvVarParseFailed {
            var_name: "QUIZ_TOOL".to_string(),
            value: other.to_string(),
            expected_type: "author | display".to_string(),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_debounce_is_500ms() {
        let config = Config::default();
        assert_eq!(config.debounce_delay(), Duration::from_millis(500));
        assert_eq!(config.tool, ToolKind::Author);
    }

    #[test]
    fn test_parse_tool() {
        assert_eq!(parse_tool("setup").unwrap(), ToolKind::Author);
        assert_eq!(parse_tool(" display ").unwrap(), ToolKind::Display);
        assert!(parse_tool("grader").is_err());
    }
}
