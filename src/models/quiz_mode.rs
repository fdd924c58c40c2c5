use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 答题模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizMode {
    /// 单选：所有选项共用一个输入组，互斥
    #[default]
    Single,
    /// 多选：每个选项独立成组
    Multiple,
}

/// 无法识别的答题模式
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Not Implemented: {value}")]
pub struct ParseQuizModeError {
    pub value: String,
}

impl QuizMode {
    /// 持久化使用的名称
    pub fn as_str(self) -> &'static str {
        match self {
            QuizMode::Single => "single",
            QuizMode::Multiple => "multiple",
        }
    }

    /// 是否互斥选择
    pub fn is_exclusive(self) -> bool {
        matches!(self, QuizMode::Single)
    }
}

impl FromStr for QuizMode {
    type Err = ParseQuizModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(QuizMode::Single),
            "multiple" => Ok(QuizMode::Multiple),
            other => Err(ParseQuizModeError {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for QuizMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
