//! 设置文档（答案 + 模式 + 反馈文本）及其默认值

use serde::{Deserialize, Serialize};

use super::answer::Answer;
use super::criteria::CriteriaMap;

/// 宿主从未保存过时使用的默认答案
pub fn default_answers() -> Vec<Answer> {
    vec![Answer::new("1", "Answer 1"), Answer::new("2", "Answer 2")]
}

/// 默认答题模式
pub const DEFAULT_QUIZ_TYPE: &str = "single";

/// 默认判分标准
pub fn default_criteria() -> CriteriaMap {
    [("1", true), ("2", false)].into_iter().collect()
}

/// 设置文档，整体替换
///
/// `type` 保留原始字符串，构建答案控件前再校验，
/// 这样未知模式会在加载时报出明确错误而不是反序列化失败。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answers: Option<Vec<Answer>>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub quiz_type: Option<String>,
    #[serde(default)]
    pub correct_message: String,
    #[serde(default)]
    pub incorrect_message: String,
    #[serde(default)]
    pub is_shuffled: bool,
}

/// 反馈文本的种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    /// 全部答对时显示
    Correct,
    /// 答错时显示
    Incorrect,
}

/// 两段反馈文本
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackText {
    pub correct_message: String,
    pub incorrect_message: String,
}

impl FeedbackText {
    pub fn get(&self, kind: FeedbackKind) -> &str {
        match kind {
            FeedbackKind::Correct => &self.correct_message,
            FeedbackKind::Incorrect => &self.incorrect_message,
        }
    }

    pub fn set(&mut self, kind: FeedbackKind, text: impl Into<String>) {
        match kind {
            FeedbackKind::Correct => self.correct_message = text.into(),
            FeedbackKind::Incorrect => self.incorrect_message = text.into(),
        }
    }
}
