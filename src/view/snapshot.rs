use serde::Serialize;

use super::controls::AnswerControl;
use crate::models::{Answer, QuizMode};

/// 出题工具暴露给视图的状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorView {
    pub mode: QuizMode,
    pub answers: Vec<Answer>,
    /// 每个答案的控件，`checked` 即是否为正确答案
    pub controls: Vec<AnswerControl>,
    pub correct_message: String,
    pub incorrect_message: String,
    pub saving: bool,
}

/// 答题工具暴露给视图的状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayView {
    pub mode: QuizMode,
    /// 学习者的选择，`checked` 即是否选中
    pub controls: Vec<AnswerControl>,
    pub show_correct: bool,
    pub show_incorrect: bool,
    pub correct_message: String,
    pub incorrect_message: String,
    /// 提交按钮是否可用
    pub submit_enabled: bool,
    pub saving: bool,
}
