//! 出题会话持有的内存状态
//!
//! 答案集合、答题模式、反馈文本与判分标准放在同一个状态对象里，
//! 由会话独占，保存任务在真正发出请求时才读取快照。

use tracing::debug;

use super::answer::{Answer, AnswerSet};
use super::criteria::CriteriaMap;
use super::quiz_mode::QuizMode;
use super::setup::{
    default_answers, default_criteria, FeedbackKind, FeedbackText, SetupDocument, DEFAULT_QUIZ_TYPE,
};
use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq)]
pub struct QuizState {
    pub answers: AnswerSet,
    pub mode: QuizMode,
    pub feedback: FeedbackText,
    pub criteria: CriteriaMap,
    pub is_shuffled: bool,
    /// 每次本地修改递增，用于判断宿主返回的规范副本是否已过期
    revision: u64,
}

impl QuizState {
    /// 由宿主文档构建状态，缺失的部分使用默认值
    ///
    /// 未知答题模式直接返回配置错误。
    pub fn from_documents(
        setup: Option<SetupDocument>,
        criteria: Option<CriteriaMap>,
    ) -> AppResult<Self> {
        let setup = setup.unwrap_or_default();
        let mode = setup
            .quiz_type
            .as_deref()
            .unwrap_or(DEFAULT_QUIZ_TYPE)
            .parse::<QuizMode>()?;

        Ok(Self {
            answers: AnswerSet::new(setup.answers.unwrap_or_else(default_answers)),
            mode,
            feedback: FeedbackText {
                correct_message: setup.correct_message,
                incorrect_message: setup.incorrect_message,
            },
            criteria: criteria.unwrap_or_else(default_criteria),
            is_shuffled: setup.is_shuffled,
            revision: 0,
        })
    }

    /// 当前状态的设置文档快照
    pub fn to_setup_document(&self) -> SetupDocument {
        SetupDocument {
            answers: Some(self.answers.to_vec()),
            quiz_type: Some(self.mode.as_str().to_string()),
            correct_message: self.feedback.correct_message.clone(),
            incorrect_message: self.feedback.incorrect_message.clone(),
            is_shuffled: self.is_shuffled,
        }
    }

    /// 采纳宿主返回的规范设置文档
    ///
    /// 不会改变 revision：采纳的是已持久化的内容，不算本地编辑。
    pub fn adopt_setup(&mut self, canonical: SetupDocument) -> AppResult<()> {
        let mode = match canonical.quiz_type.as_deref() {
            Some(value) => value.parse::<QuizMode>()?,
            None => self.mode,
        };
        if let Some(answers) = canonical.answers {
            self.answers = AnswerSet::new(answers);
        }
        self.mode = mode;
        self.feedback = FeedbackText {
            correct_message: canonical.correct_message,
            incorrect_message: canonical.incorrect_message,
        };
        self.is_shuffled = canonical.is_shuffled;
        Ok(())
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    /// 追加答案并写入对应的判分条目；标识冲突时返回 false
    pub fn add_answer(&mut self, id: String, text: String, correct: bool) -> bool {
        if !self.answers.push(Answer::new(id.clone(), text)) {
            return false;
        }
        self.criteria.set(id, correct);
        self.touch();
        true
    }

    /// 删除答案；判分条目留给调和器在下次保存前清理
    pub fn remove_answer(&mut self, id: &str) -> bool {
        let removed = self.answers.remove(id).is_some();
        if removed {
            self.touch();
        } else {
            debug!("删除的答案不存在: {}", id);
        }
        removed
    }

    pub fn update_text(&mut self, id: &str, text: impl Into<String>) -> bool {
        let updated = self.answers.update_text(id, text);
        if updated {
            self.touch();
        }
        updated
    }

    pub fn set_feedback(&mut self, kind: FeedbackKind, text: impl Into<String>) {
        self.feedback.set(kind, text);
        self.touch();
    }

    pub fn set_mode(&mut self, mode: QuizMode) {
        self.mode = mode;
        self.touch();
    }

    /// 判分标准属于另一份文档，修改它不影响设置文档的 revision
    pub fn criteria_mut(&mut self) -> &mut CriteriaMap {
        &mut self.criteria
    }
}
