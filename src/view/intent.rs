use serde::{Deserialize, Serialize};

use crate::models::{FeedbackKind, QuizMode};

/// 视图上报的用户意图
///
/// JSON 形式例如 `{"intent": "edit_text", "id": "1", "text": "Paris"}`。
/// `commit` 表示编辑提交（失焦 / change），绕过防抖立即保存。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    /// 出题：新增答案
    AddAnswer {
        #[serde(default)]
        text: String,
        #[serde(default)]
        correct: bool,
    },
    /// 出题：删除答案
    RemoveAnswer { id: String },
    /// 出题：编辑答案文本
    EditText {
        id: String,
        text: String,
        #[serde(default)]
        commit: bool,
    },
    /// 出题：切换某个答案是否正确
    ToggleCorrectness { id: String },
    /// 出题：切换单选 / 多选
    ChangeMode { mode: QuizMode },
    /// 出题：编辑反馈文本
    EditFeedback {
        kind: FeedbackKind,
        text: String,
        #[serde(default)]
        commit: bool,
    },
    /// 答题：切换某个答案的选中状态
    ToggleSelection { id: String },
    /// 答题：提交
    Submit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_intents() {
        let edit: Intent =
            serde_json::from_str(r#"{"intent":"edit_text","id":"1","text":"Paris"}"#).unwrap();
        assert_eq!(
            edit,
            Intent::EditText {
                id: "1".into(),
                text: "Paris".into(),
                commit: false
            }
        );

        let mode: Intent =
            serde_json::from_str(r#"{"intent":"change_mode","mode":"multiple"}"#).unwrap();
        assert_eq!(
            mode,
            Intent::ChangeMode {
                mode: QuizMode::Multiple
            }
        );

        let feedback: Intent = serde_json::from_str(
            r#"{"intent":"edit_feedback","kind":"incorrect","text":"Try again","commit":true}"#,
        )
        .unwrap();
        assert!(matches!(
            feedback,
            Intent::EditFeedback {
                kind: FeedbackKind::Incorrect,
                commit: true,
                ..
            }
        ));

        let submit: Intent = serde_json::from_str(r#"{"intent":"submit"}"#).unwrap();
        assert_eq!(submit, Intent::Submit);
    }

    #[test]
    fn test_unknown_mode_fails_to_parse() {
        let result: Result<Intent, _> =
            serde_json::from_str(r#"{"intent":"change_mode","mode":"ranking"}"#);
        assert!(result.is_err());
    }
}
