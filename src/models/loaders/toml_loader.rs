use crate::error::AppResult;
use crate::models::{Answer, CriteriaMap, SetupDocument};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

/// TOML 种子中的一个答案
#[derive(Debug, Clone, Deserialize)]
pub struct SeedAnswer {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub correct: bool,
}

/// 首次运行时写入宿主的测验种子
///
/// ```toml
/// type = "multiple"
/// correct_message = "Correct!"
///
/// [[answers]]
/// id = "1"
/// text = "Rust"
/// correct = true
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct QuizSeed {
    #[serde(rename = "type", default = "default_type")]
    pub quiz_type: String,
    #[serde(default)]
    pub correct_message: String,
    #[serde(default)]
    pub incorrect_message: String,
    #[serde(default)]
    pub is_shuffled: bool,
    #[serde(default)]
    pub answers: Vec<SeedAnswer>,
}

fn default_type() -> String {
    crate::models::setup::DEFAULT_QUIZ_TYPE.to_string()
}

impl QuizSeed {
    /// 拆分为设置文档与判分标准文档
    pub fn into_documents(self) -> (SetupDocument, CriteriaMap) {
        let criteria = self
            .answers
            .iter()
            .map(|a| (a.id.clone(), a.correct))
            .collect();
        let setup = SetupDocument {
            answers: Some(
                self.answers
                    .into_iter()
                    .map(|a| Answer::new(a.id, a.text))
                    .collect(),
            ),
            quiz_type: Some(self.quiz_type),
            correct_message: self.correct_message,
            incorrect_message: self.incorrect_message,
            is_shuffled: self.is_shuffled,
        };
        (setup, criteria)
    }
}

/// 从 TOML 文件加载测验种子
pub async fn load_quiz_seed(toml_file_path: &Path) -> AppResult<QuizSeed> {
    let content = fs::read_to_string(toml_file_path).await?;
    let seed: QuizSeed = toml::from_str(&content)?;

    tracing::info!(
        "成功加载种子文件 {}: {} 个答案",
        toml_file_path.display(),
        seed.answers.len()
    );

    Ok(seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_splits_into_documents() {
        let seed: QuizSeed = toml::from_str(
            r#"
            type = "multiple"
            correct_message = "Yes"

            [[answers]]
            id = "a"
            text = "Rust"
            correct = true

            [[answers]]
            id = "b"
            text = "Go"
            "#,
        )
        .unwrap();

        let (setup, criteria) = seed.into_documents();
        assert_eq!(setup.quiz_type.as_deref(), Some("multiple"));
        assert_eq!(setup.answers.as_ref().unwrap().len(), 2);
        assert_eq!(setup.correct_message, "Yes");
        assert_eq!(criteria.get("a"), Some(true));
        assert_eq!(criteria.get("b"), Some(false));
    }

    #[test]
    fn test_seed_defaults_to_single() {
        let seed: QuizSeed = toml::from_str("").unwrap();
        assert_eq!(seed.quiz_type, "single");
        assert!(seed.answers.is_empty());
    }
}
