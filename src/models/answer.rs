//! 答案选项与答案集合

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// 一个答案选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// 宿主生成的标识，在同一测验内唯一
    pub id: String,
    /// 显示文本，可以为空
    #[serde(default)]
    pub text: String,
}

impl Answer {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// 有序答案集合
///
/// 顺序即显示顺序；集合内标识两两不同。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AnswerSet {
    answers: Vec<Answer>,
}

impl AnswerSet {
    /// 从答案列表构建，重复标识只保留第一次出现的
    pub fn new(answers: Vec<Answer>) -> Self {
        let mut set = Self::default();
        for answer in answers {
            let id = answer.id.clone();
            if !set.push(answer) {
                warn!("丢弃重复的答案标识: {}", id);
            }
        }
        set
    }

    /// 追加答案；标识已存在时不做修改并返回 false
    pub fn push(&mut self, answer: Answer) -> bool {
        if self.contains(&answer.id) {
            return false;
        }
        self.answers.push(answer);
        true
    }

    /// 删除指定标识的答案，不存在时返回 None
    pub fn remove(&mut self, id: &str) -> Option<Answer> {
        let index = self.answers.iter().position(|a| a.id == id)?;
        Some(self.answers.remove(index))
    }

    /// 更新答案文本，不存在时返回 false
    pub fn update_text(&mut self, id: &str, text: impl Into<String>) -> bool {
        match self.answers.iter_mut().find(|a| a.id == id) {
            Some(answer) => {
                answer.text = text.into();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Answer> {
        self.answers.iter().find(|a| a.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.answers.iter().map(|a| a.id.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Answer> {
        self.answers.iter()
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn as_slice(&self) -> &[Answer] {
        &self.answers
    }

    pub fn to_vec(&self) -> Vec<Answer> {
        self.answers.clone()
    }

    /// 原地打乱显示顺序（仅答题工具本地使用，从不写回）
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.answers.shuffle(rng);
    }
}

impl<'de> Deserialize<'de> for AnswerSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Vec::<Answer>::deserialize(deserializer).map(AnswerSet::new)
    }
}

impl<'a> IntoIterator for &'a AnswerSet {
    type Item = &'a Answer;
    type IntoIter = std::slice::Iter<'a, Answer>;

    fn into_iter(self) -> Self::IntoIter {
        self.answers.iter()
    }
}
