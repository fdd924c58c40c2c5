use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 学习者当前的选择：答案标识 → 是否选中
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionState {
    picks: BTreeMap<String, bool>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, id: impl Into<String>, selected: bool) {
        self.picks.insert(id.into(), selected);
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.picks.get(id).copied().unwrap_or(false)
    }

    pub fn get(&self, id: &str) -> Option<bool> {
        self.picks.get(id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.picks.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.picks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    /// 把全量扫描结果写入当前选择
    pub fn rebuild_from(&mut self, scanned: &BTreeMap<String, bool>) {
        for (id, checked) in scanned {
            self.picks.insert(id.clone(), *checked);
        }
    }

    pub fn as_map(&self) -> &BTreeMap<String, bool> {
        &self.picks
    }
}

impl From<BTreeMap<String, bool>> for SelectionState {
    fn from(picks: BTreeMap<String, bool>) -> Self {
        Self { picks }
    }
}

impl<K: Into<String>> FromIterator<(K, bool)> for SelectionState {
    fn from_iter<I: IntoIterator<Item = (K, bool)>>(iter: I) -> Self {
        Self {
            picks: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// 用户文档：上一次提交的选择以及评分结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSelection {
    #[serde(default)]
    pub selected: SelectionState,
    #[serde(rename = "isCorrect", default)]
    pub is_correct: bool,
}
