use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 判分标准：答案标识 → 是否属于正确选择
///
/// 持久化时就是一个普通的 JSON 对象，例如 `{"1": true, "2": false}`。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CriteriaMap {
    entries: BTreeMap<String, bool>,
}

impl CriteriaMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, id: impl Into<String>, correct: bool) {
        self.entries.insert(id.into(), correct);
    }

    pub fn get(&self, id: &str) -> Option<bool> {
        self.entries.get(id).copied()
    }

    /// 缺失的条目视为 false
    pub fn is_correct(&self, id: &str) -> bool {
        self.get(id).unwrap_or(false)
    }

    pub fn remove(&mut self, id: &str) -> Option<bool> {
        self.entries.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 用扫描得到的控件状态整体重写对应条目
    pub fn rebuild_from(&mut self, scanned: &BTreeMap<String, bool>) {
        for (id, checked) in scanned {
            self.entries.insert(id.clone(), *checked);
        }
    }

    pub fn as_map(&self) -> &BTreeMap<String, bool> {
        &self.entries
    }
}

impl From<BTreeMap<String, bool>> for CriteriaMap {
    fn from(entries: BTreeMap<String, bool>) -> Self {
        Self { entries }
    }
}

impl<K: Into<String>> FromIterator<(K, bool)> for CriteriaMap {
    fn from_iter<I: IntoIterator<Item = (K, bool)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
