//! 判分标准调和
//!
//! 每次写判分标准文档之前立即执行：删除答案集合中已不存在的标识。
//! 否则被删除答案的正确性数据会在下次加载时"复活"。

use std::collections::HashSet;

use tracing::debug;

use crate::models::{AnswerSet, CriteriaMap};

/// 删除孤立条目，返回被删除的标识
pub fn reconcile(criteria: &mut CriteriaMap, answers: &AnswerSet) -> Vec<String> {
    let live: HashSet<&str> = answers.ids().collect();
    let orphaned: Vec<String> = criteria
        .keys()
        .filter(|id| !live.contains(id))
        .map(str::to_string)
        .collect();

    for id in &orphaned {
        criteria.remove(id);
    }

    if !orphaned.is_empty() {
        debug!("🧹 清理孤立的判分条目: {:?}", orphaned);
    }

    orphaned
}
