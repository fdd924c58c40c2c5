//! 评分与交互记录 - 基础设施层

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AppResult;
use crate::infrastructure::store::DocumentStore;
use crate::models::{CriteriaMap, SelectionState};

/// 宿主评分结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeResult {
    pub success: bool,
}

/// 宿主的评分 / 进度接口
///
/// 判分标准对答题工具不可见，只能通过这里得到一个是否全部答对的结果。
#[async_trait]
pub trait Grader: Send + Sync {
    /// 提交全部选择，返回是否与判分标准完全一致
    async fn submit(&self, selection: &SelectionState) -> AppResult<GradeResult>;

    /// 记录一次交互（分析用，发出即忘）
    fn log_interaction(&self);
}

/// 本地评分器：直接读取判分标准文档比较
///
/// 所有出现在选择或标准中的标识，选中状态都必须与标准一致（缺失视为 false）。
pub struct LocalGrader {
    criteria: Arc<dyn DocumentStore<CriteriaMap>>,
    interactions: AtomicUsize,
}

impl LocalGrader {
    pub fn new(criteria: Arc<dyn DocumentStore<CriteriaMap>>) -> Self {
        Self {
            criteria,
            interactions: AtomicUsize::new(0),
        }
    }

    /// 已记录的交互次数
    pub fn interaction_count(&self) -> usize {
        self.interactions.load(Ordering::SeqCst)
    }
}

/// 选择是否与判分标准完全一致
pub fn matches_criteria(selection: &SelectionState, criteria: &CriteriaMap) -> bool {
    let selection_ok = selection
        .iter()
        .all(|(id, selected)| selected == criteria.is_correct(id));
    let criteria_ok = criteria
        .iter()
        .all(|(id, correct)| correct == selection.is_selected(id));
    selection_ok && criteria_ok
}

#[async_trait]
impl Grader for LocalGrader {
    async fn submit(&self, selection: &SelectionState) -> AppResult<GradeResult> {
        let criteria = self.criteria.retrieve().await?.unwrap_or_default();
        let success = matches_criteria(selection, &criteria);
        info!("📝 评分完成: {}", if success { "正确" } else { "错误" });
        Ok(GradeResult { success })
    }

    fn log_interaction(&self) {
        let count = self.interactions.fetch_add(1, Ordering::SeqCst) + 1;
        info!("📊 记录交互 (累计 {} 次)", count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory_store::InMemoryStore;

    fn criteria() -> CriteriaMap {
        [("1", true), ("2", false)].into_iter().collect()
    }

    #[test]
    fn test_matches_criteria() {
        let exact: SelectionState = [("1", true), ("2", false)].into_iter().collect();
        let implicit: SelectionState = [("1", true)].into_iter().collect();
        let wrong: SelectionState = [("1", true), ("2", true)].into_iter().collect();
        let empty = SelectionState::new();

        assert!(matches_criteria(&exact, &criteria()));
        assert!(matches_criteria(&implicit, &criteria()));
        assert!(!matches_criteria(&wrong, &criteria()));
        assert!(!matches_criteria(&empty, &criteria()));
    }

    #[tokio::test]
    async fn test_local_grader_reads_criteria_document() {
        let store = Arc::new(InMemoryStore::with_data("criteria", criteria()));
        let grader = LocalGrader::new(store);

        let picks: SelectionState = [("1", true), ("2", false)].into_iter().collect();
        assert!(grader.submit(&picks).await.unwrap().success);

        grader.log_interaction();
        grader.log_interaction();
        assert_eq!(grader.interaction_count(), 2);
    }
}
