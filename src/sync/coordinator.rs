//! 持久化协调器
//!
//! ## 职责
//!
//! 协调两份彼此独立的宿主文档的保存：
//! - 设置文档 `{answers, type, correctMessage, incorrectMessage}`：整体替换，
//!   成功后采纳宿主返回的规范副本
//! - 判分标准文档：整体替换，写之前立即调和
//!
//! ## 保存策略
//!
//! - 立即保存：`save_state` / `save_criteria`，结构性编辑之后使用
//! - 防抖保存：`schedule_edit`，同一字段的连续编辑合并为一次替换；`commit_edit` 绕过防抖
//! - 联合保存：`save`，两个替换请求同时发出，二者都完成后恰好完成一次
//!
//! 每个保存都在发出前拉起"保存中"信号，完成后放下。
//! 同一份文档同一时刻只有一个写入者：后发出的替换排在前一个之后，
//! 拿到写锁时才从共享状态取快照，最后落盘的总是最新状态。
//! 宿主调用失败时只记录日志并通过 `SaveHandle` 返回错误，不重试。

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{oneshot, Mutex as WriteLock};
use tracing::{debug, error, info};

use crate::error::{AppError, AppResult};
use crate::infrastructure::DocumentStore;
use crate::models::{CriteriaMap, FeedbackKind, QuizState, SetupDocument};
use crate::sync::barrier::join_pair;
use crate::sync::debounce::Debouncer;
use crate::sync::reconciler::reconcile;
use crate::sync::status::SavingStatus;

/// 出题会话共享的状态
pub type SharedQuiz = Arc<Mutex<QuizState>>;

/// 防抖的文本字段，每个字段独立计时
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EditField {
    /// 某个答案的文本
    AnswerText(String),
    /// 反馈文本
    Feedback(FeedbackKind),
}

/// 一次已发出的保存
///
/// 可以 `wait` 等待完成，也可以直接丢弃（发出即忘）。
#[must_use = "丢弃 SaveHandle 表示不关心保存结果，请显式调用 detach"]
pub struct SaveHandle {
    rx: oneshot::Receiver<AppResult<()>>,
}

impl SaveHandle {
    fn channel() -> (oneshot::Sender<AppResult<()>>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }

    /// 等待保存完成
    pub async fn wait(self) -> AppResult<()> {
        self.rx
            .await
            .unwrap_or_else(|_| Err(AppError::Other("保存任务在完成前被丢弃".to_string())))
    }

    /// 不等待结果
    pub fn detach(self) {}
}

#[derive(Clone)]
pub struct PersistenceCoordinator {
    quiz: SharedQuiz,
    setup_store: Arc<dyn DocumentStore<SetupDocument>>,
    criteria_store: Arc<dyn DocumentStore<CriteriaMap>>,
    status: SavingStatus,
    debouncer: Debouncer<EditField>,
    setup_writer: Arc<WriteLock<()>>,
    criteria_writer: Arc<WriteLock<()>>,
}

impl PersistenceCoordinator {
    pub fn new(
        quiz: SharedQuiz,
        setup_store: Arc<dyn DocumentStore<SetupDocument>>,
        criteria_store: Arc<dyn DocumentStore<CriteriaMap>>,
        debounce_delay: Duration,
    ) -> Self {
        Self {
            quiz,
            setup_store,
            criteria_store,
            status: SavingStatus::new(),
            debouncer: Debouncer::new(debounce_delay),
            setup_writer: Arc::new(WriteLock::new(())),
            criteria_writer: Arc::new(WriteLock::new(())),
        }
    }

    pub fn status(&self) -> &SavingStatus {
        &self.status
    }

    pub fn quiz(&self) -> &SharedQuiz {
        &self.quiz
    }

    /// 立即保存设置文档
    pub fn save_state(&self) -> SaveHandle {
        let (tx, handle) = SaveHandle::channel();
        self.spawn_setup_replace(move |result| {
            let _ = tx.send(result);
        });
        handle
    }

    /// 调和后立即保存判分标准文档
    pub fn save_criteria(&self) -> SaveHandle {
        let (tx, handle) = SaveHandle::channel();
        self.spawn_criteria_replace(move |result| {
            let _ = tx.send(result);
        });
        handle
    }

    /// 联合保存：两份文档同时替换，全部完成后恰好完成一次
    ///
    /// 待定的防抖保存被取消，它们的编辑会包含在这次写入的快照里。
    pub fn save(&self) -> SaveHandle {
        let cancelled = self.debouncer.cancel_all();
        if cancelled > 0 {
            debug!("联合保存覆盖了 {} 个待定的防抖保存", cancelled);
        }

        let (tx, handle) = SaveHandle::channel();

        let (setup_done, criteria_done) = join_pair(move |results: Vec<AppResult<()>>| {
            let outcome = results
                .into_iter()
                .find(Result::is_err)
                .unwrap_or(Ok(()));
            match &outcome {
                Ok(()) => info!("✓ 联合保存完成"),
                Err(e) => error!("❌ 联合保存失败: {}", e),
            }
            let _ = tx.send(outcome);
        });

        // 两个请求都发出之后才可能有回调执行
        self.spawn_setup_replace(move |result| setup_done.arrive(result));
        self.spawn_criteria_replace(move |result| criteria_done.arrive(result));
        handle
    }

    /// 文本编辑：在该字段静默一段时间后保存设置文档
    pub fn schedule_edit(&self, field: EditField) {
        let coordinator = self.clone();
        self.debouncer.schedule(field, move || coordinator.save_state().detach());
    }

    /// 编辑提交（失焦 / change）：丢弃该字段的计时并立即保存
    pub fn commit_edit(&self, field: &EditField) -> SaveHandle {
        if self.debouncer.cancel(field) {
            debug!("编辑提交，跳过 {:?} 的防抖等待", field);
        }
        self.save_state()
    }

    /// 立即执行全部待定的防抖保存
    pub fn flush_pending(&self) -> usize {
        self.debouncer.flush_all()
    }

    pub fn has_pending_edits(&self) -> bool {
        self.debouncer.pending_count() > 0
    }

    fn spawn_setup_replace(&self, done: impl FnOnce(AppResult<()>) + Send + 'static) {
        let guard = self.status.begin();
        let store = self.setup_store.clone();
        let quiz = self.quiz.clone();
        let writer = self.setup_writer.clone();

        tokio::spawn(async move {
            // 写锁一直持有到采纳结束，同一文档的替换与采纳依次进行
            let writing = writer.lock().await;
            let (doc, revision) = {
                let state = quiz.lock();
                (state.to_setup_document(), state.revision())
            };
            debug!("📤 [{}] 发出替换请求 (r{})", store.name(), revision);

            let result = match store.replace(doc).await {
                Ok(canonical) => adopt_canonical(&quiz, canonical, revision),
                Err(e) => {
                    error!("❌ [{}] 保存失败: {}", store.name(), e);
                    Err(e)
                }
            };
            drop(writing);
            drop(guard);
            done(result);
        });
    }

    fn spawn_criteria_replace(&self, done: impl FnOnce(AppResult<()>) + Send + 'static) {
        let guard = self.status.begin();
        let store = self.criteria_store.clone();
        let quiz = self.quiz.clone();
        let writer = self.criteria_writer.clone();

        tokio::spawn(async move {
            let writing = writer.lock().await;
            let criteria = {
                let mut state = quiz.lock();
                reconciled_criteria(&mut state)
            };
            debug!("📤 [{}] 发出替换请求 ({} 个条目)", store.name(), criteria.len());

            let result = match store.replace(criteria).await {
                Ok(_) => {
                    debug!("✓ [{}] 保存完成", store.name());
                    Ok(())
                }
                Err(e) => {
                    error!("❌ [{}] 保存失败: {}", store.name(), e);
                    Err(e)
                }
            };
            drop(writing);
            drop(guard);
            done(result);
        });
    }
}

/// 调和并返回判分标准快照
fn reconciled_criteria(state: &mut QuizState) -> CriteriaMap {
    let QuizState {
        answers, criteria, ..
    } = state;
    reconcile(criteria, answers);
    criteria.clone()
}

/// 采纳宿主规范副本；发出请求后本地又有编辑时不采纳，避免回滚新编辑
fn adopt_canonical(quiz: &SharedQuiz, canonical: SetupDocument, revision: u64) -> AppResult<()> {
    let mut state = quiz.lock();
    if state.revision() != revision {
        debug!(
            "本地已有更新的编辑 (r{} → r{})，不采纳规范副本",
            revision,
            state.revision()
        );
        return Ok(());
    }
    state.adopt_setup(canonical)?;
    debug!("✓ 已采纳设置文档规范副本 (r{})", revision);
    Ok(())
}
