//! 出题会话 - 流程层
//!
//! 核心职责：把视图上报的意图落到内存状态上，再交给持久化协调器决定怎么保存
//!
//! | 意图 | 内存修改 | 保存方式 |
//! |------|----------|----------|
//! | 新增 / 删除答案 | 答案集合 + 判分标准 | 联合保存 |
//! | 切换答题模式 | 模式 | 联合保存 |
//! | 切换正确答案 | 全量扫描控件重建判分标准 | 立即保存判分标准 |
//! | 编辑答案 / 反馈文本 | 文本 | 按字段防抖，提交时立即保存 |

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::{Host, HostEvent, IdGenerator};
use crate::models::{AnswerSet, CriteriaMap, FeedbackKind, QuizMode, QuizState};
use crate::sync::{EditField, PersistenceCoordinator, SaveHandle, SavingStatus};
use crate::utils::logging::truncate_text;
use crate::view::{AuthorView, ControlSet, Intent};

/// 生成标识时最多重试的次数
const MAX_ID_ATTEMPTS: usize = 8;

pub struct AuthorSession {
    coordinator: PersistenceCoordinator,
    ids: Arc<dyn IdGenerator>,
}

impl AuthorSession {
    /// 读取设置文档与判分标准，缺失时使用默认值
    pub async fn load(host: &Host, config: &Config) -> AppResult<Self> {
        let (setup, criteria) = tokio::try_join!(host.setup.retrieve(), host.criteria.retrieve())?;
        let state = QuizState::from_documents(setup, criteria)?;

        info!(
            "✓ 出题会话已加载: {} 个答案, 模式 {}",
            state.answers.len(),
            state.mode
        );

        let coordinator = PersistenceCoordinator::new(
            Arc::new(Mutex::new(state)),
            host.setup.clone(),
            host.criteria.clone(),
            config.debounce_delay(),
        );

        Ok(Self {
            coordinator,
            ids: host.ids.clone(),
        })
    }

    /// 新增答案，返回新标识与联合保存
    pub fn add_answer(
        &self,
        text: impl Into<String>,
        correct: bool,
    ) -> AppResult<(String, SaveHandle)> {
        let text = text.into();
        let id = {
            let mut state = self.coordinator.quiz().lock();
            let id = self.fresh_id(&state.answers)?;
            state.add_answer(id.clone(), text.clone(), correct);
            id
        };
        info!("➕ 新增答案 {}: {}", id, truncate_text(&text, 30));
        Ok((id, self.coordinator.save()))
    }

    /// 删除答案；不存在时什么也不做
    pub fn remove_answer(&self, id: &str) -> Option<SaveHandle> {
        let removed = self.coordinator.quiz().lock().remove_answer(id);
        if !removed {
            return None;
        }
        info!("➖ 删除答案 {}", id);
        Some(self.coordinator.save())
    }

    /// 编辑答案文本；`commit` 为 true 时立即保存
    pub fn edit_text(&self, id: &str, text: impl Into<String>, commit: bool) -> Option<SaveHandle> {
        let updated = self.coordinator.quiz().lock().update_text(id, text);
        if !updated {
            debug!("编辑的答案不存在: {}", id);
            return None;
        }
        self.save_text_edit(EditField::AnswerText(id.to_string()), commit)
    }

    /// 编辑反馈文本；`commit` 为 true 时立即保存
    pub fn edit_feedback(
        &self,
        kind: FeedbackKind,
        text: impl Into<String>,
        commit: bool,
    ) -> Option<SaveHandle> {
        self.coordinator.quiz().lock().set_feedback(kind, text);
        self.save_text_edit(EditField::Feedback(kind), commit)
    }

    /// 点击某个答案的正确性控件，全量扫描后保存判分标准
    pub fn toggle_correctness(&self, id: &str) -> Option<SaveHandle> {
        {
            let mut state = self.coordinator.quiz().lock();
            let mut controls = ControlSet::build(state.mode, &state.answers, |answer_id| {
                state.criteria.is_correct(answer_id)
            });
            if !controls.toggle(id) {
                debug!("切换的答案不存在: {}", id);
                return None;
            }
            let scanned = controls.rescan();
            state.criteria_mut().rebuild_from(&scanned);
        }
        debug!("✔ 判分标准已按控件重建 ({})", id);
        Some(self.coordinator.save_criteria())
    }

    /// 切换答题模式：答案与判分标准保持不变，只改变控件分组
    pub fn change_mode(&self, mode: QuizMode) -> SaveHandle {
        let previous = {
            let mut state = self.coordinator.quiz().lock();
            let previous = state.mode;
            state.set_mode(mode);
            previous
        };
        info!("🔀 答题模式 {} → {}", previous, mode);
        self.coordinator.save()
    }

    /// 联合保存两份文档（宿主"全部保存"事件）
    pub fn save_all(&self) -> SaveHandle {
        self.coordinator.save()
    }

    /// 分发视图意图；答题工具的意图在这里被忽略
    pub fn handle(&self, intent: Intent) -> AppResult<Option<SaveHandle>> {
        let handle = match intent {
            Intent::AddAnswer { text, correct } => Some(self.add_answer(text, correct)?.1),
            Intent::RemoveAnswer { id } => self.remove_answer(&id),
            Intent::EditText { id, text, commit } => self.edit_text(&id, text, commit),
            Intent::ToggleCorrectness { id } => self.toggle_correctness(&id),
            Intent::ChangeMode { mode } => Some(self.change_mode(mode)),
            Intent::EditFeedback { kind, text, commit } => self.edit_feedback(kind, text, commit),
            other @ (Intent::ToggleSelection { .. } | Intent::Submit) => {
                warn!("⚠️ 出题工具不处理答题意图: {:?}", other);
                None
            }
        };
        Ok(handle)
    }

    /// 订阅宿主事件：收到"全部保存"时发起联合保存
    pub fn spawn_event_listener(&self, mut events: broadcast::Receiver<HostEvent>) -> JoinHandle<()> {
        let coordinator = self.coordinator.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(HostEvent::SaveAll) => {
                        info!("📥 收到宿主全部保存事件");
                        coordinator.save().detach();
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("⚠️ 宿主事件积压，跳过 {} 个", skipped);
                    }
                    Err(RecvError::Closed) => {
                        debug!("宿主事件通道已关闭");
                        break;
                    }
                }
            }
        })
    }

    /// 立即执行待定的防抖保存，并等待全部保存完成
    pub async fn shutdown(&self) {
        let flushed = self.coordinator.flush_pending();
        if flushed > 0 {
            info!("⚡ 退出前执行 {} 个待定保存", flushed);
        }
        let mut saving = self.coordinator.status().subscribe();
        if saving.wait_for(|saving| !*saving).await.is_err() {
            warn!("⚠️ 保存状态通道已关闭");
        }
    }

    pub fn answers(&self) -> AnswerSet {
        self.coordinator.quiz().lock().answers.clone()
    }

    pub fn criteria(&self) -> CriteriaMap {
        self.coordinator.quiz().lock().criteria.clone()
    }

    pub fn mode(&self) -> QuizMode {
        self.coordinator.quiz().lock().mode
    }

    /// 按当前模式构建控件，选中即为正确答案
    pub fn controls(&self) -> ControlSet {
        let state = self.coordinator.quiz().lock();
        ControlSet::build(state.mode, &state.answers, |id| state.criteria.is_correct(id))
    }

    pub fn status(&self) -> &SavingStatus {
        self.coordinator.status()
    }

    pub fn is_saving(&self) -> bool {
        self.coordinator.status().is_saving()
    }

    pub fn has_pending_edits(&self) -> bool {
        self.coordinator.has_pending_edits()
    }

    pub fn view(&self) -> AuthorView {
        let state = self.coordinator.quiz().lock();
        let controls =
            ControlSet::build(state.mode, &state.answers, |id| state.criteria.is_correct(id));
        AuthorView {
            mode: state.mode,
            answers: state.answers.to_vec(),
            controls: controls.controls().to_vec(),
            correct_message: state.feedback.correct_message.clone(),
            incorrect_message: state.feedback.incorrect_message.clone(),
            saving: self.is_saving(),
        }
    }

    fn save_text_edit(&self, field: EditField, commit: bool) -> Option<SaveHandle> {
        if commit {
            Some(self.coordinator.commit_edit(&field))
        } else {
            self.coordinator.schedule_edit(field);
            None
        }
    }

    fn fresh_id(&self, answers: &AnswerSet) -> AppResult<String> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.ids.next_id();
            if !answers.contains(&id) {
                return Ok(id);
            }
            warn!("⚠️ 生成的标识 {} 已存在，重新生成", id);
        }
        Err(AppError::Other(format!(
            "连续 {} 次生成的标识都已存在",
            MAX_ID_ATTEMPTS
        )))
    }
}
