//! 答题会话 - 流程层
//!
//! 答题工具只拥有学习者的选择；答案、模式、反馈文本是只读配置，
//! 判分标准完全不可见，只能通过宿主的评分接口得到结果。
//!
//! 提交是一个两态状态机：
//! 1. idle → submitting：提交按钮禁用，拉起"保存中"信号
//! 2. 全量扫描控件 → 记录交互 → 评分 → 切换反馈显示 → 保存用户文档
//! 3. 用户文档保存完成后才回到 idle，提交按钮重新可用

use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{AppError, AppResult, SubmissionError};
use crate::infrastructure::{DocumentStore, Grader, Host};
use crate::models::{
    default_answers, AnswerSet, FeedbackText, QuizMode, SavedSelection, SelectionState,
    DEFAULT_QUIZ_TYPE,
};
use crate::sync::SavingStatus;
use crate::view::{ControlSet, DisplayView, Intent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitPhase {
    Idle,
    Submitting,
}

/// 正确 / 错误反馈区域是否显示
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedbackVisibility {
    pub correct: bool,
    pub incorrect: bool,
}

struct DisplayState {
    controls: ControlSet,
    selection: SelectionState,
    visibility: FeedbackVisibility,
    phase: SubmitPhase,
}

/// 离开提交流程时（包括出错）恢复 idle
struct SubmittingGuard<'a> {
    state: &'a Mutex<DisplayState>,
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        self.state.lock().phase = SubmitPhase::Idle;
        debug!("提交按钮已恢复");
    }
}

pub struct DisplaySession {
    user: Arc<dyn DocumentStore<SavedSelection>>,
    grader: Arc<dyn Grader>,
    answers: AnswerSet,
    feedback: FeedbackText,
    state: Mutex<DisplayState>,
    status: SavingStatus,
}

impl DisplaySession {
    pub async fn load(host: &Host, _config: &Config) -> AppResult<Self> {
        Self::load_with_rng(host, &mut StdRng::from_entropy()).await
    }

    /// 读取设置文档与上一次提交；`isShuffled` 时用给定随机源打乱本地答案顺序
    pub async fn load_with_rng<R: Rng + ?Sized>(host: &Host, rng: &mut R) -> AppResult<Self> {
        let (setup, saved) = tokio::try_join!(host.setup.retrieve(), host.user.retrieve())?;
        let setup = setup.unwrap_or_default();
        let saved = saved.unwrap_or_default();

        let mode = setup
            .quiz_type
            .as_deref()
            .unwrap_or(DEFAULT_QUIZ_TYPE)
            .parse::<QuizMode>()?;

        let mut answers = AnswerSet::new(setup.answers.unwrap_or_else(default_answers));
        if setup.is_shuffled {
            // 只打乱本地副本，不写回
            answers.shuffle(rng);
            debug!("🔀 答案顺序已打乱");
        }

        let selection = saved.selected;
        let controls = ControlSet::build(mode, &answers, |id| selection.is_selected(id));
        let visibility = FeedbackVisibility {
            correct: saved.is_correct,
            incorrect: false,
        };

        info!(
            "✓ 答题会话已加载: {} 个答案, 模式 {}, 上次结果 {}",
            answers.len(),
            mode,
            if saved.is_correct { "正确" } else { "未答对" }
        );

        Ok(Self {
            user: host.user.clone(),
            grader: host.grader.clone(),
            answers,
            feedback: FeedbackText {
                correct_message: setup.correct_message,
                incorrect_message: setup.incorrect_message,
            },
            state: Mutex::new(DisplayState {
                controls,
                selection,
                visibility,
                phase: SubmitPhase::Idle,
            }),
            status: SavingStatus::new(),
        })
    }

    /// 学习者点击某个答案；不存在时返回 false
    pub fn toggle_selection(&self, id: &str) -> bool {
        let mut state = self.state.lock();
        if !state.controls.toggle(id) {
            debug!("切换的答案不存在: {}", id);
            return false;
        }
        let scanned = state.controls.rescan();
        state.selection.rebuild_from(&scanned);
        true
    }

    /// 提交当前选择，返回是否全部答对
    ///
    /// 上一次提交还没保存完时返回 `SubmissionError::AlreadySubmitting`。
    pub async fn submit(&self) -> AppResult<bool> {
        let selection = {
            let mut state = self.state.lock();
            if state.phase == SubmitPhase::Submitting {
                return Err(AppError::Submission(SubmissionError::AlreadySubmitting));
            }
            state.phase = SubmitPhase::Submitting;
            let scanned = state.controls.rescan();
            state.selection.rebuild_from(&scanned);
            state.selection.clone()
        };
        let _submitting = SubmittingGuard { state: &self.state };
        let _saving = self.status.begin();
        info!("📤 提交答案 ({} 项)", selection.len());
        self.grader.log_interaction();

        let grade = self.grader.submit(&selection).await.map_err(|e| {
            error!("❌ 评分失败: {}", e);
            AppError::grading_failed(e)
        })?;

        self.state.lock().visibility = FeedbackVisibility {
            correct: grade.success,
            incorrect: !grade.success,
        };

        let saved = SavedSelection {
            selected: selection,
            is_correct: grade.success,
        };
        if let Err(e) = self.user.replace(saved).await {
            error!("❌ [{}] 保存失败: {}", self.user.name(), e);
            return Err(e);
        }

        info!("✓ 提交完成: {}", if grade.success { "正确" } else { "错误" });
        Ok(grade.success)
    }

    /// 分发视图意图；出题工具的意图在这里被忽略
    pub async fn handle(&self, intent: Intent) -> AppResult<()> {
        match intent {
            Intent::ToggleSelection { id } => {
                self.toggle_selection(&id);
            }
            Intent::Submit => {
                self.submit().await?;
            }
            other => debug!("答题工具不处理出题意图: {:?}", other),
        }
        Ok(())
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn selection(&self) -> SelectionState {
        self.state.lock().selection.clone()
    }

    pub fn visibility(&self) -> FeedbackVisibility {
        self.state.lock().visibility
    }

    pub fn phase(&self) -> SubmitPhase {
        self.state.lock().phase
    }

    pub fn submit_enabled(&self) -> bool {
        self.phase() == SubmitPhase::Idle
    }

    pub fn status(&self) -> &SavingStatus {
        &self.status
    }

    pub fn view(&self) -> DisplayView {
        let state = self.state.lock();
        DisplayView {
            mode: state.controls.mode(),
            controls: state.controls.controls().to_vec(),
            show_correct: state.visibility.correct,
            show_incorrect: state.visibility.incorrect,
            correct_message: self.feedback.correct_message.clone(),
            incorrect_message: self.feedback.incorrect_message.clone(),
            submit_enabled: state.phase == SubmitPhase::Idle,
            saving: self.status.is_saving(),
        }
    }
}
