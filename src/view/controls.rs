//! 答案控件
//!
//! 渲染由外部视图完成，这里只描述控件的分组与选中语义：
//! - 单选：所有控件为 radio，共用输入组 `answer`，组内互斥
//! - 多选：所有控件为 checkbox，每个控件以自己的标识为组名
//!
//! 映射（判分标准 / 学习者选择）总是通过全量扫描控件重建，扫描结果只取决于控件状态。

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{AnswerSet, QuizMode};

/// 单选模式的共用输入组名
pub const SINGLE_GROUP: &str = "answer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlStyle {
    Radio,
    Checkbox,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerControl {
    /// 控件值，即答案标识
    pub value: String,
    /// 输入组名
    pub group: String,
    pub style: ControlStyle,
    pub checked: bool,
    pub text: String,
}

/// 一组已构建的答案控件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlSet {
    mode: QuizMode,
    controls: Vec<AnswerControl>,
}

impl ControlSet {
    /// 按答题模式构建控件，选中状态由 `is_checked` 给出
    ///
    /// 与浏览器的 radio 行为一致：同一互斥组中多个预选时只有最后一个保持选中。
    pub fn build(mode: QuizMode, answers: &AnswerSet, is_checked: impl Fn(&str) -> bool) -> Self {
        let style = match mode {
            QuizMode::Single => ControlStyle::Radio,
            QuizMode::Multiple => ControlStyle::Checkbox,
        };

        let mut set = Self {
            mode,
            controls: Vec::with_capacity(answers.len()),
        };

        for answer in answers {
            let group = match mode {
                QuizMode::Single => SINGLE_GROUP.to_string(),
                QuizMode::Multiple => answer.id.clone(),
            };
            let checked = is_checked(&answer.id);
            if checked && mode.is_exclusive() {
                set.uncheck_group(&group);
            }
            set.controls.push(AnswerControl {
                value: answer.id.clone(),
                group,
                style,
                checked,
                text: answer.text.clone(),
            });
        }

        set
    }

    pub fn mode(&self) -> QuizMode {
        self.mode
    }

    pub fn controls(&self) -> &[AnswerControl] {
        &self.controls
    }

    pub fn is_checked(&self, id: &str) -> bool {
        self.controls
            .iter()
            .any(|control| control.value == id && control.checked)
    }

    /// 用户点击某个控件；不存在时返回 false
    ///
    /// radio 点击后总是选中并清除同组其他控件；checkbox 翻转。
    pub fn toggle(&mut self, id: &str) -> bool {
        let Some(index) = self.controls.iter().position(|c| c.value == id) else {
            return false;
        };

        match self.controls[index].style {
            ControlStyle::Radio => {
                let group = self.controls[index].group.clone();
                self.uncheck_group(&group);
                self.controls[index].checked = true;
            }
            ControlStyle::Checkbox => {
                self.controls[index].checked = !self.controls[index].checked;
            }
        }
        true
    }

    /// 全量扫描：每个控件的选中状态，以控件值为键
    pub fn rescan(&self) -> BTreeMap<String, bool> {
        self.controls
            .iter()
            .map(|control| (control.value.clone(), control.checked))
            .collect()
    }

    fn uncheck_group(&mut self, group: &str) {
        for control in self.controls.iter_mut().filter(|c| c.group == group) {
            control.checked = false;
        }
    }
}
