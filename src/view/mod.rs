//! 视图契约层
//!
//! 不做渲染，只定义视图与核心之间交换的东西：
//! 答案控件的分组 / 选中语义、视图上报的意图，以及核心回传给视图的快照。

pub mod controls;
pub mod intent;
pub mod snapshot;

pub use controls::{AnswerControl, ControlSet, ControlStyle, SINGLE_GROUP};
pub use intent::Intent;
pub use snapshot::{AuthorView, DisplayView};
