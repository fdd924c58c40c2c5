//! # Quiz Sync
//!
//! 单选 / 多选测验组件的状态同步与持久化调和核心
//!
//! ## 架构设计
//!
//! 出题工具与答题工具共用一套数据模型和持久化规则，分层如下：
//!
//! ### ① 数据模型层（Models）
//! - `models/` - 答案集合、答题模式、判分标准、学习者选择、设置文档
//! - `models/loaders` - TOML 种子数据加载
//!
//! ### ② 基础设施层（Infrastructure）
//! - `infrastructure/` - 宿主协作者，全部藏在 trait 后面
//! - `DocumentStore` - 文档读取 / 整体替换（内存、JSON 文件两种实现）
//! - `Grader` - 评分与交互记录
//! - `Host` - 打包全部协作者以及"全部保存"事件通道
//!
//! ### ③ 同步层（Sync）
//! - `sync/` - 调和器、汇合屏障、防抖调度器、保存状态信号、持久化协调器
//!
//! ### ④ 视图契约层（View）
//! - `view/` - 答案控件语义、视图意图、视图快照
//!
//! ### ⑤ 流程层（Workflow）
//! - `AuthorSession` - 出题会话：意图 → 内存修改 → 保存策略
//! - `DisplaySession` - 答题会话：选择 → 提交 → 评分 → 保存上一次提交
//!
//! ## 模块结构

pub mod app;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod sync;
pub mod utils;
pub mod view;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use config::{Config, ToolKind};
pub use error::{AppError, AppResult};
pub use infrastructure::{DocumentStore, Host, HostEvent};
pub use models::{AnswerSet, CriteriaMap, QuizMode, QuizState};
pub use sync::{PersistenceCoordinator, SaveHandle};
pub use workflow::{AuthorSession, DisplaySession};
