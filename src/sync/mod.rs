//! 同步层（Sync）
//!
//! ## 职责
//!
//! 保证答案集合与判分标准这两份相互依赖的文档不分叉，
//! 并且快速的连续按键编辑不会丢失。
//!
//! ## 模块划分
//!
//! - `reconciler` - 写判分标准前清理孤立条目
//! - `barrier` - 汇合屏障，N 个异步操作全部完成后恰好回调一次
//! - `debounce` - 按 key 防抖的任务调度器
//! - `status` - "保存中"信号
//! - `coordinator` - 持久化协调器，组合以上能力
//!
//! ## 层次关系
//!
//! ```text
//! workflow (AuthorSession / DisplaySession)
//!     ↓
//! coordinator (立即 / 防抖 / 联合保存)
//!     ↓
//! reconciler · barrier · debounce · status
//!     ↓
//! infrastructure (DocumentStore)
//! ```

pub mod barrier;
pub mod coordinator;
pub mod debounce;
pub mod reconciler;
pub mod status;

pub use barrier::{join_barrier, join_pair, Arrival};
pub use coordinator::{EditField, PersistenceCoordinator, SaveHandle, SharedQuiz};
pub use debounce::Debouncer;
pub use reconciler::reconcile;
pub use status::{SavingGuard, SavingStatus};
