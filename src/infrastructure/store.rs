//! 宿主文档存储接口 - 基础设施层
//!
//! 宿主提供两份彼此独立的键值文档（设置文档、判分标准文档）
//! 以及按用户作用域的选择文档，每份都只支持读取与整体替换。

use async_trait::async_trait;

use crate::error::AppResult;

/// 单份宿主文档
///
/// 职责：
/// - `retrieve` 返回文档内容，从未保存过时返回 `None`（由调用方提供默认值）
/// - `replace` 整体替换文档，并返回宿主规范化后的副本
/// - 不认识答案 / 判分标准的业务规则
///
/// 宿主调用要么完成，要么永不返回；没有超时语义。
#[async_trait]
pub trait DocumentStore<T>: Send + Sync
where
    T: Send + 'static,
{
    /// 文档名称（仅用于日志）
    fn name(&self) -> &str;

    /// 读取文档
    async fn retrieve(&self) -> AppResult<Option<T>>;

    /// 整体替换文档，返回规范副本
    async fn replace(&self, body: T) -> AppResult<T>;
}
