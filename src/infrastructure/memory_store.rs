//! 内存文档存储 - 基础设施层
//!
//! 用于测试与本地演示；"挂起"模式下替换请求在被显式放行前不会返回，
//! 用来控制多个并发保存的完成顺序；也可以给前几个替换请求各自设置耗时。

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::infrastructure::store::DocumentStore;

type Normalizer<T> = Box<dyn Fn(T) -> T + Send + Sync>;

pub struct InMemoryStore<T> {
    name: String,
    data: Mutex<Option<T>>,
    dispatched: Mutex<Vec<T>>,
    completed: Mutex<Vec<T>>,
    gate: Option<Semaphore>,
    delays: Mutex<VecDeque<Duration>>,
    normalizer: Option<Normalizer<T>>,
}

impl<T> InMemoryStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// 空文档（从未保存过）
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: Mutex::new(None),
            dispatched: Mutex::new(Vec::new()),
            completed: Mutex::new(Vec::new()),
            gate: None,
            delays: Mutex::new(VecDeque::new()),
            normalizer: None,
        }
    }

    /// 带初始内容
    pub fn with_data(name: impl Into<String>, data: T) -> Self {
        let store = Self::new(name);
        *store.data.lock() = Some(data);
        store
    }

    /// 挂起模式：每个替换请求都要等待一次 `release`
    pub fn held(mut self) -> Self {
        self.gate = Some(Semaphore::new(0));
        self
    }

    /// 第 n 个替换请求耗时 `delays[n]`，之后的请求立即完成
    pub fn with_delays(self, delays: impl IntoIterator<Item = Duration>) -> Self {
        self.delays.lock().extend(delays);
        self
    }

    /// 模拟宿主对文档的规范化改写
    pub fn with_normalizer(mut self, normalizer: impl Fn(T) -> T + Send + Sync + 'static) -> Self {
        self.normalizer = Some(Box::new(normalizer));
        self
    }

    /// 放行 `count` 个挂起的替换请求
    pub fn release(&self, count: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(count);
        }
    }

    /// 已发出（可能尚未完成）的替换请求内容
    pub fn dispatched(&self) -> Vec<T> {
        self.dispatched.lock().clone()
    }

    /// 已完成的替换请求返回的规范内容
    pub fn completed(&self) -> Vec<T> {
        self.completed.lock().clone()
    }

    pub fn dispatched_count(&self) -> usize {
        self.dispatched.lock().len()
    }

    pub fn completed_count(&self) -> usize {
        self.completed.lock().len()
    }

    /// 当前存储的文档
    pub fn current(&self) -> Option<T> {
        self.data.lock().clone()
    }
}

#[async_trait]
impl<T> DocumentStore<T> for InMemoryStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn retrieve(&self) -> AppResult<Option<T>> {
        Ok(self.data.lock().clone())
    }

    async fn replace(&self, body: T) -> AppResult<T> {
        self.dispatched.lock().push(body.clone());
        debug!("[{}] 收到替换请求", self.name);

        let delay = self.delays.lock().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| AppError::replace_failed(self.name.clone(), e))?
                .forget();
        }

        let canonical = match &self.normalizer {
            Some(normalize) => normalize(body),
            None => body,
        };

        *self.data.lock() = Some(canonical.clone());
        self.completed.lock().push(canonical.clone());
        Ok(canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_pending, assert_ready_ok, task};

    #[tokio::test]
    async fn test_retrieve_after_replace() {
        let store = InMemoryStore::new("setup");
        assert_eq!(store.retrieve().await.unwrap(), None::<String>);

        let canonical = store.replace("hello".to_string()).await.unwrap();
        assert_eq!(canonical, "hello");
        assert_eq!(store.retrieve().await.unwrap().as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_normalizer_rewrites_canonical_copy() {
        let store = InMemoryStore::new("setup").with_normalizer(|s: String| s.to_uppercase());
        assert_eq!(store.replace("abc".to_string()).await.unwrap(), "ABC");
        assert_eq!(store.dispatched(), vec!["abc".to_string()]);
        assert_eq!(store.completed(), vec!["ABC".to_string()]);
    }

    #[test]
    fn test_held_replace_waits_for_release() {
        let store = InMemoryStore::new("criteria").held();
        let mut replace = task::spawn(store.replace(1u32));

        assert_pending!(replace.poll());
        assert_eq!(store.dispatched_count(), 1);
        assert_eq!(store.completed_count(), 0);

        store.release(1);
        assert!(replace.is_woken());
        assert_ready_ok!(replace.poll());
        assert_eq!(store.current(), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_first_replace_finishes_last() {
        let store = std::sync::Arc::new(
            InMemoryStore::new("setup")
                .with_delays([Duration::from_millis(200), Duration::from_millis(10)]),
        );

        let first = tokio::spawn({
            let store = store.clone();
            async move { store.replace("first".to_string()).await }
        });
        tokio::task::yield_now().await;
        let second = tokio::spawn({
            let store = store.clone();
            async move { store.replace("second".to_string()).await }
        });

        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();
        assert_eq!(store.completed(), vec!["second".to_string(), "first".to_string()]);
        assert_eq!(store.current().as_deref(), Some("first"));
    }
}
