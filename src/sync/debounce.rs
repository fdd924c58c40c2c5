//! 按键防抖调度器
//!
//! 同一个 key 后提交的任务替换尚未执行的任务；静默 `delay` 之后才执行。
//! `flush` 立即执行该 key 的待定任务（失焦 / change 事件），与计时器状态无关。
//! 已经执行的任务无法取消。

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

type Job = Box<dyn FnOnce() + Send>;

struct Slot {
    generation: u64,
    job: Job,
}

struct Inner<K> {
    slots: Mutex<HashMap<K, Slot>>,
    generations: AtomicU64,
}

/// 防抖调度器，克隆后共享同一组待定任务
pub struct Debouncer<K> {
    delay: Duration,
    inner: Arc<Inner<K>>,
}

impl<K> Clone for Debouncer<K> {
    fn clone(&self) -> Self {
        Self {
            delay: self.delay,
            inner: self.inner.clone(),
        }
    }
}

impl<K> Debouncer<K>
where
    K: Eq + Hash + Clone + Debug + Send + 'static,
{
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            inner: Arc::new(Inner {
                slots: Mutex::new(HashMap::new()),
                generations: AtomicU64::new(0),
            }),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// 提交任务；同 key 的待定任务被替换，计时重新开始
    ///
    /// 必须在 tokio 运行时内调用。
    pub fn schedule(&self, key: K, job: impl FnOnce() + Send + 'static) {
        let generation = self.inner.generations.fetch_add(1, Ordering::Relaxed) + 1;
        // 截止时间在提交时确定，不受计时任务何时被调度影响
        let deadline = Instant::now() + self.delay;

        let replaced = self
            .inner
            .slots
            .lock()
            .insert(
                key.clone(),
                Slot {
                    generation,
                    job: Box::new(job),
                },
            )
            .is_some();
        if replaced {
            debug!("⏳ 防抖任务 {:?} 被新的编辑替换", key);
        }

        let inner = self.inner.clone();
        tokio::spawn(async move {
            sleep_until(deadline).await;
            let job = {
                let mut slots = inner.slots.lock();
                let current = slots.get(&key).map(|slot| slot.generation) == Some(generation);
                if current {
                    slots.remove(&key).map(|slot| slot.job)
                } else {
                    None
                }
            };
            if let Some(job) = job {
                debug!("⏰ 防抖任务 {:?} 到期执行", key);
                job();
            }
        });
    }

    /// 立即执行该 key 的待定任务；没有待定任务时返回 false
    pub fn flush(&self, key: &K) -> bool {
        let slot = self.inner.slots.lock().remove(key);
        match slot {
            Some(slot) => {
                debug!("⚡ 立即执行防抖任务 {:?}", key);
                (slot.job)();
                true
            }
            None => false,
        }
    }

    /// 立即执行全部待定任务，返回执行数量
    pub fn flush_all(&self) -> usize {
        let slots: Vec<(K, Slot)> = self.inner.slots.lock().drain().collect();
        let count = slots.len();
        for (key, slot) in slots {
            debug!("⚡ 立即执行防抖任务 {:?}", key);
            (slot.job)();
        }
        count
    }

    /// 丢弃该 key 的待定任务而不执行
    pub fn cancel(&self, key: &K) -> bool {
        self.inner.slots.lock().remove(key).is_some()
    }

    /// 丢弃全部待定任务，返回丢弃数量
    pub fn cancel_all(&self) -> usize {
        let mut slots = self.inner.slots.lock();
        let count = slots.len();
        slots.clear();
        count
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.inner.slots.lock().contains_key(key)
    }

    pub fn pending_count(&self) -> usize {
        self.inner.slots.lock().len()
    }
}
