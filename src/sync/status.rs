//! "保存中"状态信号
//!
//! 以进行中的操作计数为准：任意一个保存未完成时为 true。
//! 宿主调用永不返回时信号会一直保持 true（已知限制）。

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::debug;

struct Inner {
    in_flight: Mutex<usize>,
    sender: watch::Sender<bool>,
}

#[derive(Clone)]
pub struct SavingStatus {
    inner: Arc<Inner>,
}

/// 一个进行中的保存；丢弃时计数减一
pub struct SavingGuard {
    inner: Arc<Inner>,
}

impl SavingStatus {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                in_flight: Mutex::new(0),
                sender,
            }),
        }
    }

    /// 开始一次保存
    pub fn begin(&self) -> SavingGuard {
        let mut in_flight = self.inner.in_flight.lock();
        *in_flight += 1;
        if *in_flight == 1 {
            debug!("💾 保存中...");
            self.inner.sender.send_replace(true);
        }
        drop(in_flight);
        SavingGuard {
            inner: self.inner.clone(),
        }
    }

    pub fn is_saving(&self) -> bool {
        *self.inner.in_flight.lock() > 0
    }

    pub fn in_flight(&self) -> usize {
        *self.inner.in_flight.lock()
    }

    /// 订阅状态变化（视图层使用）
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.sender.subscribe()
    }
}

impl Default for SavingStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SavingGuard {
    fn drop(&mut self) {
        // 计数与信号在同一把锁内更新
        let mut in_flight = self.inner.in_flight.lock();
        *in_flight -= 1;
        if *in_flight == 0 {
            debug!("✓ 保存完成");
            self.inner.sender.send_replace(false);
        }
    }
}
