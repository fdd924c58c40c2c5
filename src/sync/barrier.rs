//! 汇合屏障
//!
//! 启动 N 个异步操作，全部报告完成后恰好触发一次完成回调，与完成顺序无关。
//! 参与者数量在创建时固定，先完成的操作不可能在其他参与者登记之前触发回调。

use std::sync::Arc;

use parking_lot::Mutex;

type Completion<T> = Box<dyn FnOnce(Vec<T>) + Send>;

struct BarrierState<T> {
    remaining: usize,
    values: Vec<T>,
    on_complete: Option<Completion<T>>,
}

/// 一个参与者的到达凭证
///
/// 显式调用 `arrive` 携带结果；未调用就被丢弃（例如任务 panic）也算到达，只是不带结果。
pub struct Arrival<T> {
    state: Arc<Mutex<BarrierState<T>>>,
    arrived: bool,
}

/// 创建 `parties` 个参与者的屏障
///
/// `parties == 0` 时立即以空结果触发回调。
pub fn join_barrier<T, F>(parties: usize, on_complete: F) -> Vec<Arrival<T>>
where
    T: Send + 'static,
    F: FnOnce(Vec<T>) + Send + 'static,
{
    if parties == 0 {
        on_complete(Vec::new());
        return Vec::new();
    }

    let state = shared_state(parties, on_complete);
    (0..parties).map(|_| Arrival::new(state.clone())).collect()
}

/// 两个参与者的屏障（联合保存：设置文档 + 判分标准文档）
pub fn join_pair<T, F>(on_complete: F) -> (Arrival<T>, Arrival<T>)
where
    T: Send + 'static,
    F: FnOnce(Vec<T>) + Send + 'static,
{
    let state = shared_state(2, on_complete);
    (Arrival::new(state.clone()), Arrival::new(state))
}

fn shared_state<T, F>(parties: usize, on_complete: F) -> Arc<Mutex<BarrierState<T>>>
where
    T: Send + 'static,
    F: FnOnce(Vec<T>) + Send + 'static,
{
    Arc::new(Mutex::new(BarrierState {
        remaining: parties,
        values: Vec::with_capacity(parties),
        on_complete: Some(Box::new(on_complete)),
    }))
}

impl<T> Arrival<T> {
    fn new(state: Arc<Mutex<BarrierState<T>>>) -> Self {
        Self {
            state,
            arrived: false,
        }
    }

    /// 报告完成并附带结果
    pub fn arrive(mut self, value: T) {
        self.signal(Some(value));
    }

    /// 尚未到达的参与者数量
    pub fn remaining(&self) -> usize {
        self.state.lock().remaining
    }

    fn signal(&mut self, value: Option<T>) {
        if self.arrived {
            return;
        }
        self.arrived = true;

        let fire = {
            let mut state = self.state.lock();
            if let Some(value) = value {
                state.values.push(value);
            }
            state.remaining -= 1;
            if state.remaining == 0 {
                state
                    .on_complete
                    .take()
                    .map(|callback| (callback, std::mem::take(&mut state.values)))
            } else {
                None
            }
        };

        // 回调在锁外执行
        if let Some((callback, values)) = fire {
            callback(values);
        }
    }
}

impl<T> Drop for Arrival<T> {
    fn drop(&mut self) {
        self.signal(None);
    }
}
