//! 合成进度指示器
//!
//! 固定间隔加固定步长、封顶在 100 以下的纯装饰性进度值，
//! 和后端真实进度没有任何关系（后端不提供进度通道）
//!
//! 约定：
//! - 只有响应成功返回后才会到 100
//! - 失败时停在当前值，不自动归零
//! - 成功和失败两条路径都必须停掉计时任务，不许泄漏

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

/// 合成进度计时器
pub struct ProgressTicker {
    value: Arc<AtomicU8>,
    handle: JoinHandle<()>,
}

impl ProgressTicker {
    /// 启动计时任务
    ///
    /// # 参数
    /// - `step`: 每次递增的百分比
    /// - `interval`: 递增间隔
    /// - `cap`: 封顶值（必须小于 100）
    pub fn start(step: u8, interval: Duration, cap: u8) -> Self {
        let cap = cap.min(99);
        let value = Arc::new(AtomicU8::new(0));
        let ticking = value.clone();

        let handle = tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            // interval 的第一次 tick 立即返回，先吞掉
            timer.tick().await;
            loop {
                timer.tick().await;
                let _ = ticking.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                    Some(current.saturating_add(step).min(cap))
                });
            }
        });

        Self { value, handle }
    }

    /// 当前进度值
    pub fn percent(&self) -> u8 {
        self.value.load(Ordering::SeqCst)
    }

    /// 成功收尾：停掉计时任务并把进度置为 100
    pub fn finish(self) -> u8 {
        self.handle.abort();
        self.value.store(100, Ordering::SeqCst);
        100
    }

    /// 失败收尾：停掉计时任务，进度停在当前值
    pub fn halt(self) -> u8 {
        self.handle.abort();
        self.value.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ticker_caps_below_100() {
        let ticker = ProgressTicker::start(20, Duration::from_millis(10), 90);
        // 足够多个间隔之后必然停在封顶值
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(ticker.percent(), 90);
        assert_eq!(ticker.finish(), 100);
    }

    #[tokio::test]
    async fn test_halt_freezes_current_value() {
        let ticker = ProgressTicker::start(10, Duration::from_millis(10), 90);
        tokio::time::sleep(Duration::from_millis(300)).await;
        let frozen = ticker.halt();
        // 失败收尾停在当前值（这里已到封顶），不会自动归零也不会到 100
        assert_eq!(frozen, 90);
    }

    #[tokio::test]
    async fn test_finish_stops_ticking() {
        let ticker = ProgressTicker::start(10, Duration::from_millis(10), 90);
        let value = ticker.value.clone();
        assert_eq!(ticker.finish(), 100);
        // 任务停掉后值不再变化
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(value.load(Ordering::SeqCst), 100);
    }
}
