//! 调用节奏控制
//!
//! 同一条记录内，两次生成调用之间等待一段固定时间，避免触发外部接口限流。
//! 这是调度策略而不是正确性要求，所以抽成可替换的协作者，测试中用 [`NoPacing`]。

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

/// 节奏控制器
#[async_trait]
pub trait Pacer: Send + Sync {
    /// 在下一次生成调用之前等待
    async fn wait(&self);
}

/// 固定间隔
#[derive(Debug, Clone, Copy)]
pub struct FixedDelayPacer {
    delay: Duration,
}

impl FixedDelayPacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }
}

#[async_trait]
impl Pacer for FixedDelayPacer {
    async fn wait(&self) {
        if self.delay.is_zero() {
            return;
        }
        debug!("等待 {} 毫秒后继续调用", self.delay.as_millis());
        tokio::time::sleep(self.delay).await;
    }
}

/// 不等待
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacing;

#[async_trait]
impl Pacer for NoPacing {
    async fn wait(&self) {}
}
