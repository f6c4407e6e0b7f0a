//! Checkin 循环
//!
//! 周期性地：获取快照 → 上传 → 上传成功后 ack。
//! 上传失败时事件留在队列中，下个周期重试。

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

use crate::config::ReporterConfig;
use crate::error::Result;
use crate::event::FleetEvent;
use crate::fleet::Reporter;

/// 事件上传端（HTTP 客户端等，由调用方实现）
pub trait Uploader: Send + Sync {
    fn upload(&self, events: &[Arc<FleetEvent>]) -> impl Future<Output = Result<()>> + Send;
}

/// Checkin 循环
pub struct CheckinLoop<U> {
    reporter: Arc<Reporter>,
    uploader: U,
    frequency: Duration,
}

impl<U: Uploader> CheckinLoop<U> {
    pub fn new(reporter: Arc<Reporter>, uploader: U, config: &ReporterConfig) -> Self {
        Self {
            reporter,
            uploader,
            frequency: config.reporting_check_frequency,
        }
    }

    pub fn uploader(&self) -> &U {
        &self.uploader
    }

    /// 执行一次 checkin，返回被确认的事件数
    pub async fn checkin_once(&self) -> Result<usize> {
        let (events, ack) = self.reporter.events();
        if events.is_empty() {
            tracing::trace!("📤 Nothing to upload");
            return Ok(0);
        }

        tracing::debug!("📤 Uploading events: count={}", events.len());
        self.uploader.upload(&events).await?;

        Ok(self.reporter.ack(&ack))
    }

    /// 运行直到 shutdown 变为 true（或发送端被丢弃）
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!("📤 Checkin loop started: frequency={:?}", self.frequency);

        let mut ticker = interval(self.frequency);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // 第一次 tick 立即完成，跳过
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.checkin_once().await {
                        Ok(0) => {}
                        Ok(acked) => tracing::debug!("📤 Checkin done: acked={}", acked),
                        Err(e) => tracing::warn!("Checkin failed, events kept for retry: {}", e),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("📤 Checkin loop stopped");
    }
}
