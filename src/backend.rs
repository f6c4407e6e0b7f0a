//! 事件 Backend
//!
//! LifecycleReporter 把每条事件分发给所有 Backend。

use crate::config::{LogConfig, LogFormat};
use crate::error::Result;
use crate::types::ReportEvent;

/// 事件接收端
pub trait Backend: Send + Sync {
    /// 接收一条事件
    fn report(&self, event: ReportEvent) -> Result<()>;

    /// 释放资源
    fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// 将事件写入日志
#[derive(Debug, Clone, Default)]
pub struct LogBackend {
    config: LogConfig,
}

impl LogBackend {
    pub fn new(config: LogConfig) -> Self {
        Self { config }
    }

    /// 格式化单条事件
    pub fn format(&self, event: &ReportEvent) -> Result<String> {
        match self.config.format {
            LogFormat::Default => Ok(format!(
                "{} - message: {} - type: '{}' - sub_type: '{}'",
                event.time.to_rfc3339(),
                event.message,
                event.event_type,
                event.subtype
            )),
            LogFormat::Json => Ok(serde_json::to_string(event)?),
        }
    }
}

impl Backend for LogBackend {
    fn report(&self, event: ReportEvent) -> Result<()> {
        let line = self.format(&event)?;
        if event.is_error() {
            tracing::error!("{}", line);
        } else {
            tracing::info!("{}", line);
        }
        Ok(())
    }
}

/// 丢弃所有事件
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBackend;

impl Backend for NoopBackend {
    fn report(&self, _event: ReportEvent) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::event_subtype;

    #[test]
    fn test_default_format() {
        let backend = LogBackend::default();
        let line = backend
            .format(&ReportEvent::state(event_subtype::RUNNING, "app started"))
            .unwrap();
        assert!(line.contains("message: app started"));
        assert!(line.contains("type: 'STATE'"));
        assert!(line.contains("sub_type: 'RUNNING'"));
    }

    #[test]
    fn test_json_format() {
        let backend = LogBackend::new(LogConfig {
            format: LogFormat::Json,
        });
        let event = ReportEvent::error(event_subtype::FAILED, "boom");
        let line = backend.format(&event).unwrap();

        let parsed: ReportEvent = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_backends_accept_events() {
        let event = ReportEvent::state(event_subtype::STOPPED, "bye");
        assert!(LogBackend::default().report(event.clone()).is_ok());
        assert!(NoopBackend.report(event).is_ok());
        assert!(NoopBackend.close().is_ok());
    }
}
