//! 应用生命周期上报
//!
//! 将应用状态变化转换为事件，分发给所有 Backend（Fleet 队列、日志等）。

use std::fmt;
use std::sync::Arc;

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::types::{event_subtype, event_type, ReportEvent};

/// 应用状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    Starting,
    Running,
    /// 失败原因
    Failed(String),
    Stopping,
    Stopped,
    Restarting,
    Updating,
}

impl AppState {
    fn name(&self) -> &'static str {
        match self {
            AppState::Starting => "STARTING",
            AppState::Running => "RUNNING",
            AppState::Failed(_) => "FAILED",
            AppState::Stopping => "STOPPING",
            AppState::Stopped => "STOPPED",
            AppState::Restarting => "RESTARTING",
            AppState::Updating => "UPDATING",
        }
    }

    /// 事件 (type, subtype)
    fn event_kind(&self) -> (&'static str, &'static str) {
        match self {
            AppState::Starting | AppState::Restarting => {
                (event_type::STATE, event_subtype::STARTING)
            }
            AppState::Running => (event_type::STATE, event_subtype::RUNNING),
            AppState::Failed(_) => (event_type::ERROR, event_subtype::FAILED),
            AppState::Stopping => (event_type::STATE, event_subtype::STOPPING),
            AppState::Stopped => (event_type::STATE, event_subtype::STOPPED),
            AppState::Updating => (event_type::STATE, event_subtype::CONFIG),
        }
    }
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 把事件分发给多个 Backend
pub struct LifecycleReporter {
    backends: Vec<Arc<dyn Backend>>,
}

impl LifecycleReporter {
    pub fn new(backends: Vec<Arc<dyn Backend>>) -> Self {
        Self { backends }
    }

    /// Backend 数量
    pub fn backend_count(&self) -> usize {
        self.backends.len()
    }

    /// 应用状态变化
    pub fn on_state_change(&self, app_id: &str, app_name: &str, state: AppState) -> Result<()> {
        let (kind, subtype) = state.event_kind();
        let mut message = format!(
            "Application: {}[{}]: State changed to {}",
            app_id, app_name, state
        );
        if let AppState::Failed(reason) = &state {
            message.push_str(": ");
            message.push_str(reason);
        }

        self.report(ReportEvent::new(kind, subtype, message))
    }

    /// 分发给所有 Backend
    ///
    /// 单个 Backend 失败不影响其他 Backend，全部尝试后返回第一个错误。
    pub fn report(&self, event: ReportEvent) -> Result<()> {
        self.each_backend(|backend| backend.report(event.clone()), "report")
    }

    /// 关闭所有 Backend
    pub fn close(&self) -> Result<()> {
        self.each_backend(|backend| backend.close(), "close")
    }

    fn each_backend<F>(&self, mut op: F, op_name: &str) -> Result<()>
    where
        F: FnMut(&dyn Backend) -> Result<()>,
    {
        let mut first_err: Option<Error> = None;
        for (idx, backend) in self.backends.iter().enumerate() {
            if let Err(e) = op(backend.as_ref()) {
                tracing::warn!("Backend {} failed: backend={}, err={}", op_name, idx, e);
                first_err.get_or_insert(e);
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
