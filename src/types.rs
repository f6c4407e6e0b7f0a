//! 事件类型定义
//!
//! 事件类型 / 子类型使用 string 保证向前兼容（未知类型按非 ERROR 处理）。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 已知的事件类型常量
pub mod event_type {
    /// 错误事件（队列满时优先保留）
    pub const ERROR: &str = "ERROR";
    /// 状态变化
    pub const STATE: &str = "STATE";
    /// Action 执行结果
    pub const ACTION_RESULT: &str = "ACTION_RESULT";
}

/// 已知的事件子类型常量
pub mod event_subtype {
    pub const RUNNING: &str = "RUNNING";
    pub const STARTING: &str = "STARTING";
    pub const IN_PROGRESS: &str = "IN_PROGRESS";
    pub const CONFIG: &str = "CONFIG";
    pub const FAILED: &str = "FAILED";
    pub const STOPPING: &str = "STOPPING";
    pub const STOPPED: &str = "STOPPED";
    pub const DATA_DUMP: &str = "DATA_DUMP";
    pub const ACKNOWLEDGED: &str = "ACKNOWLEDGED";
    pub const UNKNOWN: &str = "UNKNOWN";
}

/// 事件负载
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// 生产者上报的事件描述
///
/// agent_id 由 Reporter 在入队时填充，这里不携带。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEvent {
    pub event_type: String,
    pub subtype: String,
    pub time: DateTime<Utc>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
}

impl ReportEvent {
    /// 创建事件，时间取当前时间
    pub fn new(
        event_type: impl Into<String>,
        subtype: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            subtype: subtype.into(),
            time: Utc::now(),
            message: message.into(),
            payload: None,
        }
    }

    /// ERROR 类型事件
    pub fn error(subtype: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(event_type::ERROR, subtype, message)
    }

    /// STATE 类型事件
    pub fn state(subtype: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(event_type::STATE, subtype, message)
    }

    /// ACTION_RESULT 类型事件
    pub fn action_result(subtype: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(event_type::ACTION_RESULT, subtype, message)
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = time;
        self
    }

    /// 是否为 ERROR 类型
    pub fn is_error(&self) -> bool {
        self.event_type == event_type::ERROR
    }
}
