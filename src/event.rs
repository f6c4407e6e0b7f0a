//! 上报给 Fleet 的事件
//!
//! 序列化格式即 Uploader 发送的 wire 格式：
//! `{agent_id, type, timestamp, subtype, message, payload?}`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{event_type, Payload, ReportEvent};

/// 队列中的事件（入队后不可变）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetEvent {
    pub agent_id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub subtype: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
    /// 入队序号（单调递增，不参与序列化）
    #[serde(skip)]
    pub(crate) seq: u64,
}

impl FleetEvent {
    pub(crate) fn from_report(agent_id: String, seq: u64, event: ReportEvent) -> Self {
        Self {
            agent_id,
            event_type: event.event_type,
            timestamp: event.time,
            subtype: event.subtype,
            message: event.message,
            payload: event.payload,
            seq,
        }
    }

    /// 入队序号
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// 是否为 ERROR 类型（不会被优先丢弃）
    pub fn is_error(&self) -> bool {
        self.event_type == event_type::ERROR
    }
}

impl std::fmt::Display for FleetEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} #{} {}",
            self.event_type, self.subtype, self.seq, self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::event_subtype;

    #[test]
    fn test_wire_shape() {
        let event = FleetEvent::from_report(
            "agent-1".to_string(),
            7,
            ReportEvent::state(event_subtype::RUNNING, "running"),
        );

        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj["agent_id"], "agent-1");
        assert_eq!(obj["type"], "STATE");
        assert_eq!(obj["subtype"], "RUNNING");
        assert_eq!(obj["message"], "running");
        assert!(obj["timestamp"].is_string());
        // payload 为空时省略，seq 不出现在 wire 上
        assert!(!obj.contains_key("payload"));
        assert!(!obj.contains_key("seq"));
    }

    #[test]
    fn test_payload_serialized_when_present() {
        let mut payload = Payload::new();
        payload.insert("reason".to_string(), serde_json::json!("oom"));
        let event = FleetEvent::from_report(
            "agent-1".to_string(),
            1,
            ReportEvent::error(event_subtype::FAILED, "crashed").with_payload(payload),
        );

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""payload":{"reason":"oom"}"#));
        assert!(event.is_error());
    }
}
