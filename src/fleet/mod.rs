//! Fleet Reporter - 有界事件发件箱
//!
//! 生产者通过 `report` 入队（从不阻塞、从不失败），
//! Checkin 循环通过 `events` 获取快照，上传成功后 `ack` 裁剪队列。

mod queue;
mod reporter;

pub use reporter::{Ack, Reporter};

/// Agent 身份
pub trait AgentInfo: Send + Sync {
    /// Agent ID（入队时写入事件）
    fn agent_id(&self) -> String;
}

/// 固定 ID 的 AgentInfo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticAgentInfo {
    id: String,
}

impl StaticAgentInfo {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// 随机生成 ID（UUID v4）
    pub fn generate() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }
}

impl AgentInfo for StaticAgentInfo {
    fn agent_id(&self) -> String {
        self.id.clone()
    }
}
