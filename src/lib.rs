//! fleet-reporter - Agent 事件发件箱
//!
//! 在 Agent 进程内缓存生命周期事件和错误事件，
//! 由独立的 Checkin 循环周期性上传到 Fleet 管理服务。
//!
//! # 核心功能
//!
//! - **事件入队**: 多个生产者并发上报，从不阻塞、从不失败
//! - **有界队列**: 超过阈值时每次丢弃一条，优先丢弃非 ERROR 事件
//! - **快照 + Ack**: 快照不影响队列，上传成功后 ack 裁剪已上传事件
//! - **生命周期上报**: 应用状态变化分发给多个 Backend
//!
//! # Feature Flags
//!
//! - `checkin`: 周期 Checkin 循环（依赖 tokio 定时器）
//!
//! # 不做的事
//!
//! 不持久化、不保证送达、不阻塞生产者。

pub mod backend;
pub mod config;
pub mod error;
pub mod event;
pub mod fleet;
pub mod lifecycle;
pub mod types;

#[cfg(feature = "checkin")]
pub mod checkin;

// Re-exports
pub use backend::{Backend, LogBackend, NoopBackend};
pub use config::{LogConfig, LogFormat, ReporterConfig};
pub use error::{Error, Result};
pub use event::FleetEvent;
pub use fleet::{Ack, AgentInfo, Reporter, StaticAgentInfo};
pub use lifecycle::{AppState, LifecycleReporter};
pub use types::{event_subtype, event_type, Payload, ReportEvent};

#[cfg(feature = "checkin")]
pub use checkin::{CheckinLoop, Uploader};
