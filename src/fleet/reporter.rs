//! Fleet Reporter
//!
//! 单把互斥锁保护队列和 ack 水位。所有操作都在锁内同步完成，
//! 上传发生在 `events` 与 `ack` 之间，完全在锁外。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use super::queue::EventQueue;
use super::AgentInfo;
use crate::backend::Backend;
use crate::config::ReporterConfig;
use crate::error::Result;
use crate::event::FleetEvent;
use crate::types::ReportEvent;

/// 快照确认凭据
///
/// 由 `Reporter::events` 返回，上传完成后交给 `Reporter::ack`。
/// 同一个 Ack 重复确认无效果；比当前水位旧的 Ack 也无效果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    /// 快照代号（锁内递增，与快照时间同序）
    generation: u64,
    /// 快照时间
    taken_at: DateTime<Utc>,
    /// 快照中事件的 seq
    seqs: Vec<u64>,
}

impl Ack {
    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    pub fn seqs(&self) -> &[u64] {
        &self.seqs
    }

    /// 快照最后一条事件的 seq
    pub fn last_seq(&self) -> Option<u64> {
        self.seqs.last().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.seqs.is_empty()
    }
}

/// 已生效的 ack 水位
#[derive(Debug, Clone, Copy)]
struct AckMark {
    generation: u64,
    taken_at: DateTime<Utc>,
}

#[derive(Debug)]
struct State {
    queue: EventQueue,
    last_ack: Option<AckMark>,
    next_generation: u64,
}

/// Fleet 事件发件箱
pub struct Reporter {
    info: Arc<dyn AgentInfo>,
    threshold: usize,
    state: Mutex<State>,
}

impl Reporter {
    /// 创建 Reporter
    pub fn new(info: Arc<dyn AgentInfo>, config: &ReporterConfig) -> Self {
        tracing::debug!("📮 Fleet reporter created: threshold={}", config.threshold);

        Self {
            info,
            threshold: config.threshold,
            state: Mutex::new(State {
                queue: EventQueue::new(config.threshold),
                last_ack: None,
                next_generation: 1,
            }),
        }
    }

    /// 事件入队
    ///
    /// 超过阈值时丢弃一条（优先丢弃最早的非 ERROR 事件），只记录日志，不返回错误。
    pub fn report(&self, event: ReportEvent) -> Result<()> {
        let agent_id = self.info.agent_id();

        let mut state = self.state.lock();
        if let Some(dropped) = state.queue.push(agent_id, event) {
            tracing::info!(
                "🗑️ Fleet reporter dropped event because threshold[{}] was reached: {}",
                self.threshold,
                dropped
            );
        }

        Ok(())
    }

    /// 获取队列快照和对应的 Ack
    ///
    /// 快照不影响队列；之后的 `report` 也不影响快照。
    pub fn events(&self) -> (Vec<Arc<FleetEvent>>, Ack) {
        let mut state = self.state.lock();

        let snapshot = state.queue.snapshot();
        let generation = state.next_generation;
        state.next_generation += 1;

        let ack = Ack {
            generation,
            taken_at: Utc::now(),
            seqs: snapshot.iter().map(|e| e.seq).collect(),
        };

        (snapshot, ack)
    }

    /// 确认快照已处理，移除快照最后一条及其之前的所有事件
    ///
    /// 返回被移除的事件数量。以下情况无效果（返回 0）：
    /// - Ack 不比当前水位新（重复或过期）
    /// - 队列为空，或快照为空
    pub fn ack(&self, ack: &Ack) -> usize {
        let mut state = self.state.lock();

        if state
            .last_ack
            .is_some_and(|mark| ack.generation <= mark.generation)
        {
            tracing::trace!("📮 Stale ack ignored: generation={}", ack.generation);
            return 0;
        }

        let Some(last_seq) = ack.last_seq() else {
            return 0;
        };
        if state.queue.is_empty() {
            return 0;
        }

        state.last_ack = Some(AckMark {
            generation: ack.generation,
            taken_at: ack.taken_at,
        });
        let trimmed = state.queue.trim_through(last_seq);

        tracing::debug!(
            "📮 Ack applied: generation={}, trimmed={}, remaining={}",
            ack.generation,
            trimmed,
            state.queue.len()
        );
        trimmed
    }

    /// 无后台任务，始终成功
    pub fn close(&self) -> Result<()> {
        Ok(())
    }

    /// 当前队列长度
    pub fn len(&self) -> usize {
        self.state.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().queue.is_empty()
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// 最近一次生效的 ack 的快照时间
    pub fn last_ack(&self) -> Option<DateTime<Utc>> {
        self.state.lock().last_ack.map(|mark| mark.taken_at)
    }
}

impl Backend for Reporter {
    fn report(&self, event: ReportEvent) -> Result<()> {
        Reporter::report(self, event)
    }

    fn close(&self) -> Result<()> {
        Reporter::close(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::StaticAgentInfo;
    use crate::types::event_subtype;

    fn reporter(threshold: usize) -> Reporter {
        Reporter::new(
            Arc::new(StaticAgentInfo::new("agent-test")),
            &ReporterConfig::with_threshold(threshold),
        )
    }

    fn info(msg: &str) -> ReportEvent {
        ReportEvent::state(event_subtype::RUNNING, msg)
    }

    fn error(msg: &str) -> ReportEvent {
        ReportEvent::error(event_subtype::FAILED, msg)
    }

    fn messages(reporter: &Reporter) -> Vec<String> {
        let (events, _) = reporter.events();
        events.iter().map(|e| e.message.clone()).collect()
    }

    #[test]
    fn test_report_stamps_agent_id() {
        let reporter = reporter(0);
        reporter.report(info("e1")).unwrap();

        let (events, ack) = reporter.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].agent_id, "agent-test");
        assert_eq!(events[0].event_type, "STATE");
        assert_eq!(ack.seqs(), &[events[0].seq()]);
    }

    #[test]
    fn test_threshold_scenario() {
        let reporter = reporter(2);
        reporter.report(info("e1")).unwrap();
        reporter.report(error("e2")).unwrap();
        reporter.report(info("e3")).unwrap();
        assert_eq!(messages(&reporter), vec!["e2", "e3"]);

        reporter.report(info("e4")).unwrap();
        assert_eq!(messages(&reporter), vec!["e2", "e4"]);
    }

    #[test]
    fn test_snapshot_is_frozen() {
        let reporter = reporter(0);
        reporter.report(info("e1")).unwrap();

        let (snapshot, _ack) = reporter.events();
        reporter.report(info("e2")).unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(reporter.len(), 2);
    }

    #[test]
    fn test_ack_keeps_events_reported_after_snapshot() {
        let reporter = reporter(3);
        reporter.report(error("e2")).unwrap();
        reporter.report(info("e4")).unwrap();

        let (snapshot, ack) = reporter.events();
        assert_eq!(snapshot.len(), 2);

        reporter.report(info("e5")).unwrap();
        assert_eq!(messages(&reporter), vec!["e2", "e4", "e5"]);

        assert_eq!(reporter.ack(&ack), 2);
        assert_eq!(messages(&reporter), vec!["e5"]);
        assert_eq!(reporter.last_ack(), Some(ack.taken_at()));
    }

    #[test]
    fn test_ack_idempotent() {
        let reporter = reporter(0);
        reporter.report(info("e1")).unwrap();
        let (_, ack) = reporter.events();
        reporter.report(info("e2")).unwrap();

        assert_eq!(reporter.ack(&ack), 1);
        assert_eq!(reporter.ack(&ack), 0);
        assert_eq!(messages(&reporter), vec!["e2"]);
    }

    #[test]
    fn test_stale_ack_ignored() {
        let reporter = reporter(0);
        reporter.report(info("e1")).unwrap();
        let (_, older) = reporter.events();
        reporter.report(info("e2")).unwrap();
        let (_, newer) = reporter.events();
        reporter.report(info("e3")).unwrap();

        assert_eq!(reporter.ack(&newer), 2);
        assert_eq!(reporter.ack(&older), 0);
        assert_eq!(messages(&reporter), vec!["e3"]);
    }

    #[test]
    fn test_empty_ack_does_not_advance_watermark() {
        let reporter = reporter(0);
        let (_, empty) = reporter.events();
        reporter.report(info("e1")).unwrap();
        let (_, ack) = reporter.events();

        assert_eq!(reporter.ack(&empty), 0);
        assert!(reporter.last_ack().is_none());
        assert_eq!(reporter.ack(&ack), 1);
        assert!(reporter.is_empty());
    }

    #[test]
    fn test_ack_after_target_evicted() {
        let reporter = reporter(2);
        reporter.report(error("e1")).unwrap();
        reporter.report(info("e2")).unwrap();
        let (_, ack) = reporter.events();

        // e2 被挤出队列
        reporter.report(error("e3")).unwrap();
        assert_eq!(messages(&reporter), vec!["e1", "e3"]);

        // 按 seq 裁剪：e1 在快照内被移除，e3 在快照之后保留
        assert_eq!(reporter.ack(&ack), 1);
        assert_eq!(messages(&reporter), vec!["e3"]);
    }

    #[test]
    fn test_close_is_noop() {
        let reporter = reporter(0);
        reporter.report(info("e1")).unwrap();
        assert!(reporter.close().is_ok());
        assert!(reporter.close().is_ok());
        assert_eq!(reporter.len(), 1);
    }
}
