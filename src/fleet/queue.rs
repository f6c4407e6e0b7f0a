//! 事件队列（不含锁，由 Reporter 在互斥区内操作）

use std::collections::VecDeque;
use std::sync::Arc;

use crate::event::FleetEvent;
use crate::types::ReportEvent;

/// FIFO 事件队列
///
/// 每条事件入队时分配单调递增的 seq，队列内 seq 严格递增。
#[derive(Debug)]
pub(crate) struct EventQueue {
    events: VecDeque<Arc<FleetEvent>>,
    /// 0 表示不限制
    threshold: usize,
    next_seq: u64,
}

impl EventQueue {
    pub fn new(threshold: usize) -> Self {
        Self {
            events: VecDeque::new(),
            threshold,
            next_seq: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// 追加到队尾；超过阈值时丢弃一条，返回被丢弃的事件
    pub fn push(&mut self, agent_id: String, event: ReportEvent) -> Option<Arc<FleetEvent>> {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push_back(Arc::new(FleetEvent::from_report(agent_id, seq, event)));

        if self.threshold > 0 && self.events.len() > self.threshold {
            return self.evict_one();
        }
        None
    }

    /// 丢弃最早的非 ERROR 事件；全部是 ERROR 时丢弃最早的一条
    fn evict_one(&mut self) -> Option<Arc<FleetEvent>> {
        match self.events.iter().position(|e| !e.is_error()) {
            Some(idx) => self.events.remove(idx),
            None => self.events.pop_front(),
        }
    }

    /// 复制当前队列（共享 Arc，不深拷贝）
    pub fn snapshot(&self) -> Vec<Arc<FleetEvent>> {
        self.events.iter().cloned().collect()
    }

    /// 移除 seq <= `last_seq` 的所有事件，返回移除数量
    ///
    /// 队列按 seq 递增排列，只需从队头弹出。
    pub fn trim_through(&mut self, last_seq: u64) -> usize {
        let mut trimmed = 0;
        while self.events.front().is_some_and(|e| e.seq <= last_seq) {
            self.events.pop_front();
            trimmed += 1;
        }
        trimmed
    }
}
