//! Single-threaded render scheduler.
//!
//! The explicit replacement for scheduling a re-render "at the end of the
//! current turn": mutations schedule work, the session flushes once per
//! tick. Duplicate schedules within a tick coalesce, which is the whole
//! debounce contract.

use std::collections::HashSet;

use trellis_engine::NodeId;

/// FIFO queue of nodes awaiting a render, deduplicated per tick.
#[derive(Debug, Default)]
pub struct RenderScheduler {
    queue: Vec<NodeId>,
    queued: HashSet<NodeId>,
}

impl RenderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a render. Returns `false` when one is already pending, so N
    /// rapid changes produce one render.
    pub fn schedule(&mut self, node: NodeId) -> bool {
        if !self.queued.insert(node) {
            return false;
        }
        self.queue.push(node);
        true
    }

    /// Cancel a pending render, e.g. when the adapter is disposed.
    pub fn cancel(&mut self, node: NodeId) {
        if self.queued.remove(&node) {
            self.queue.retain(|n| *n != node);
        }
    }

    /// Whether a render is pending for the node.
    pub fn is_scheduled(&self, node: NodeId) -> bool {
        self.queued.contains(&node)
    }

    /// Drain everything scheduled this tick, in scheduling order.
    pub fn flush(&mut self) -> Vec<NodeId> {
        self.queued.clear();
        std::mem::take(&mut self.queue)
    }

    /// Number of pending renders.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn keys(n: usize) -> Vec<NodeId> {
        let mut map: SlotMap<NodeId, ()> = SlotMap::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    #[test]
    fn duplicate_schedules_coalesce() {
        let ids = keys(1);
        let mut scheduler = RenderScheduler::new();

        assert!(scheduler.schedule(ids[0]));
        assert!(!scheduler.schedule(ids[0]));
        assert!(!scheduler.schedule(ids[0]));

        assert_eq!(scheduler.flush(), vec![ids[0]]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn flush_preserves_scheduling_order_and_resets() {
        let ids = keys(3);
        let mut scheduler = RenderScheduler::new();
        scheduler.schedule(ids[2]);
        scheduler.schedule(ids[0]);
        scheduler.schedule(ids[1]);

        assert_eq!(scheduler.flush(), vec![ids[2], ids[0], ids[1]]);

        // a new tick starts clean
        assert!(scheduler.schedule(ids[2]));
    }

    #[test]
    fn cancel_removes_pending_work() {
        let ids = keys(2);
        let mut scheduler = RenderScheduler::new();
        scheduler.schedule(ids[0]);
        scheduler.schedule(ids[1]);

        scheduler.cancel(ids[0]);

        assert!(!scheduler.is_scheduled(ids[0]));
        assert_eq!(scheduler.flush(), vec![ids[1]]);
    }
}
