//! Per-node adapter state.
//!
//! One adapter exists per widget document node, owning that node's rendered
//! instance (its mount element) and its off-screen holder. The render
//! procedure itself lives on the session, which has the document and the
//! registry in scope; the adapter tracks the state machine.

use crate::host::{HostId, HostTree};
use crate::scheduler::RenderScheduler;
use trellis_engine::NodeId;

/// Lifecycle of a live adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    /// Created, nothing rendered yet
    Uninitialized,
    /// Listening for changes and (re)rendering
    Rendering,
    /// Detached; ignores all further events
    Disposed,
}

/// Live adapter attached to one widget document node.
#[derive(Debug)]
pub struct LiveAdapter {
    pub(crate) node: NodeId,
    pub(crate) state: AdapterState,
    /// Container element the rendered instance mounts into
    pub(crate) element: HostId,
    /// Off-screen holder for the two-phase child relocation; allocated on
    /// first use, owned exclusively by this adapter
    pub(crate) holder: Option<HostId>,
    pub(crate) render_count: u64,
}

impl LiveAdapter {
    /// Attach a new adapter for `node`, creating its (detached) container
    /// element.
    pub fn attach(node: NodeId, host: &mut HostTree) -> Self {
        Self {
            node,
            state: AdapterState::Uninitialized,
            element: host.create_element("div"),
            holder: None,
            render_count: 0,
        }
    }

    /// The document node this adapter serves.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Current lifecycle state.
    pub fn state(&self) -> AdapterState {
        self.state
    }

    /// Mount element of the rendered instance.
    pub fn element(&self) -> HostId {
        self.element
    }

    /// Renders performed so far.
    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    pub fn is_disposed(&self) -> bool {
        self.state == AdapterState::Disposed
    }

    /// The off-screen holder, created hidden on first use.
    pub(crate) fn holder(&mut self, host: &mut HostTree) -> HostId {
        match self.holder {
            Some(holder) if host.contains(holder) => holder,
            _ => {
                let holder = host.create_element("div");
                host.set_attribute(holder, "style", Some("display: none".to_string()));
                self.holder = Some(holder);
                holder
            }
        }
    }

    pub(crate) fn record_render(&mut self) {
        self.state = AdapterState::Rendering;
        self.render_count += 1;
    }

    /// Dispose the adapter: cancel pending work, unmount the rendered
    /// instance, release the holder. Safe to call when parts of the subtree
    /// are already gone; each step is best-effort.
    pub fn dispose(&mut self, host: &mut HostTree, scheduler: &mut RenderScheduler) {
        if self.state == AdapterState::Disposed {
            return;
        }
        scheduler.cancel(self.node);
        host.remove_subtree(self.element);
        if let Some(holder) = self.holder.take() {
            host.remove_subtree(holder);
        }
        self.state = AdapterState::Disposed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn node_id() -> NodeId {
        let mut map: SlotMap<NodeId, ()> = SlotMap::with_key();
        map.insert(())
    }

    #[test]
    fn dispose_cancels_pending_render_and_releases_resources() {
        let mut host = HostTree::new();
        let mut scheduler = RenderScheduler::new();
        let node = node_id();

        let mut adapter = LiveAdapter::attach(node, &mut host);
        let element = adapter.element();
        let holder = adapter.holder(&mut host);
        scheduler.schedule(node);

        adapter.dispose(&mut host, &mut scheduler);

        assert!(adapter.is_disposed());
        assert!(!scheduler.is_scheduled(node));
        assert!(scheduler.flush().is_empty());
        assert!(!host.contains(element));
        assert!(!host.contains(holder));
    }

    #[test]
    fn dispose_is_idempotent() {
        let mut host = HostTree::new();
        let mut scheduler = RenderScheduler::new();

        let mut adapter = LiveAdapter::attach(node_id(), &mut host);
        adapter.dispose(&mut host, &mut scheduler);
        adapter.dispose(&mut host, &mut scheduler);

        assert!(adapter.is_disposed());
    }

    #[test]
    fn holder_is_created_once_and_hidden() {
        let mut host = HostTree::new();
        let mut adapter = LiveAdapter::attach(node_id(), &mut host);

        let first = adapter.holder(&mut host);
        let second = adapter.holder(&mut host);

        assert_eq!(first, second);
        assert_eq!(
            host.attribute(first, "style"),
            Some(&Some("display: none".to_string()))
        );
    }
}
