//! Live-render adapter for trellis.
//!
//! Bridges widget document nodes to rendered instances and keeps them in
//! sync as the document changes. Re-renders are coalesced per tick through
//! an explicit single-threaded scheduler, and nested children go through a
//! two-phase render-then-relocate so widgets stay in control of their own
//! markup.

pub mod adapter;
pub mod host;
pub mod scheduler;
pub mod session;

pub use adapter::{AdapterState, LiveAdapter};
pub use host::{HostId, HostKind, HostTree, OffscreenMount};
pub use scheduler::RenderScheduler;
pub use session::LiveSession;
