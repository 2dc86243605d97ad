//! Development server with live reload for trellis previews.
//!
//! Serves the built preview directory, watches project files, and pushes
//! reload messages to connected clients over WebSocket after each rebuild.

pub mod server;
pub mod watcher;
pub mod websocket;

pub use server::{DevServer, DevServerConfig, ServerError};
pub use watcher::{FileWatcher, WatchEvent};
pub use websocket::{reload_client_script, ReloadHub, ReloadMessage};
