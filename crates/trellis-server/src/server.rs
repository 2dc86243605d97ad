//! Development server implementation.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use tokio::sync::RwLock;
use tower_http::services::ServeDir;

use trellis_preview::{BuildConfig, PreviewBuilder};
use trellis_widgets::WidgetRegistry;

use crate::watcher::{FileWatcher, WatchEvent};
use crate::websocket::{reload_client_script, ReloadHub, ReloadMessage};

/// Configuration for the development server.
#[derive(Debug, Clone)]
pub struct DevServerConfig {
    /// Directory containing project JSON files
    pub projects_dir: PathBuf,

    /// Directory the built previews are served from
    pub output_dir: PathBuf,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            projects_dir: PathBuf::from("projects"),
            output_dir: PathBuf::from("dist"),
            port: 7700,
            host: "127.0.0.1".to_string(),
            open: true,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),

    #[error("Build error: {0}")]
    BuildError(String),
}

/// Shared server state.
struct ServerState {
    config: DevServerConfig,
    hub: ReloadHub,
    registry: WidgetRegistry,
}

impl ServerState {
    fn build_config(&self) -> BuildConfig {
        BuildConfig {
            projects_dir: self.config.projects_dir.clone(),
            output_dir: self.config.output_dir.clone(),
            minify: false,
            title: "Preview".to_string(),
            reload: true,
        }
    }
}

/// Development server.
pub struct DevServer {
    config: DevServerConfig,
    registry: WidgetRegistry,
}

impl DevServer {
    /// Create a new development server over the given widget registry.
    pub fn new(config: DevServerConfig, registry: WidgetRegistry) -> Self {
        Self { config, registry }
    }

    /// Start the development server.
    pub async fn start(self) -> Result<(), ServerError> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|e| {
                ServerError::BindError(
                    SocketAddr::from(([127, 0, 0, 1], self.config.port)),
                    format!("invalid address: {e}"),
                )
            })?;

        let output_dir = self.config.output_dir.clone();
        let state = Arc::new(RwLock::new(ServerState {
            config: self.config.clone(),
            hub: ReloadHub::new(),
            registry: self.registry,
        }));

        // Initial build so there is something to serve
        rebuild(&state).await;

        // Set up file watcher
        let watch_paths = vec![self.config.projects_dir.clone()];
        let (watcher, mut rx) =
            FileWatcher::new(&watch_paths).map_err(|e| ServerError::WatchError(e.to_string()))?;

        // Spawn file watch handler
        let state_clone = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                handle_watch_event(&state_clone, event).await;
            }
            // Keep watcher alive
            drop(watcher);
        });

        // Build router
        let app = Router::new()
            .route("/__reload", get(ws_handler))
            .route("/__reload.js", get(reload_script_handler))
            .fallback_service(ServeDir::new(&output_dir))
            .with_state(state);

        tracing::info!("Starting dev server at http://{}", addr);

        if self.config.open {
            let url = format!("http://{}", addr);
            let _ = open::that(&url);
        }

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

/// Rebuild the previews and tell clients what happened.
async fn rebuild(state: &Arc<RwLock<ServerState>>) {
    let state = state.read().await;
    let builder = PreviewBuilder::new(state.build_config(), &state.registry);

    match builder.build() {
        Ok(result) => {
            tracing::info!(
                projects = result.projects,
                pages = result.pages,
                duration_ms = result.duration_ms,
                "previews rebuilt"
            );
            state.hub.send(ReloadMessage::Reload);
        }
        Err(e) => {
            tracing::warn!("preview rebuild failed: {e}");
            state.hub.send(ReloadMessage::BuildFailed {
                message: e.to_string(),
            });
        }
    }
}

/// Handle file watch events.
async fn handle_watch_event(state: &Arc<RwLock<ServerState>>, event: WatchEvent) {
    match event {
        WatchEvent::ProjectModified(path) => {
            tracing::info!("Project modified: {}", path.display());
            rebuild(state).await;
        }
        WatchEvent::Created(path) | WatchEvent::Deleted(path) => {
            tracing::info!("Project set changed: {}", path.display());
            rebuild(state).await;
        }
        WatchEvent::Modified(_) => {
            // not a project file; nothing to rebuild
        }
    }
}

/// Handler for the reload WebSocket endpoint.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<RwLock<ServerState>>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Handle a WebSocket connection.
async fn handle_ws(mut socket: WebSocket, state: Arc<RwLock<ServerState>>) {
    let mut rx = {
        let state = state.read().await;
        state.hub.subscribe()
    };

    let Ok(msg) = serde_json::to_string(&ReloadMessage::Connected) else {
        return;
    };
    if socket.send(Message::Text(msg.into())).await.is_err() {
        return;
    }

    while let Ok(reload_msg) = rx.recv().await {
        let Ok(json) = serde_json::to_string(&reload_msg) else {
            continue;
        };
        if socket.send(Message::Text(json.into())).await.is_err() {
            break;
        }
    }
}

/// Handler for the reload client script.
async fn reload_script_handler(
    State(state): State<Arc<RwLock<ServerState>>>,
) -> impl IntoResponse {
    let state = state.read().await;
    let ws_url = format!(
        "ws://{}:{}/__reload",
        state.config.host, state.config.port
    );
    let script = reload_client_script(&ws_url);
    ([("content-type", "application/javascript")], script)
}
