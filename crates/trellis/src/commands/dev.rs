//! Development server command.

use anyhow::Result;
use std::path::{Path, PathBuf};

use trellis_server::{DevServer, DevServerConfig};
use trellis_widgets::standard_registry;

use super::build::load_config;

/// Run the dev server.
pub async fn run(config_path: &Path, port: Option<u16>, open: bool) -> Result<()> {
    let file_config = load_config(config_path)?;
    let port = port.unwrap_or(file_config.dev.port);

    tracing::info!("Starting development server on port {}", port);

    let config = DevServerConfig {
        projects_dir: PathBuf::from(&file_config.projects.dir),
        output_dir: PathBuf::from(&file_config.projects.output),
        port,
        open,
        ..Default::default()
    };

    DevServer::new(config, standard_registry()).start().await?;

    Ok(())
}
