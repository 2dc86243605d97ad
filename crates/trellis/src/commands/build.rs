//! Static preview build command.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;

use trellis_preview::{BuildConfig, PreviewBuilder};
use trellis_widgets::standard_registry;

/// Configuration file structure (trellis.toml).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub projects: ProjectsConfig,
    #[serde(default)]
    pub build: BuildSettings,
    #[serde(default)]
    pub dev: DevSettings,
}

#[derive(Debug, Deserialize)]
pub struct ProjectsConfig {
    #[serde(default = "default_projects_dir")]
    pub dir: String,
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for ProjectsConfig {
    fn default() -> Self {
        Self {
            dir: default_projects_dir(),
            output: default_output(),
            title: default_title(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BuildSettings {
    #[serde(default = "default_minify")]
    pub minify: bool,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            minify: default_minify(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DevSettings {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for DevSettings {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

fn default_projects_dir() -> String {
    "projects".to_string()
}
fn default_output() -> String {
    "dist".to_string()
}
fn default_title() -> String {
    "Preview".to_string()
}
fn default_minify() -> bool {
    true
}
fn default_port() -> u16 {
    7700
}

/// Load configuration from the config file if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let config: ConfigFile = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
        tracing::info!("Loaded config from {}", path.display());
        return Ok(config);
    }
    Ok(ConfigFile::default())
}

/// Run the build command.
pub async fn run(config_path: &Path, output: Option<PathBuf>, minify: Option<bool>) -> Result<()> {
    tracing::info!("Building previews...");

    let file_config = load_config(config_path)?;

    let config = BuildConfig {
        projects_dir: PathBuf::from(&file_config.projects.dir),
        output_dir: output.unwrap_or_else(|| PathBuf::from(&file_config.projects.output)),
        minify: minify.unwrap_or(file_config.build.minify),
        title: file_config.projects.title,
        reload: false,
    };

    let registry = standard_registry();
    let result = PreviewBuilder::new(config, &registry).build()?;

    tracing::info!(
        "Built {} pages from {} projects in {}ms",
        result.pages,
        result.projects,
        result.duration_ms
    );

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
