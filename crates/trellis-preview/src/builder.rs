//! Static preview builder.
//!
//! Discovers project JSON files, runs each through the round-trip pipeline,
//! and writes out self-contained preview pages.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use walkdir::WalkDir;

use trellis_widgets::WidgetRegistry;

use crate::pipeline::PreviewPipeline;
use crate::templates::{PageContext, TemplateEngine};

/// Configuration for building static previews.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Directory containing project JSON files
    pub projects_dir: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Minify the extracted stylesheets
    pub minify: bool,

    /// Title prefix for generated pages
    pub title: String,

    /// Include the live-reload client script in generated pages
    pub reload: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            projects_dir: PathBuf::from("projects"),
            output_dir: PathBuf::from("dist"),
            minify: true,
            title: "Preview".to_string(),
            reload: false,
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of projects processed
    pub projects: usize,

    /// Number of pages generated
    pub pages: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read projects directory: {0}")]
    ReadError(String),

    #[error("Failed to render project: {path}: {message}")]
    RenderError { path: String, message: String },

    #[error("Failed to render template: {0}")]
    TemplateError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),
}

/// Static preview builder.
pub struct PreviewBuilder<'r> {
    config: BuildConfig,
    registry: &'r WidgetRegistry,
    templates: TemplateEngine,
}

impl<'r> PreviewBuilder<'r> {
    /// Create a new builder against the shared widget registry.
    pub fn new(config: BuildConfig, registry: &'r WidgetRegistry) -> Self {
        Self {
            config,
            registry,
            templates: TemplateEngine::new(),
        }
    }

    /// Build previews for every project file.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let projects = self.discover_projects()?;

        let results: Vec<Result<usize, BuildError>> = projects
            .par_iter()
            .map(|path| self.build_project(path))
            .collect();

        let mut pages = 0;
        for result in results {
            pages += result?;
        }

        let duration = start.elapsed();

        Ok(BuildResult {
            projects: projects.len(),
            pages,
            duration_ms: duration.as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    /// Find all project JSON files under the projects directory.
    fn discover_projects(&self) -> Result<Vec<PathBuf>, BuildError> {
        if !self.config.projects_dir.exists() {
            return Err(BuildError::ReadError(format!(
                "Projects directory not found: {}",
                self.config.projects_dir.display()
            )));
        }

        let mut projects = Vec::new();
        for entry in WalkDir::new(&self.config.projects_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("json") {
                projects.push(path.to_path_buf());
            }
        }
        projects.sort();
        Ok(projects)
    }

    /// Build one project; returns the number of pages written.
    fn build_project(&self, path: &Path) -> Result<usize, BuildError> {
        let json = fs::read_to_string(path).map_err(|e| BuildError::RenderError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let pipeline = PreviewPipeline::new(self.registry);
        let preview = pipeline
            .render_json(&json)
            .map_err(|e| BuildError::RenderError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        let stylesheet = if self.config.minify {
            minify_css(&preview.stylesheet).unwrap_or_else(|e| {
                tracing::warn!("stylesheet minification failed: {e}");
                preview.stylesheet.clone()
            })
        } else {
            preview.stylesheet.clone()
        };

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("project");

        let mut written = 0;
        for (index, page) in preview.pages.iter().enumerate() {
            let body = preview
                .page_html(index, self.registry)
                .unwrap_or_default();
            let html = self
                .templates
                .render_page(&PageContext {
                    title: format!("{} - {}", self.config.title, page.id),
                    stylesheet: stylesheet.clone(),
                    body,
                    reload: self.config.reload,
                })
                .map_err(|e| BuildError::TemplateError(e.to_string()))?;

            let file_name = if index == 0 {
                format!("{stem}.html")
            } else {
                format!("{stem}.{}.html", page.id)
            };
            let out_path = self.config.output_dir.join(file_name);
            fs::write(&out_path, html).map_err(|e| BuildError::WriteError(e.to_string()))?;
            written += 1;
        }

        tracing::info!(
            project = %path.display(),
            pages = written,
            "preview built"
        );
        Ok(written)
    }
}

/// Minify CSS using lightningcss.
fn minify_css(css: &str) -> Result<String, String> {
    use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

    if css.trim().is_empty() {
        return Ok(String::new());
    }

    let stylesheet =
        StyleSheet::parse(css, ParserOptions::default()).map_err(|e| e.to_string())?;

    let minified = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..Default::default()
        })
        .map_err(|e| e.to_string())?;

    Ok(minified.code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use trellis_widgets::standard_registry;

    const PROJECT: &str = r#"{
        "styles": [{ "selectors": [{ "name": "hero" }], "style": { "color": "red" } }],
        "pages": [
            {
                "id": "main",
                "frames": [
                    {
                        "id": "f1",
                        "component": {
                            "type": "wrapper",
                            "components": [
                                { "type": "REACTBUTTON", "attributes": { "variant": "primary" } }
                            ]
                        }
                    }
                ]
            }
        ]
    }"#;

    #[test]
    fn builds_previews_for_discovered_projects() {
        let temp = tempdir().unwrap();
        let projects_dir = temp.path().join("projects");
        fs::create_dir_all(&projects_dir).unwrap();
        fs::write(projects_dir.join("landing.json"), PROJECT).unwrap();

        let registry = standard_registry();
        let config = BuildConfig {
            projects_dir,
            output_dir: temp.path().join("dist"),
            minify: true,
            title: "Docs".to_string(),
            reload: false,
        };

        let result = PreviewBuilder::new(config, &registry).build().unwrap();

        assert_eq!(result.projects, 1);
        assert_eq!(result.pages, 1);

        let html = fs::read_to_string(temp.path().join("dist/landing.html")).unwrap();
        assert!(html.contains("<title>Docs - main</title>"));
        assert!(html.contains("bg-blue-600"));
        // minified stylesheet inlined
        assert!(html.contains(".hero{color:red}"));
    }

    #[test]
    fn missing_projects_directory_is_an_error() {
        let temp = tempdir().unwrap();
        let registry = standard_registry();
        let config = BuildConfig {
            projects_dir: temp.path().join("nope"),
            output_dir: temp.path().join("dist"),
            ..BuildConfig::default()
        };

        assert!(matches!(
            PreviewBuilder::new(config, &registry).build(),
            Err(BuildError::ReadError(_))
        ));
    }

    #[test]
    fn broken_project_reports_its_path() {
        let temp = tempdir().unwrap();
        let projects_dir = temp.path().join("projects");
        fs::create_dir_all(&projects_dir).unwrap();
        fs::write(projects_dir.join("broken.json"), "{ \"pages\": [] }").unwrap();

        let registry = standard_registry();
        let config = BuildConfig {
            projects_dir,
            output_dir: temp.path().join("dist"),
            ..BuildConfig::default()
        };

        let err = PreviewBuilder::new(config, &registry).build().unwrap_err();
        assert!(matches!(err, BuildError::RenderError { path, .. } if path.contains("broken")));
    }
}
