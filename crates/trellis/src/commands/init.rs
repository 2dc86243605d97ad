//! Initialize a projects directory in the current folder.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub async fn run(yes: bool) -> Result<()> {
    tracing::info!("Initializing trellis...");

    let projects_dir = Path::new("projects");

    if projects_dir.exists() {
        if !yes {
            tracing::warn!("projects/ directory already exists. Use --yes to overwrite.");
            return Ok(());
        }
    } else {
        fs::create_dir_all(projects_dir).context("Failed to create projects directory")?;
    }

    // Create default config
    let config_path = Path::new("trellis.toml");
    if !config_path.exists() || yes {
        fs::write(config_path, DEFAULT_CONFIG).context("Failed to write trellis.toml")?;
        tracing::info!("Created trellis.toml");
    }

    // Create sample project
    let sample_path = projects_dir.join("landing.json");
    if !sample_path.exists() || yes {
        fs::write(&sample_path, SAMPLE_PROJECT).context("Failed to write landing.json")?;
        tracing::info!("Created projects/landing.json");
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'trellis build' to generate previews, or 'trellis dev' to watch.");

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# Trellis Configuration

[projects]
# Directory containing exported project JSON files
dir = "projects"

# Output directory for built previews
output = "dist"

# Title prefix for generated pages
title = "Preview"

[build]
# Enable stylesheet minification
minify = true

[dev]
# Development server port
port = 7700
"#;

const SAMPLE_PROJECT: &str = r##"{
  "assets": [],
  "styles": [
    {
      "selectors": [{ "name": "hero" }],
      "style": { "background-color": "#f8fafc", "padding": "2rem" }
    }
  ],
  "pages": [
    {
      "id": "landing",
      "type": "main",
      "frames": [
        {
          "id": "frame-1",
          "component": {
            "type": "wrapper",
            "attributes": { "id": "root" },
            "components": [
              {
                "type": "REACTFLEX",
                "attributes": {
                  "direction": "row",
                  "wrap": false,
                  "justify": "start",
                  "items": "start",
                  "gap": 4
                },
                "components": [
                  {
                    "tagName": "ReactButton",
                    "attributes": { "variant": "primary", "size": "medium" }
                  },
                  {
                    "tagName": "ReactButton",
                    "attributes": { "variant": "secondary", "size": "medium" }
                  }
                ]
              }
            ]
          }
        }
      ]
    }
  ],
  "symbols": [],
  "dataSources": []
}
"##;
