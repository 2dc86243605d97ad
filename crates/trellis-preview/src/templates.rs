//! Preview page templating.

use minijinja::{context, Environment};

/// Context for rendering a preview page.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PageContext {
    /// Page title
    pub title: String,

    /// Stylesheet text inlined into the page, so the preview matches the
    /// editor canvas
    pub stylesheet: String,

    /// Rehydrated body markup
    pub body: String,

    /// Whether to include the live-reload client script
    pub reload: bool,
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with the embedded preview template.
    pub fn new() -> Self {
        let mut env = Environment::new();

        env.add_template_owned("preview.html".to_string(), PREVIEW_TEMPLATE.to_string())
            .expect("Failed to add preview template");

        Self { env }
    }

    /// Render a preview page.
    pub fn render_page(&self, ctx: &PageContext) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template("preview.html")?;

        tmpl.render(context! {
            title => &ctx.title,
            stylesheet => &ctx.stylesheet,
            body => &ctx.body,
            reload => ctx.reload,
        })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

const PREVIEW_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ title }}</title>
  {% if stylesheet %}<style>{{ stylesheet | safe }}</style>
  {% endif %}</head>
<body>
  <main class="preview">
    {{ body | safe }}
  </main>
  {% if reload %}<script src="/__reload.js"></script>
  {% endif %}</body>
</html>"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_page_with_inline_stylesheet() {
        let engine = TemplateEngine::new();
        let html = engine
            .render_page(&PageContext {
                title: "Landing".to_string(),
                stylesheet: ".hero { color: red; }".to_string(),
                body: "<div class=\"hero\">hi</div>".to_string(),
                reload: false,
            })
            .unwrap();

        assert!(html.contains("<title>Landing</title>"));
        assert!(html.contains("<style>.hero { color: red; }</style>"));
        assert!(html.contains("<div class=\"hero\">hi</div>"));
        assert!(!html.contains("__reload.js"));
    }

    #[test]
    fn reload_script_is_opt_in() {
        let engine = TemplateEngine::new();
        let html = engine
            .render_page(&PageContext {
                title: "Dev".to_string(),
                stylesheet: String::new(),
                body: String::new(),
                reload: true,
            })
            .unwrap();

        assert!(html.contains("/__reload.js"));
        // empty stylesheet renders no style block
        assert!(!html.contains("<style>"));
    }
}
