//! The markup round-trip pipeline.
//!
//! Serialized project in, rehydrated widget tree out: headless
//! reconstruction against a scoped off-screen mount, markup/stylesheet
//! extraction, unconditional teardown, then rehydration through the same
//! registry live editing uses.

use trellis_engine::{parse_markup, Engine, EngineError, ProjectData, ProjectError};
use trellis_live::OffscreenMount;
use trellis_widgets::WidgetRegistry;

use crate::rehydrate::{rehydrate, RenderedNode};

/// Result of a pipeline run: one rehydrated tree per page plus the global
/// stylesheet text.
#[derive(Debug)]
pub struct Preview {
    pub pages: Vec<PreviewPage>,

    /// Extracted stylesheet, applied globally to the preview surface
    pub stylesheet: String,
}

/// One rehydrated page.
#[derive(Debug)]
pub struct PreviewPage {
    pub id: String,

    /// Raw markup as extracted from the headless engine
    pub markup: String,

    pub body: Vec<RenderedNode>,
}

impl Preview {
    /// Materialize one page to markup.
    pub fn page_html(&self, index: usize, registry: &WidgetRegistry) -> Option<String> {
        let page = self.pages.get(index)?;
        Some(page.body.iter().map(|n| n.to_html(registry)).collect())
    }
}

/// Errors from the pipeline entry points.
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error("markup extraction failed: {0}")]
    Extraction(#[from] EngineError),
}

/// The round-trip pipeline, bound to the registry shared with live editing.
pub struct PreviewPipeline<'r> {
    registry: &'r WidgetRegistry,
}

struct Extraction {
    pages: Vec<(String, String)>,
    stylesheet: String,
}

impl<'r> PreviewPipeline<'r> {
    pub fn new(registry: &'r WidgetRegistry) -> Self {
        Self { registry }
    }

    /// Run the pipeline on raw project JSON, failing fast on fundamentally
    /// malformed input.
    pub fn render_json(&self, json: &str) -> Result<Preview, PreviewError> {
        let project = ProjectData::from_json(json)?;
        self.render(&project)
    }

    /// Run the pipeline on an already-parsed project.
    pub fn render(&self, project: &ProjectData) -> Result<Preview, PreviewError> {
        let extraction = self.extract(project)?;

        let pages = extraction
            .pages
            .into_iter()
            .map(|(id, markup)| {
                let body = rehydrate(&parse_markup(&markup), self.registry);
                PreviewPage { id, markup, body }
            })
            .collect();

        Ok(Preview {
            pages,
            stylesheet: extraction.stylesheet,
        })
    }

    /// Headless reconstruction and extraction as one scoped critical
    /// section: the engine and its off-screen mount are allocated per
    /// invocation and torn down whether or not extraction succeeded.
    fn extract(&self, project: &ProjectData) -> Result<Extraction, PreviewError> {
        let mount = OffscreenMount::allocate();
        let mut engine = Engine::headless(self.registry);

        let result = (|| -> Result<Extraction, PreviewError> {
            engine.load_project(project)?;

            let mut pages = Vec::with_capacity(engine.page_count());
            for index in 0..engine.page_count() {
                let id = engine
                    .page(index)
                    .map(|p| p.id.clone())
                    .unwrap_or_else(|| index.to_string());
                pages.push((id, engine.render_html(index)?));
            }
            let stylesheet = engine.render_css()?;

            Ok(Extraction { pages, stylesheet })
        })();

        // teardown happens on both paths; each step is best-effort
        engine.destroy();
        drop(mount);

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rehydrate::RenderedNode;
    use pretty_assertions::assert_eq;
    use trellis_widgets::standard_registry;

    const FIXTURE: &str = r##"{
        "assets": [],
        "styles": [
            { "selectors": [{ "name": "hero" }], "style": { "background-color": "#fafafa" } }
        ],
        "pages": [
            {
                "id": "main",
                "type": "main",
                "frames": [
                    {
                        "id": "f1",
                        "component": {
                            "type": "wrapper",
                            "attributes": { "id": "iy6y" },
                            "components": [
                                {
                                    "type": "REACTFLEX",
                                    "attributes": { "direction": "row", "wrap": false, "gap": 4 },
                                    "components": [
                                        { "tagName": "ReactButton", "attributes": { "variant": "primary" } },
                                        { "type": "REACTBUTTON", "attributes": { "variant": "secondary" } }
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
    }"##;

    #[test]
    fn round_trips_the_two_widget_fixture() {
        let registry = standard_registry();
        let pipeline = PreviewPipeline::new(&registry);

        let preview = pipeline.render_json(FIXTURE).unwrap();
        assert_eq!(preview.pages.len(), 1);

        let page = &preview.pages[0];
        assert_eq!(page.id, "main");
        assert!(page.markup.contains("<REACTFLEX"));

        // rehydrated tree: flex at depth 1, both buttons at depth 2
        assert_eq!(page.body.len(), 1);
        let flex = &page.body[0];
        assert_eq!(flex.widget_tag(), Some("ReactFlex"));

        let buttons: Vec<&RenderedNode> = flex
            .children()
            .iter()
            .filter(|c| c.widget_tag().is_some())
            .collect();
        assert_eq!(buttons.len(), 2);

        let variants: Vec<&str> = buttons
            .iter()
            .map(|b| match b {
                RenderedNode::Widget(i) => i.props.str_or("variant", ""),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(variants, vec!["primary", "secondary"]);

        // attribute values survive modulo kind coercion
        let RenderedNode::Widget(flex_instance) = flex else {
            unreachable!()
        };
        assert_eq!(flex_instance.props.num_or("gap", 0.0), 4.0);
        assert!(!flex_instance.props.bool_or("wrap", true));
    }

    #[test]
    fn final_markup_nests_buttons_inside_one_flex_element() {
        let registry = standard_registry();
        let pipeline = PreviewPipeline::new(&registry);

        let preview = pipeline.render_json(FIXTURE).unwrap();
        let html = preview.page_html(0, &registry).unwrap();

        let flex_start = html.find("<div class=\"flex").expect("flex container rendered");
        let first_button = html.find("bg-blue-600").expect("primary button rendered");
        let second_button = html.find("bg-gray-200").expect("secondary button rendered");
        let flex_end = html.rfind("</div>").unwrap();

        assert!(flex_start < first_button);
        assert!(first_button < second_button);
        assert!(second_button < flex_end);
    }

    #[test]
    fn stylesheet_is_extracted_for_the_preview_surface() {
        let registry = standard_registry();
        let pipeline = PreviewPipeline::new(&registry);

        let preview = pipeline.render_json(FIXTURE).unwrap();
        assert_eq!(preview.stylesheet, ".hero {\n  background-color: #fafafa;\n}\n");
    }

    #[test]
    fn malformed_projects_fail_fast_at_the_entry_point() {
        let registry = standard_registry();
        let pipeline = PreviewPipeline::new(&registry);

        assert!(pipeline.render_json("{ \"pages\": [] }").is_err());
        assert!(pipeline.render_json("nonsense").is_err());
    }
}
