//! Headless engine facade.
//!
//! Reconstructs a project's documents in memory and renders the markup and
//! stylesheet text back out. One engine instance serves one load/extract
//! sequence; concurrent pipeline runs each build their own.

use trellis_widgets::{MarkupAttr, WidgetRegistry};

use crate::document::{Document, NodeId};
use crate::project::{ProjectData, ProjectError, StyleRule};
use crate::style::render_css;

/// Engine construction options.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Headless engines build no live views and keep no persistence.
    pub headless: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self { headless: true }
    }
}

/// One loaded page: its id and the document of its first frame.
#[derive(Debug)]
pub struct EnginePage {
    pub id: String,
    pub document: Document,
}

/// Errors from engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("page index {0} out of range")]
    PageOutOfRange(usize),

    #[error("engine instance already destroyed")]
    Destroyed,
}

/// A headless builder engine bound to a widget registry.
pub struct Engine<'r> {
    registry: &'r WidgetRegistry,
    options: EngineOptions,
    styles: Vec<StyleRule>,
    pages: Vec<EnginePage>,
    destroyed: bool,
}

impl<'r> Engine<'r> {
    /// Create an engine with explicit options.
    pub fn new(registry: &'r WidgetRegistry, options: EngineOptions) -> Self {
        Self {
            registry,
            options,
            styles: Vec::new(),
            pages: Vec::new(),
            destroyed: false,
        }
    }

    /// Create a headless engine, the mode the preview pipeline uses.
    pub fn headless(registry: &'r WidgetRegistry) -> Self {
        Self::new(registry, EngineOptions::default())
    }

    /// Whether the engine was created headless.
    pub fn is_headless(&self) -> bool {
        self.options.headless
    }

    /// The registry this engine resolves widget types against.
    pub fn registry(&self) -> &'r WidgetRegistry {
        self.registry
    }

    /// Load a serialized project, replacing any previously loaded state.
    ///
    /// Each page contributes the document of its first frame; extra frames
    /// are tolerated and ignored.
    pub fn load_project(&mut self, project: &ProjectData) -> Result<(), ProjectError> {
        project.validate()?;

        self.styles = project.styles.clone();
        self.pages = project
            .pages
            .iter()
            .map(|page| {
                let frame = &page.frames[0];
                EnginePage {
                    id: page.id.clone(),
                    document: Document::from_component(&frame.component, self.registry),
                }
            })
            .collect();

        tracing::debug!(pages = self.pages.len(), "project loaded");
        Ok(())
    }

    /// Number of loaded pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// A loaded page by index.
    pub fn page(&self, index: usize) -> Option<&EnginePage> {
        self.pages.get(index)
    }

    /// Mutable access to a page's document.
    pub fn document_mut(&mut self, index: usize) -> Option<&mut Document> {
        self.pages.get_mut(index).map(|p| &mut p.document)
    }

    /// Generate the markup of one page.
    ///
    /// The wrapper root itself is not emitted; its children are serialized in
    /// document order, with widget nodes exported under their identity tag.
    pub fn render_html(&self, index: usize) -> Result<String, EngineError> {
        if self.destroyed {
            return Err(EngineError::Destroyed);
        }
        let page = self
            .pages
            .get(index)
            .ok_or(EngineError::PageOutOfRange(index))?;

        let doc = &page.document;
        let mut out = String::new();
        for child in doc.children(doc.root()) {
            write_node(doc, *child, &mut out);
        }
        Ok(out)
    }

    /// Generate the stylesheet text for the loaded project.
    pub fn render_css(&self) -> Result<String, EngineError> {
        if self.destroyed {
            return Err(EngineError::Destroyed);
        }
        Ok(render_css(&self.styles))
    }

    /// Export the loaded state back to the serialized project form.
    pub fn project_data(&self) -> ProjectData {
        let mut project = ProjectData::default();
        project.styles = self.styles.clone();
        project.pages = self
            .pages
            .iter()
            .map(|page| crate::project::PageData {
                id: page.id.clone(),
                kind: None,
                frames: vec![crate::project::FrameData {
                    id: format!("{}-frame", page.id),
                    component: page
                        .document
                        .to_component(page.document.root())
                        .unwrap_or_default(),
                }],
            })
            .collect();
        project
    }

    /// Dispose the engine. Idempotent; later extraction calls fail with
    /// [`EngineError::Destroyed`].
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.pages.clear();
        self.styles.clear();
        self.destroyed = true;
        tracing::debug!("engine destroyed");
    }
}

fn write_node(doc: &Document, id: NodeId, out: &mut String) {
    let Some(node) = doc.get(id) else {
        return;
    };

    if let Some(text) = &node.text {
        out.push_str(&html_escape::encode_text(text));
        return;
    }

    out.push('<');
    out.push_str(&node.tag);

    let mut class_attr = node.classes.join(" ");

    for (name, value) in &node.attributes {
        if name == "class" {
            let value = value.to_attr_string();
            if !class_attr.is_empty() {
                class_attr.push(' ');
            }
            class_attr.push_str(&value);
            continue;
        }
        match value.to_markup_attr() {
            MarkupAttr::Value(v) => {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&html_escape::encode_double_quoted_attribute(&v));
                out.push('"');
            }
            MarkupAttr::Bare => {
                out.push(' ');
                out.push_str(name);
            }
            MarkupAttr::Omitted => {}
        }
    }

    if !class_attr.is_empty() {
        out.push_str(" class=\"");
        out.push_str(&html_escape::encode_double_quoted_attribute(&class_attr));
        out.push('"');
    }

    out.push('>');
    for child in doc.children(id) {
        write_node(doc, *child, out);
    }
    out.push_str("</");
    out.push_str(&node.tag);
    out.push('>');
}
