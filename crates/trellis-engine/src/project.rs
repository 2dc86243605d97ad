//! Serialized project format.
//!
//! The JSON document the builder exports and the preview pipeline consumes:
//! pages of frames, each frame holding one component tree, plus global style
//! rules and asset lists. Parsing is permissive everywhere except the page
//! structure itself, which is validated up front.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use trellis_widgets::PropValue;

/// A complete serialized project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectData {
    pub assets: Vec<Value>,
    pub styles: Vec<StyleRule>,
    pub pages: Vec<PageData>,
    pub symbols: Vec<Value>,
    #[serde(rename = "dataSources")]
    pub data_sources: Vec<Value>,
}

/// One page of a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageData {
    pub id: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub frames: Vec<FrameData>,
}

/// One frame of a page, holding the root of a component tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameData {
    pub id: String,
    pub component: ComponentData,
}

/// A serialized document node.
///
/// Widget identity drifts between two conventions across document versions:
/// some nodes carry it in `tagName`, some in `type`. [`ComponentData::identity`]
/// is the one place that resolves the drift; nothing else may guess.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentData {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(rename = "tagName", skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, Value>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ComponentData>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<ClassEntry>,

    /// Initial markup content, parsed into children on load when no explicit
    /// child components are present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Structural hints and version-specific fields we carry through verbatim
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl ComponentData {
    /// Resolve the node's widget identity: `tagName` first, `type` as the
    /// fallback. Callers match the result case-insensitively.
    pub fn identity(&self) -> Option<&str> {
        self.tag_name.as_deref().or(self.kind.as_deref())
    }

    /// Attribute values narrowed to the scalar kinds the option schema
    /// understands; non-scalar attributes are skipped with a debug note.
    pub fn scalar_attributes(&self) -> IndexMap<String, PropValue> {
        let mut out = IndexMap::new();
        for (name, value) in &self.attributes {
            match prop_from_json(value) {
                Some(prop) => {
                    out.insert(name.clone(), prop);
                }
                None => {
                    tracing::debug!(attribute = %name, "skipping non-scalar attribute value");
                }
            }
        }
        out
    }
}

/// Convert a JSON scalar into a prop value.
pub fn prop_from_json(value: &Value) -> Option<PropValue> {
    match value {
        Value::String(s) => Some(PropValue::Str(s.clone())),
        Value::Bool(b) => Some(PropValue::Bool(*b)),
        Value::Number(n) => n.as_f64().map(PropValue::Num),
        _ => None,
    }
}

/// Convert a prop value back to project JSON.
pub fn prop_to_json(value: &PropValue) -> Value {
    match value {
        PropValue::Str(s) => Value::String(s.clone()),
        PropValue::Bool(b) => Value::Bool(*b),
        PropValue::Num(n) => serde_json::Number::from_f64(*n)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(n.to_string())),
    }
}

/// A CSS class attached to a node: either a bare name or the detailed form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassEntry {
    Name(String),
    Detailed {
        name: String,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        private: bool,
    },
}

impl ClassEntry {
    pub fn name(&self) -> &str {
        match self {
            ClassEntry::Name(name) => name,
            ClassEntry::Detailed { name, .. } => name,
        }
    }
}

/// A global style rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleRule {
    pub selectors: Vec<SelectorEntry>,

    pub style: IndexMap<String, String>,

    /// Pseudo state (`hover`, `active`, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(rename = "mediaText", skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
}

/// A selector: a raw selector string used verbatim, or a class object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectorEntry {
    Raw(String),
    Class { name: String },
}

/// Errors raised at the project entry point.
///
/// Only fundamentally malformed input fails here; everything downstream
/// degrades permissively.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("invalid project JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("project has no pages")]
    NoPages,

    #[error("page \"{0}\" has no frames")]
    EmptyPage(String),
}

impl ProjectData {
    /// Parse and validate a serialized project.
    pub fn from_json(json: &str) -> Result<Self, ProjectError> {
        let project: ProjectData = serde_json::from_str(json)?;
        project.validate()?;
        Ok(project)
    }

    /// Serialize back to JSON.
    pub fn to_json(&self) -> Result<String, ProjectError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the page/frame structure the rest of the pipeline relies on.
    pub fn validate(&self) -> Result<(), ProjectError> {
        if self.pages.is_empty() {
            return Err(ProjectError::NoPages);
        }
        for page in &self.pages {
            if page.frames.is_empty() {
                return Err(ProjectError::EmptyPage(page.id.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TWO_WIDGET_PROJECT: &str = r##"{
        "assets": [],
        "styles": [
            { "selectors": [{ "name": "hero" }], "style": { "background-color": "#fff" } }
        ],
        "pages": [
            {
                "id": "page-1",
                "type": "main",
                "frames": [
                    {
                        "id": "frame-1",
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
    fn parses_a_full_project() {
        let project = ProjectData::from_json(TWO_WIDGET_PROJECT).unwrap();

        assert_eq!(project.pages.len(), 1);
        assert_eq!(project.styles.len(), 1);

        let root = &project.pages[0].frames[0].component;
        assert_eq!(root.identity(), Some("wrapper"));
        assert_eq!(root.components.len(), 1);

        let flex = &root.components[0];
        assert_eq!(flex.identity(), Some("REACTFLEX"));
        assert_eq!(flex.components.len(), 2);
    }

    #[test]
    fn tag_name_wins_over_type_for_identity() {
        let node: ComponentData = serde_json::from_str(
            r#"{ "type": "default", "tagName": "ReactButton" }"#,
        )
        .unwrap();
        assert_eq!(node.identity(), Some("ReactButton"));

        let node: ComponentData = serde_json::from_str(r#"{ "type": "REACTBUTTON" }"#).unwrap();
        assert_eq!(node.identity(), Some("REACTBUTTON"));
    }

    #[test]
    fn scalar_attributes_keep_kinds_and_skip_composites() {
        let node: ComponentData = serde_json::from_str(
            r#"{ "attributes": { "variant": "primary", "wrap": false, "gap": 4, "meta": {"x": 1} } }"#,
        )
        .unwrap();

        let attrs = node.scalar_attributes();
        assert_eq!(attrs.get("variant"), Some(&PropValue::Str("primary".into())));
        assert_eq!(attrs.get("wrap"), Some(&PropValue::Bool(false)));
        assert_eq!(attrs.get("gap"), Some(&PropValue::Num(4.0)));
        assert!(attrs.get("meta").is_none());
    }

    #[test]
    fn rejects_projects_without_pages_or_frames() {
        let err = ProjectData::from_json(r#"{ "pages": [] }"#).unwrap_err();
        assert!(matches!(err, ProjectError::NoPages));

        let err = ProjectData::from_json(r#"{ "pages": [{ "id": "p", "frames": [] }] }"#)
            .unwrap_err();
        assert!(matches!(err, ProjectError::EmptyPage(id) if id == "p"));
    }

    #[test]
    fn rejects_non_object_input() {
        assert!(ProjectData::from_json("[1, 2, 3]").is_err());
        assert!(ProjectData::from_json("not json").is_err());
    }
}
