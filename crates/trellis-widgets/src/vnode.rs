//! Lightweight element tree produced by widget render functions.
//!
//! Widgets do not write to a live surface directly; they describe their
//! markup as a [`VNode`] and the mounting side (live adapter or preview)
//! materializes it. A widget that hosts nested content marks the spot with
//! [`VNode::children_slot`].

use indexmap::IndexMap;

/// Marker attribute identifying the element nested children are moved into.
pub const CHILDREN_MARKER_ATTR: &str = "data-trellis-children";

/// One node of widget-rendered output.
#[derive(Debug, Clone, PartialEq)]
pub enum VNode {
    Element {
        tag: String,
        /// `None` values are bare attributes (`disabled`, marker attrs)
        attributes: IndexMap<String, Option<String>>,
        children: Vec<VNode>,
    },
    Text(String),
}

impl VNode {
    /// Create an element with no attributes or children.
    pub fn element(tag: &str) -> Self {
        VNode::Element {
            tag: tag.to_string(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Create a text node.
    pub fn text(content: &str) -> Self {
        VNode::Text(content.to_string())
    }

    /// Create the children slot: the element nested content is relocated
    /// into after the widget's own output is mounted.
    pub fn children_slot() -> Self {
        VNode::element("span").with_bare_attr(CHILDREN_MARKER_ATTR)
    }

    /// Add or replace an attribute. No-op on text nodes.
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        if let VNode::Element { attributes, .. } = &mut self {
            attributes.insert(name.to_string(), Some(value.into()));
        }
        self
    }

    /// Add a bare (value-less) attribute. No-op on text nodes.
    pub fn with_bare_attr(mut self, name: &str) -> Self {
        if let VNode::Element { attributes, .. } = &mut self {
            attributes.insert(name.to_string(), None);
        }
        self
    }

    /// Append a child node. No-op on text nodes.
    pub fn with_child(mut self, child: VNode) -> Self {
        if let VNode::Element { children, .. } = &mut self {
            children.push(child);
        }
        self
    }

    /// Whether this node is the children slot marker.
    pub fn is_children_slot(&self) -> bool {
        match self {
            VNode::Element { attributes, .. } => attributes.contains_key(CHILDREN_MARKER_ATTR),
            VNode::Text(_) => false,
        }
    }

    /// Whether the subtree rooted here contains a children slot.
    pub fn has_children_slot(&self) -> bool {
        match self {
            VNode::Element { children, .. } => {
                self.is_children_slot() || children.iter().any(VNode::has_children_slot)
            }
            VNode::Text(_) => false,
        }
    }

    /// Serialize the subtree to markup text.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            VNode::Text(text) => {
                out.push_str(&html_escape::encode_text(text));
            }
            VNode::Element {
                tag,
                attributes,
                children,
            } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    out.push(' ');
                    out.push_str(name);
                    if let Some(value) = value {
                        out.push_str("=\"");
                        out.push_str(&html_escape::encode_double_quoted_attribute(value));
                        out.push('"');
                    }
                }
                out.push('>');
                for child in children {
                    child.write_html(out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}
