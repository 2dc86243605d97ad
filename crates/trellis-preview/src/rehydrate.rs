//! Rehydration: turning extracted markup back into live widget instances.
//!
//! Every element whose tag resolves in the registry becomes a widget
//! instance with its props reconstructed from the serialized attributes;
//! everything else is kept as plain structure, with children processed
//! recursively either way so recognized widgets are found at any depth.

use indexmap::IndexMap;

use trellis_engine::MarkupNode;
use trellis_widgets::{OptionKind, PropValue, ResolvedProps, VNode, WidgetRegistry};

/// A node of the rehydrated preview tree.
#[derive(Debug, Clone)]
pub enum RenderedNode {
    /// A reconstructed widget instance
    Widget(RenderedInstance),

    /// Unrecognized markup kept as plain structure
    Element {
        tag: String,
        attributes: IndexMap<String, Option<String>>,
        children: Vec<RenderedNode>,
    },

    /// Text content
    Text(String),
}

/// A live widget instance reconstructed from markup.
#[derive(Debug, Clone)]
pub struct RenderedInstance {
    /// Canonical descriptor tag (as registered, not as it appeared in markup)
    pub widget: String,

    pub props: ResolvedProps,

    pub children: Vec<RenderedNode>,
}

impl RenderedNode {
    /// Widget tag if this node is a reconstructed instance.
    pub fn widget_tag(&self) -> Option<&str> {
        match self {
            RenderedNode::Widget(instance) => Some(&instance.widget),
            _ => None,
        }
    }

    /// Children of this node, whatever its kind.
    pub fn children(&self) -> &[RenderedNode] {
        match self {
            RenderedNode::Widget(instance) => &instance.children,
            RenderedNode::Element { children, .. } => children,
            RenderedNode::Text(_) => &[],
        }
    }

    /// Materialize the subtree to markup, constructing widgets through their
    /// descriptor render functions.
    pub fn to_html(&self, registry: &WidgetRegistry) -> String {
        match self {
            RenderedNode::Text(text) => {
                html_escape::encode_text(text).into_owned()
            }
            RenderedNode::Element {
                tag,
                attributes,
                children,
            } => {
                let mut out = String::new();
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
                    out.push_str(&child.to_html(registry));
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
                out
            }
            RenderedNode::Widget(instance) => {
                let children_html: String = instance
                    .children
                    .iter()
                    .map(|c| c.to_html(registry))
                    .collect();
                match registry.get(&instance.widget) {
                    Some(descriptor) => {
                        let vnode = (descriptor.render)(&instance.props);
                        vnode_html(&vnode, &children_html)
                    }
                    // registry changed underneath us; degrade to a plain div
                    None => format!("<div>{children_html}</div>"),
                }
            }
        }
    }
}

/// Render a widget vnode, substituting nested children at the slot marker.
/// The marker element itself does not appear in final output.
fn vnode_html(vnode: &VNode, children_html: &str) -> String {
    match vnode {
        VNode::Text(text) => html_escape::encode_text(text).into_owned(),
        VNode::Element {
            tag,
            attributes,
            children,
        } => {
            if vnode.is_children_slot() {
                return children_html.to_string();
            }
            let mut out = String::new();
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
                out.push_str(&vnode_html(child, children_html));
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
            out
        }
    }
}

/// Rehydrate a parsed markup forest.
pub fn rehydrate(nodes: &[MarkupNode], registry: &WidgetRegistry) -> Vec<RenderedNode> {
    nodes
        .iter()
        .map(|node| rehydrate_node(node, registry))
        .collect()
}

fn rehydrate_node(node: &MarkupNode, registry: &WidgetRegistry) -> RenderedNode {
    match node {
        MarkupNode::Text(text) => RenderedNode::Text(text.clone()),
        MarkupNode::Element {
            tag,
            attributes,
            children,
        } => {
            let children = rehydrate(children, registry);

            match registry.get(tag) {
                Some(descriptor) => {
                    let mut props: ResolvedProps = descriptor
                        .defaults
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect();

                    for (name, value) in attributes {
                        match descriptor.option(name) {
                            // a boolean option present in markup is true no
                            // matter what literal it carries
                            Some(option) if option.kind == OptionKind::Checkbox => {
                                props.insert(option.name.clone(), PropValue::Bool(true));
                            }
                            Some(option) => {
                                let raw =
                                    PropValue::Str(value.clone().unwrap_or_default());
                                props.insert(option.name.clone(), option.coerce(&raw));
                            }
                            // structural attributes pass through verbatim
                            None => {
                                let raw = match value {
                                    Some(v) => PropValue::Str(v.clone()),
                                    None => PropValue::Bool(true),
                                };
                                props.insert(name.clone(), raw);
                            }
                        }
                    }

                    RenderedNode::Widget(RenderedInstance {
                        widget: descriptor.tag.clone(),
                        props,
                        children,
                    })
                }
                None => RenderedNode::Element {
                    tag: tag.clone(),
                    attributes: attributes.clone(),
                    children,
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use trellis_engine::parse_markup;
    use trellis_widgets::{standard_registry, CHILDREN_MARKER_ATTR};

    #[test]
    fn recognized_tags_become_widgets_case_insensitively() {
        let registry = standard_registry();
        for markup in [
            "<reactbutton variant=\"secondary\"></reactbutton>",
            "<REACTBUTTON variant=\"secondary\"></REACTBUTTON>",
            "<ReactButton variant=\"secondary\"></ReactButton>",
        ] {
            let nodes = rehydrate(&parse_markup(markup), &registry);
            let widget = nodes[0].widget_tag().expect("widget recognized");
            assert_eq!(widget, "ReactButton");
        }
    }

    #[test]
    fn unknown_wrapper_passes_through_with_recognized_child() {
        let registry = standard_registry();
        let nodes = rehydrate(
            &parse_markup("<wrapper><reactbutton variant=\"primary\"></reactbutton></wrapper>"),
            &registry,
        );

        let RenderedNode::Element { tag, children, .. } = &nodes[0] else {
            panic!("wrapper should stay plain structure");
        };
        assert_eq!(tag, "wrapper");
        assert_eq!(children[0].widget_tag(), Some("ReactButton"));

        let RenderedNode::Widget(instance) = &children[0] else {
            unreachable!()
        };
        assert_eq!(instance.props.str_or("variant", ""), "primary");
    }

    #[test]
    fn checkbox_presence_means_true() {
        let registry = standard_registry();
        let nodes = rehydrate(&parse_markup("<reactflex wrap=\"false\"></reactflex>"), &registry);

        let RenderedNode::Widget(instance) = &nodes[0] else {
            panic!("flex should be recognized");
        };
        assert!(instance.props.bool_or("wrap", false));

        // absent checkbox keeps its default
        let nodes = rehydrate(&parse_markup("<reactflex></reactflex>"), &registry);
        let RenderedNode::Widget(instance) = &nodes[0] else {
            panic!()
        };
        assert!(!instance.props.bool_or("wrap", true));
    }

    #[test]
    fn system_attributes_pass_through_and_numbers_coerce() {
        let registry = standard_registry();
        let nodes = rehydrate(
            &parse_markup("<reactflex id=\"layout\" gap=\"8\"></reactflex>"),
            &registry,
        );

        let RenderedNode::Widget(instance) = &nodes[0] else {
            panic!()
        };
        assert_eq!(instance.props.str_or("id", ""), "layout");
        assert_eq!(instance.props.num_or("gap", 0.0), 8.0);
    }

    #[test]
    fn widget_html_injects_children_at_the_slot() {
        let registry = standard_registry();
        let nodes = rehydrate(
            &parse_markup(
                "<reactflex direction=\"column\"><reactbutton variant=\"primary\">Go</reactbutton></reactflex>",
            ),
            &registry,
        );

        let html = nodes[0].to_html(&registry);
        assert!(html.contains("flex-col"));
        assert!(html.contains("<button"));
        assert!(html.contains("Go"));
        // the slot marker never leaks into final markup
        assert!(!html.contains(CHILDREN_MARKER_ATTR));
    }

    #[test]
    fn out_of_schema_values_degrade_permissively() {
        let registry = standard_registry();
        let nodes = rehydrate(&parse_markup("<reactflex gap=\"99\"></reactflex>"), &registry);

        let RenderedNode::Widget(instance) = &nodes[0] else {
            panic!()
        };
        // out of bounds: kept as the literal string, render falls back
        assert_eq!(instance.props.str_or("gap", ""), "99");
        let html = nodes[0].to_html(&registry);
        assert!(html.contains("gap-4"));
    }
}
