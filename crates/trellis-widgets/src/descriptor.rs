//! Widget type descriptors: the registration metadata binding a tag
//! identifier to a constructible, option-configurable widget.

use indexmap::IndexMap;
use serde::Serialize;

use crate::props::{PropValue, ResolvedProps};
use crate::schema::OptionSpec;
use crate::vnode::VNode;

/// Render function constructing a widget's markup from resolved props.
pub type RenderFn = fn(&ResolvedProps) -> VNode;

/// Palette metadata contributed to the builder's block catalog when a
/// descriptor is registered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaletteSpec {
    pub label: String,
    pub category: String,
    pub content: BlockContent,
}

/// Default content dropped onto the canvas when a palette block is used.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockContent {
    /// Widget type the block instantiates
    #[serde(rename = "type")]
    pub kind: String,

    /// Initial inner content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// An entry of the insertable-blocks catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub id: String,
    pub label: String,
    pub category: String,
    pub content: BlockContent,
}

/// Registration metadata for one embeddable widget kind.
///
/// Registered once at startup and immutable afterwards; looked up by tag
/// identifier during both live editing and markup rehydration.
#[derive(Debug, Clone)]
pub struct WidgetDescriptor {
    /// How the widget appears as a tag in documents and markup
    pub tag: String,

    /// Default option values
    pub defaults: IndexMap<String, PropValue>,

    /// Editable-option schema, in declaration order
    pub options: Vec<OptionSpec>,

    /// Whether visual style properties may be attached
    pub stylable: bool,

    /// Whether other nodes may be nested inside
    pub droppable: bool,

    /// Optional block-palette entry
    pub palette: Option<PaletteSpec>,

    /// Widget constructor
    pub render: RenderFn,
}

impl WidgetDescriptor {
    /// Start a descriptor for `tag` rendered by `render`.
    pub fn new(tag: &str, render: RenderFn) -> Self {
        Self {
            tag: tag.to_string(),
            defaults: IndexMap::new(),
            options: Vec::new(),
            stylable: false,
            droppable: false,
            palette: None,
            render,
        }
    }

    /// Add a default option value.
    pub fn with_default(mut self, name: &str, value: impl Into<PropValue>) -> Self {
        self.defaults.insert(name.to_string(), value.into());
        self
    }

    /// Append an editable option.
    pub fn with_option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }

    /// Mark the widget stylable.
    pub fn stylable(mut self) -> Self {
        self.stylable = true;
        self
    }

    /// Allow nesting other nodes inside the widget.
    pub fn droppable(mut self) -> Self {
        self.droppable = true;
        self
    }

    /// Attach a block-palette entry.
    pub fn with_palette(mut self, label: &str, category: &str, content: Option<&str>) -> Self {
        self.palette = Some(PaletteSpec {
            label: label.to_string(),
            category: category.to_string(),
            content: BlockContent {
                kind: self.tag.clone(),
                content: content.map(str::to_string),
            },
        });
        self
    }

    /// Find the declared option an attribute name refers to, matching
    /// case-insensitively.
    pub fn option(&self, attr_name: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|opt| opt.matches(attr_name))
    }

    /// Resolve a node's attributes into widget props.
    ///
    /// Defaults come first; attributes matching a declared option are coerced
    /// to the option's kind and stored under the option's canonical name;
    /// unknown and structural attributes pass through verbatim.
    pub fn resolve_props<'a, I>(&self, attributes: I) -> ResolvedProps
    where
        I: IntoIterator<Item = (&'a str, &'a PropValue)>,
    {
        let mut props: ResolvedProps = self
            .defaults
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        for (name, value) in attributes {
            match self.option(name) {
                Some(option) => props.insert(option.name.clone(), option.coerce(value)),
                None => props.insert(name.to_string(), value.clone()),
            }
        }

        props
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::OptionSpec;
    use pretty_assertions::assert_eq;

    fn probe(props: &ResolvedProps) -> VNode {
        let _ = props;
        VNode::element("div")
    }

    fn descriptor() -> WidgetDescriptor {
        WidgetDescriptor::new("Probe", probe)
            .with_default("variant", "primary")
            .with_default("gap", 4.0)
            .with_option(OptionSpec::select(
                "variant",
                "Variant",
                &[("primary", "Primary"), ("secondary", "Secondary")],
            ))
            .with_option(OptionSpec::number("gap", "Gap", 0.0, 12.0))
    }

    #[test]
    fn resolves_defaults_then_attributes() {
        let d = descriptor();
        let attrs = [("gap".to_string(), PropValue::Str("8".to_string()))];

        let props = d.resolve_props(attrs.iter().map(|(k, v)| (k.as_str(), v)));

        assert_eq!(props.str_or("variant", ""), "primary");
        assert_eq!(props.num_or("gap", 0.0), 8.0);
    }

    #[test]
    fn attribute_names_match_options_case_insensitively() {
        let d = descriptor();
        let attrs = [("VARIANT".to_string(), PropValue::Str("secondary".into()))];

        let props = d.resolve_props(attrs.iter().map(|(k, v)| (k.as_str(), v)));

        // stored under the canonical option name, not the markup casing
        assert_eq!(props.str_or("variant", ""), "secondary");
        assert!(props.get("VARIANT").is_none());
    }

    #[test]
    fn unknown_attributes_pass_through() {
        let d = descriptor();
        let attrs = [("id".to_string(), PropValue::Str("hero".into()))];

        let props = d.resolve_props(attrs.iter().map(|(k, v)| (k.as_str(), v)));

        assert_eq!(props.str_or("id", ""), "hero");
    }
}
