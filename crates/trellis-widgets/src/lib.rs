//! Widget type descriptors, option schema, and registry for trellis.
//!
//! This crate defines how embeddable widget kinds are declared to the page
//! builder: a tag identifier, default option values, an editable-option
//! schema, and a render function producing the widget's markup. It also ships
//! the two standard leaf widgets (button and flex container).

pub mod button;
pub mod descriptor;
pub mod flex;
pub mod props;
pub mod registry;
pub mod schema;
pub mod vnode;

pub use button::{button_descriptor, render_button, BUTTON_TAG};
pub use descriptor::{Block, BlockContent, PaletteSpec, RenderFn, WidgetDescriptor};
pub use flex::{flex_descriptor, render_flex, FLEX_TAG};
pub use props::{MarkupAttr, PropValue, ResolvedProps};
pub use registry::WidgetRegistry;
pub use schema::{Choice, OptionKind, OptionSpec};
pub use vnode::{VNode, CHILDREN_MARKER_ATTR};

/// Registry pre-loaded with the standard widgets.
pub fn standard_registry() -> WidgetRegistry {
    let mut registry = WidgetRegistry::new();
    registry.register(button_descriptor());
    registry.register(flex_descriptor());
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_holds_both_widgets() {
        let registry = standard_registry();

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("reactbutton"));
        assert!(registry.contains("REACTFLEX"));
        assert_eq!(registry.blocks().len(), 2);
    }
}
