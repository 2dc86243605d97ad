//! Button leaf widget: maps `variant` and `size` to utility classes.

use crate::descriptor::WidgetDescriptor;
use crate::props::{PropValue, ResolvedProps};
use crate::schema::OptionSpec;
use crate::vnode::VNode;

/// Tag identifier the button registers under.
pub const BUTTON_TAG: &str = "ReactButton";

const BASE_CLASSES: &str = "font-medium rounded-md focus:outline-none transition-colors";

fn variant_classes(variant: &str) -> &'static str {
    match variant {
        "secondary" => "bg-gray-200 text-gray-800 hover:bg-gray-300",
        "outline" => "border border-blue-600 text-blue-600 hover:bg-blue-50",
        // "primary" and anything unrecognized
        _ => "bg-blue-600 text-white hover:bg-blue-700",
    }
}

fn size_classes(size: &str) -> &'static str {
    match size {
        "small" => "text-sm py-1 px-3",
        "large" => "text-lg py-3 px-6",
        _ => "text-base py-2 px-4",
    }
}

/// Render a button from resolved props.
pub fn render_button(props: &ResolvedProps) -> VNode {
    let variant = props.str_or("variant", "primary");
    let size = props.str_or("size", "medium");

    let mut classes = format!(
        "{} {} {}",
        BASE_CLASSES,
        variant_classes(variant),
        size_classes(size)
    );
    if let Some(extra) = props.get("class").and_then(PropValue::as_str) {
        classes.push(' ');
        classes.push_str(extra);
    }

    let mut el = VNode::element("button").with_attr("class", classes);
    el = passthrough_attrs(el, props, &["variant", "size", "class"]);
    el.with_child(VNode::children_slot())
}

/// Copy non-option props (`id` and friends) onto the rendered element.
pub(crate) fn passthrough_attrs(mut el: VNode, props: &ResolvedProps, skip: &[&str]) -> VNode {
    for (name, value) in props.iter() {
        if skip.iter().any(|s| s.eq_ignore_ascii_case(name)) {
            continue;
        }
        el = match value {
            PropValue::Bool(true) => el.with_bare_attr(name),
            PropValue::Bool(false) => el,
            other => el.with_attr(name, other.to_attr_string()),
        };
    }
    el
}

/// Descriptor registering the button with its editable options and palette
/// block.
pub fn button_descriptor() -> WidgetDescriptor {
    WidgetDescriptor::new(BUTTON_TAG, render_button)
        .stylable()
        .with_default("variant", "primary")
        .with_default("size", "medium")
        .with_option(OptionSpec::select(
            "variant",
            "Variant",
            &[
                ("primary", "Primary"),
                ("secondary", "Secondary"),
                ("outline", "Outline"),
            ],
        ))
        .with_option(OptionSpec::select(
            "size",
            "Size",
            &[("small", "Small"), ("medium", "Medium"), ("large", "Large")],
        ))
        .with_palette("Button", "Widgets", Some("Click me"))
}
