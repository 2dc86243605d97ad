//! Flex container leaf widget: direction, wrap, alignment, and gap options.

use crate::button::passthrough_attrs;
use crate::descriptor::WidgetDescriptor;
use crate::props::ResolvedProps;
use crate::schema::OptionSpec;
use crate::vnode::VNode;

/// Tag identifier the flex container registers under.
pub const FLEX_TAG: &str = "ReactFlex";

const BASE_CLASSES: &str = "flex p-2 border border-gray-300";

fn direction_class(direction: &str) -> &'static str {
    match direction {
        "column" => "flex-col",
        _ => "flex-row",
    }
}

fn justify_class(justify: &str) -> &'static str {
    match justify {
        "center" => "justify-center",
        "end" => "justify-end",
        "between" => "justify-between",
        "around" => "justify-around",
        _ => "justify-start",
    }
}

fn items_class(items: &str) -> &'static str {
    match items {
        "center" => "items-center",
        "end" => "items-end",
        "stretch" => "items-stretch",
        "baseline" => "items-baseline",
        _ => "items-start",
    }
}

/// Render a flex container from resolved props.
pub fn render_flex(props: &ResolvedProps) -> VNode {
    let direction = props.str_or("direction", "row");
    let wrap = props.bool_or("wrap", false);
    let justify = props.str_or("justify", "start");
    let items = props.str_or("items", "start");
    let gap = props.num_or("gap", 4.0);

    let classes = format!(
        "{} {} {} {} {} gap-{}",
        BASE_CLASSES,
        direction_class(direction),
        if wrap { "flex-wrap" } else { "flex-nowrap" },
        justify_class(justify),
        items_class(items),
        gap as i64,
    );

    let mut el = VNode::element("div")
        .with_attr("class", classes)
        .with_attr("style", "padding: 24px; border: 1px dashed gray");
    el = passthrough_attrs(
        el,
        props,
        &["direction", "wrap", "justify", "items", "gap", "class"],
    );
    el.with_child(VNode::children_slot())
}

/// Descriptor registering the flex container with its editable options and
/// palette block.
pub fn flex_descriptor() -> WidgetDescriptor {
    WidgetDescriptor::new(FLEX_TAG, render_flex)
        .stylable()
        .droppable()
        .with_default("direction", "row")
        .with_default("wrap", false)
        .with_default("justify", "start")
        .with_default("items", "start")
        .with_default("gap", 4.0)
        .with_option(OptionSpec::select(
            "direction",
            "Direction",
            &[("row", "Horizontal"), ("column", "Vertical")],
        ))
        .with_option(OptionSpec::checkbox("wrap", "Wrap"))
        .with_option(OptionSpec::select(
            "justify",
            "Justify (main axis)",
            &[
                ("start", "Start"),
                ("center", "Center"),
                ("end", "End"),
                ("between", "Space between"),
                ("around", "Space around"),
            ],
        ))
        .with_option(OptionSpec::select(
            "items",
            "Align (cross axis)",
            &[
                ("start", "Start"),
                ("center", "Center"),
                ("end", "End"),
                ("stretch", "Stretch"),
                ("baseline", "Baseline"),
            ],
        ))
        .with_option(OptionSpec::number("gap", "Gap", 0.0, 12.0))
        .with_palette("Flex Container", "Widgets", Some("<div>Flex container</div>"))
}
