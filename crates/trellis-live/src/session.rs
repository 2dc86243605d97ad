//! Live session: wires document change notifications to widget adapters.
//!
//! Owns the document, the host tree, the scheduler, and one adapter per
//! widget node. A call to [`LiveSession::pump`] is one tick: queued document
//! events are routed to adapters, then every scheduled render runs exactly
//! once.

use std::collections::HashSet;

use slotmap::SecondaryMap;

use trellis_engine::{Document, DocumentEvent, NodeId};
use trellis_widgets::{MarkupAttr, PropValue, WidgetRegistry, CHILDREN_MARKER_ATTR};

use crate::adapter::LiveAdapter;
use crate::host::{HostId, HostTree};
use crate::scheduler::RenderScheduler;

/// A live editing session over one document.
pub struct LiveSession<'r> {
    registry: &'r WidgetRegistry,
    document: Document,
    host: HostTree,
    canvas: HostId,
    adapters: SecondaryMap<NodeId, LiveAdapter>,
    scheduler: RenderScheduler,
}

impl<'r> LiveSession<'r> {
    /// Start a session: attach an adapter to every widget node and perform
    /// the initial render.
    pub fn new(document: Document, registry: &'r WidgetRegistry) -> Self {
        let mut host = HostTree::new();
        let canvas = host.create_element("div");

        let mut session = Self {
            registry,
            document,
            host,
            canvas,
            adapters: SecondaryMap::new(),
            scheduler: RenderScheduler::new(),
        };

        let root = session.document.root();
        for node in session.document.descendants(root) {
            if session.is_widget(node) {
                let adapter = LiveAdapter::attach(node, &mut session.host);
                session.adapters.insert(node, adapter);
            }
        }

        session.scheduler.schedule(root);
        let widgets: Vec<NodeId> = session.adapters.keys().collect();
        for node in widgets {
            session.scheduler.schedule(node);
        }
        session.flush_scheduled();

        session
    }

    /// The document under edit. Mutate through [`LiveSession::document_mut`]
    /// and call [`LiveSession::pump`] to apply the changes.
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn registry(&self) -> &'r WidgetRegistry {
        self.registry
    }

    pub fn host(&self) -> &HostTree {
        &self.host
    }

    /// Root element everything renders under.
    pub fn canvas(&self) -> HostId {
        self.canvas
    }

    /// Markup of the current canvas content.
    pub fn canvas_html(&self) -> String {
        self.host
            .children(self.canvas)
            .iter()
            .map(|c| self.host.to_html(*c))
            .collect()
    }

    /// Adapter attached to a node, disposed adapters included.
    pub fn adapter(&self, node: NodeId) -> Option<&LiveAdapter> {
        self.adapters.get(node)
    }

    /// Process one tick: route queued document events, then run each
    /// scheduled render once. Returns the number of renders performed.
    pub fn pump(&mut self) -> usize {
        for event in self.document.drain_events() {
            match event {
                DocumentEvent::AttributesChanged { node } => {
                    self.schedule_nearest(node);
                }
                DocumentEvent::ChildrenAdded { parent, added } => {
                    for root in added {
                        for node in self.document.descendants(root) {
                            if self.is_widget(node) && !self.adapters.contains_key(node) {
                                let adapter = LiveAdapter::attach(node, &mut self.host);
                                self.adapters.insert(node, adapter);
                                self.scheduler.schedule(node);
                            }
                        }
                    }
                    self.schedule_nearest(parent);
                }
                DocumentEvent::ChildrenRemoved { parent, removed }
                | DocumentEvent::ChildrenReset { parent, removed } => {
                    for node in removed {
                        if let Some(adapter) = self.adapters.get_mut(node) {
                            adapter.dispose(&mut self.host, &mut self.scheduler);
                        }
                    }
                    self.schedule_nearest(parent);
                }
            }
        }
        self.flush_scheduled()
    }

    /// Dispose every adapter and clear the canvas.
    pub fn dispose(&mut self) {
        let nodes: Vec<NodeId> = self.adapters.keys().collect();
        for node in nodes {
            if let Some(adapter) = self.adapters.get_mut(node) {
                adapter.dispose(&mut self.host, &mut self.scheduler);
            }
        }
        self.scheduler.flush();
        self.host.clear_children(self.canvas);
    }

    fn is_widget(&self, node: NodeId) -> bool {
        self.document.get(node).map(|n| n.widget).unwrap_or(false)
    }

    /// Schedule the re-render a change on `node` calls for: the node's own
    /// adapter when it has one, otherwise the nearest widget ancestor, and
    /// failing that the canvas itself.
    fn schedule_nearest(&mut self, node: NodeId) {
        let mut current = node;
        loop {
            if let Some(adapter) = self.adapters.get(current) {
                if !adapter.is_disposed() {
                    self.scheduler.schedule(current);
                    return;
                }
            }
            match self.document.parent(current) {
                Some(parent) => current = parent,
                None => {
                    self.scheduler.schedule(self.document.root());
                    return;
                }
            }
        }
    }

    fn flush_scheduled(&mut self) -> usize {
        let mut renders = 0;
        for node in self.scheduler.flush() {
            if node == self.document.root() {
                self.refresh_canvas();
                renders += 1;
            } else if self
                .adapters
                .get(node)
                .is_some_and(|a| !a.is_disposed())
                && self.render_widget(node)
            {
                renders += 1;
            }
        }
        renders
    }

    /// Re-render one widget node: resolve props, render children into the
    /// off-screen holder, mount the widget's own output, then relocate the
    /// children into its slot.
    fn render_widget(&mut self, node: NodeId) -> bool {
        let Some(identity) = self
            .document
            .get(node)
            .and_then(|n| n.identity.clone())
        else {
            return false;
        };
        let Some(descriptor) = self.registry.get(&identity) else {
            return false;
        };

        let attrs: Vec<(String, PropValue)> = match self.document.get(node) {
            Some(data) => data
                .attributes
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            None => return false,
        };
        let props = descriptor.resolve_props(attrs.iter().map(|(k, v)| (k.as_str(), v)));

        let (element, holder) = {
            let Some(adapter) = self.adapters.get_mut(node) else {
                return false;
            };
            (adapter.element(), adapter.holder(&mut self.host))
        };

        // children first: resolve every child fully before attaching, and
        // keep previously relocated instances out of the content we replace
        self.reset_holder(holder);
        let children: Vec<NodeId> = self.document.children(node).to_vec();
        for child in &children {
            let el = self.render_node(*child);
            self.host.append(holder, el);
        }

        // replace the previous rendered instance with a fresh mount
        self.host.clear_children(element);
        let vnode = (descriptor.render)(&props);
        self.host.mount(element, &vnode);

        // relocate children into whatever the widget declared as its slot
        match self.host.find_by_attribute(element, CHILDREN_MARKER_ATTR) {
            Some(marker) => self.host.move_children(holder, marker),
            None if !children.is_empty() => {
                tracing::warn!(
                    widget = %descriptor.tag,
                    "rendered output has no children slot; nested content was not attached"
                );
            }
            None => {}
        }

        if let Some(adapter) = self.adapters.get_mut(node) {
            adapter.record_render();
        }
        true
    }

    /// Drop stale holder content, keeping live adapter elements out of the
    /// sweep (they are re-parented, never destroyed, by renders).
    fn reset_holder(&mut self, holder: HostId) {
        let adapter_elements: HashSet<HostId> =
            self.adapters.values().map(|a| a.element()).collect();
        for child in self.host.children(holder).to_vec() {
            if adapter_elements.contains(&child) {
                self.host.detach(child);
            } else {
                self.host.remove_subtree(child);
            }
        }
    }

    /// Render a document node into a host element. Widget nodes contribute
    /// their adapter's mount element; plain nodes are built statically.
    fn render_node(&mut self, node: NodeId) -> HostId {
        if let Some(adapter) = self.adapters.get(node) {
            if !adapter.is_disposed() {
                return adapter.element();
            }
        }

        let Some(data) = self.document.get(node) else {
            return self.host.create_text("");
        };
        if let Some(text) = data.text.clone() {
            return self.host.create_text(&text);
        }

        let tag = data.tag.clone();
        let attrs: Vec<(String, MarkupAttr)> = data
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.to_markup_attr()))
            .collect();
        let classes = data.classes.join(" ");

        let el = self.host.create_element(&tag);
        for (name, attr) in attrs {
            match attr {
                MarkupAttr::Value(v) if name == "class" && !classes.is_empty() => {
                    // merge explicit class attribute with attached classes
                    self.host
                        .set_attribute(el, "class", Some(format!("{classes} {v}")));
                }
                MarkupAttr::Value(v) => self.host.set_attribute(el, &name, Some(v)),
                MarkupAttr::Bare => self.host.set_attribute(el, &name, None),
                MarkupAttr::Omitted => {}
            }
        }
        if !classes.is_empty() && self.host.attribute(el, "class").is_none() {
            self.host.set_attribute(el, "class", Some(classes));
        }

        for child in self.document.children(node).to_vec() {
            let child_el = self.render_node(child);
            self.host.append(el, child_el);
        }
        el
    }

    /// Rebuild the canvas-level arrangement of the root's children.
    fn refresh_canvas(&mut self) {
        let staging = self.host.create_element("div");
        for child in self.document.children(self.document.root()).to_vec() {
            let el = self.render_node(child);
            self.host.append(staging, el);
        }
        self.host.clear_children(self.canvas);
        self.host.move_children(staging, self.canvas);
        self.host.remove_subtree(staging);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use trellis_engine::ComponentData;
    use trellis_widgets::{
        standard_registry, ResolvedProps, VNode, WidgetDescriptor, WidgetRegistry,
    };

    fn fixture() -> ComponentData {
        serde_json::from_str(
            r#"{
                "type": "wrapper",
                "components": [
                    {
                        "type": "REACTFLEX",
                        "attributes": { "direction": "row", "gap": 4 },
                        "components": [
                            { "tagName": "ReactButton", "attributes": { "variant": "primary" } },
                            { "type": "REACTBUTTON", "attributes": { "variant": "secondary" } }
                        ]
                    }
                ]
            }"#,
        )
        .unwrap()
    }

    fn session_for<'r>(registry: &'r WidgetRegistry, data: &ComponentData) -> LiveSession<'r> {
        let document = Document::from_component(data, registry);
        LiveSession::new(document, registry)
    }

    fn flex_node(session: &LiveSession<'_>) -> NodeId {
        let root = session.document().root();
        session.document().children(root)[0]
    }

    #[test]
    fn initial_render_nests_buttons_inside_flex_slot() {
        let registry = standard_registry();
        let session = session_for(&registry, &fixture());

        let html = session.canvas_html();
        assert!(html.contains("flex-row"));
        assert!(html.contains("bg-blue-600"));
        assert!(html.contains("bg-gray-200"));

        // both buttons sit under the flex container's slot, in order
        let flex = flex_node(&session);
        let flex_el = session.adapter(flex).unwrap().element();
        let marker = session
            .host()
            .find_by_attribute(flex_el, CHILDREN_MARKER_ATTR)
            .expect("flex renders a children slot");
        assert_eq!(session.host().children(marker).len(), 2);
    }

    #[test]
    fn attribute_change_rerenders_with_coerced_options() {
        let registry = standard_registry();
        let mut session = session_for(&registry, &fixture());

        let flex = flex_node(&session);
        let button = session.document().children(flex)[0];
        let before = session.adapter(button).unwrap().render_count();

        session
            .document_mut()
            .set_attribute(button, "variant", "secondary");
        let renders = session.pump();

        assert_eq!(renders, 1);
        assert_eq!(session.adapter(button).unwrap().render_count(), before + 1);

        let html = session.host().to_html(session.adapter(button).unwrap().element());
        assert!(html.contains("bg-gray-200"));
        assert!(!html.contains("bg-blue-600"));
    }

    #[test]
    fn rapid_structural_changes_coalesce_into_one_render() {
        let registry = standard_registry();
        let mut session = session_for(&registry, &fixture());

        let flex = flex_node(&session);
        let before = session.adapter(flex).unwrap().render_count();

        let button: ComponentData =
            serde_json::from_str(r#"{ "type": "REACTBUTTON", "attributes": { "variant": "outline" } }"#)
                .unwrap();
        for _ in 0..4 {
            let registry_ref = session.registry();
            session
                .document_mut()
                .append_component(flex, &button, registry_ref);
        }
        let first = session.document().children(flex)[0];
        session.document_mut().remove_child(flex, first);

        session.pump();

        // five structural events within the tick, one parent re-render
        assert_eq!(session.adapter(flex).unwrap().render_count(), before + 1);

        // final child order in the rendered instance matches the document
        let flex_el = session.adapter(flex).unwrap().element();
        let marker = session
            .host()
            .find_by_attribute(flex_el, CHILDREN_MARKER_ATTR)
            .unwrap();
        let rendered: Vec<NodeId> = session.document().children(flex).to_vec();
        assert_eq!(session.host().children(marker).len(), rendered.len());
        assert_eq!(rendered.len(), 5);
    }

    #[test]
    fn disposal_cancels_pending_render_and_releases_holder() {
        let registry = standard_registry();
        let mut session = session_for(&registry, &fixture());

        let flex = flex_node(&session);
        let button = session.document().children(flex)[0];
        let adapter = session.adapter(button).unwrap();
        let element = adapter.element();
        let count_before = adapter.render_count();

        // a change and a removal in the same tick: the pending render must
        // not fire
        session
            .document_mut()
            .set_attribute(button, "variant", "outline");
        session.document_mut().remove_child(flex, button);
        session.pump();

        let adapter = session.adapter(button).unwrap();
        assert!(adapter.is_disposed());
        assert_eq!(adapter.render_count(), count_before);
        assert!(!session.host().contains(element));

        // and no stray render remains scheduled
        assert_eq!(session.pump(), 0);
    }

    #[test]
    fn widgets_inside_plain_wrappers_still_render() {
        let registry = standard_registry();
        let data: ComponentData = serde_json::from_str(
            r#"{
                "type": "wrapper",
                "components": [
                    {
                        "tagName": "section",
                        "attributes": { "id": "hero" },
                        "components": [
                            { "type": "REACTBUTTON", "attributes": { "variant": "outline" } }
                        ]
                    }
                ]
            }"#,
        )
        .unwrap();
        let session = session_for(&registry, &data);

        let html = session.canvas_html();
        assert!(html.contains("<section id=\"hero\">"));
        assert!(html.contains("border-blue-600"));
    }

    fn slotless(_props: &ResolvedProps) -> VNode {
        VNode::element("div").with_attr("class", "slotless")
    }

    #[test]
    fn missing_children_slot_drops_content_without_failing() {
        let mut registry = standard_registry();
        registry.register(WidgetDescriptor::new("SlotlessBox", slotless).droppable());

        let data: ComponentData = serde_json::from_str(
            r#"{
                "type": "wrapper",
                "components": [
                    {
                        "type": "SlotlessBox",
                        "components": [
                            { "type": "REACTBUTTON", "attributes": { "variant": "primary" } }
                        ]
                    }
                ]
            }"#,
        )
        .unwrap();
        let session = session_for(&registry, &data);

        let html = session.canvas_html();
        assert!(html.contains("slotless"));
        // nested content silently stays unattached
        assert!(!html.contains("bg-blue-600"));
    }
}
