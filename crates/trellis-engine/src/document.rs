//! Mutable document tree with change notification.
//!
//! The in-memory form of a loaded page frame: an arena of nodes the canvas
//! (or a headless run) works against. Mutations queue [`DocumentEvent`]s that
//! the live session drains once per tick, which is what the adapter's
//! one-tick coalescing is built on.

use indexmap::IndexMap;
use slotmap::{new_key_type, SlotMap};

use trellis_widgets::{PropValue, WidgetRegistry};

use crate::markup::{parse_markup, MarkupNode};
use crate::project::{ClassEntry, ComponentData};

new_key_type! {
    /// Key of a document node.
    pub struct NodeId;
}

/// Change notifications emitted by document mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEvent {
    /// An attribute on `node` was set or removed
    AttributesChanged { node: NodeId },

    /// Children were appended to `parent`
    ChildrenAdded { parent: NodeId, added: Vec<NodeId> },

    /// A child subtree was removed from `parent`; `removed` lists every node
    /// of the detached subtree so adapters can be disposed
    ChildrenRemoved { parent: NodeId, removed: Vec<NodeId> },

    /// All children of `parent` were removed at once
    ChildrenReset { parent: NodeId, removed: Vec<NodeId> },
}

/// One document node.
#[derive(Debug, Clone)]
pub struct NodeData {
    /// Widget/tag identity as authored (`tagName` falling back to `type`)
    pub identity: Option<String>,

    /// Serialization tag; widget nodes serialize under their identity
    pub tag: String,

    /// Whether the identity resolved to a registered widget type at build
    pub widget: bool,

    /// Text payload; a text node has no tag semantics
    pub text: Option<String>,

    pub attributes: IndexMap<String, PropValue>,

    pub classes: Vec<String>,

    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl NodeData {
    fn element(tag: &str) -> Self {
        Self {
            identity: None,
            tag: tag.to_string(),
            widget: false,
            text: None,
            attributes: IndexMap::new(),
            classes: Vec::new(),
            children: Vec::new(),
            parent: None,
        }
    }

    fn text(content: &str) -> Self {
        let mut node = Self::element("");
        node.text = Some(content.to_string());
        node
    }

    /// Whether this is a text node.
    pub fn is_text(&self) -> bool {
        self.text.is_some()
    }
}

/// The mutable document tree of one frame.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: SlotMap<NodeId, NodeData>,
    root: NodeId,
    events: Vec<DocumentEvent>,
}

impl Document {
    /// Create a document holding only an empty wrapper root.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let mut root_data = NodeData::element("div");
        root_data.identity = Some("wrapper".to_string());
        let root = nodes.insert(root_data);
        Self {
            nodes,
            root,
            events: Vec::new(),
        }
    }

    /// Build a document from a serialized frame root.
    ///
    /// Nodes whose identity resolves in the registry are marked as widgets
    /// and their recognized attributes coerced per the option schema; unknown
    /// attributes pass through untouched.
    pub fn from_component(data: &ComponentData, registry: &WidgetRegistry) -> Self {
        let mut doc = Self::new();
        let root = doc.root;
        doc.populate(root, data, registry);
        doc.events.clear(); // loading is not an edit
        doc
    }

    fn populate(&mut self, node: NodeId, data: &ComponentData, registry: &WidgetRegistry) {
        let identity = data.identity().map(str::to_string);
        let widget = identity
            .as_deref()
            .map(|id| registry.contains(id))
            .unwrap_or(false);

        let mut attributes = data.scalar_attributes();
        if let Some(descriptor) = identity.as_deref().and_then(|id| registry.get(id)) {
            for (name, value) in attributes.iter_mut() {
                if let Some(option) = descriptor.option(name) {
                    *value = option.coerce(value);
                }
            }
        }

        let tag = serialization_tag(&identity, &data.tag_name, widget);
        {
            let entry = &mut self.nodes[node];
            entry.identity = identity;
            entry.widget = widget;
            entry.tag = tag;
            entry.attributes = attributes;
            entry.classes = data.classes.iter().map(|c| c.name().to_string()).collect();
        }

        if !data.components.is_empty() {
            for child in &data.components {
                let child_id = self.insert_detached(child, registry);
                self.nodes[child_id].parent = Some(node);
                self.nodes[node].children.push(child_id);
            }
        } else if let Some(content) = &data.content {
            // initial markup content becomes the node's children, the way the
            // builder parses block content on drop
            for parsed in parse_markup(content) {
                let child_id = self.insert_markup(&parsed, registry);
                self.nodes[child_id].parent = Some(node);
                self.nodes[node].children.push(child_id);
            }
        }
    }

    fn insert_detached(&mut self, data: &ComponentData, registry: &WidgetRegistry) -> NodeId {
        if data.kind.as_deref() == Some("textnode") {
            return self
                .nodes
                .insert(NodeData::text(data.content.as_deref().unwrap_or("")));
        }
        let id = self.nodes.insert(NodeData::element("div"));
        self.populate(id, data, registry);
        id
    }

    fn insert_markup(&mut self, node: &MarkupNode, registry: &WidgetRegistry) -> NodeId {
        match node {
            MarkupNode::Text(text) => self.nodes.insert(NodeData::text(text)),
            MarkupNode::Element {
                tag,
                attributes,
                children,
            } => {
                let widget = registry.contains(tag);
                let mut data = NodeData::element(tag);
                data.identity = Some(tag.clone());
                data.widget = widget;
                for (name, value) in attributes {
                    let prop = match value {
                        Some(v) => PropValue::Str(v.clone()),
                        None => PropValue::Bool(true),
                    };
                    data.attributes.insert(name.clone(), prop);
                }
                let id = self.nodes.insert(data);
                for child in children {
                    let child_id = self.insert_markup(child, registry);
                    self.nodes[child_id].parent = Some(id);
                    self.nodes[id].children.push(child_id);
                }
                id
            }
        }
    }

    /// Root node of the document.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Node data, if the node still exists.
    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    /// Children of a node, in document order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Parent of a node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// Whether the node is (still) part of the document.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Every node of the subtree rooted at `id`, in depth-first order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            if !self.nodes.contains_key(node) {
                continue;
            }
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Set an attribute and queue a change notification.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<PropValue>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.attributes.insert(name.to_string(), value.into());
            self.events.push(DocumentEvent::AttributesChanged { node: id });
        }
    }

    /// Remove an attribute and queue a change notification.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) {
        if let Some(node) = self.nodes.get_mut(id) {
            if node.attributes.shift_remove(name).is_some() {
                self.events.push(DocumentEvent::AttributesChanged { node: id });
            }
        }
    }

    /// Append a serialized component as a new child subtree.
    pub fn append_component(
        &mut self,
        parent: NodeId,
        data: &ComponentData,
        registry: &WidgetRegistry,
    ) -> Option<NodeId> {
        if !self.nodes.contains_key(parent) {
            return None;
        }
        let child = self.insert_detached(data, registry);
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
        self.events.push(DocumentEvent::ChildrenAdded {
            parent,
            added: vec![child],
        });
        Some(child)
    }

    /// Remove a child subtree. Returns the ids of every removed node.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Vec<NodeId> {
        let Some(position) = self.children(parent).iter().position(|c| *c == child) else {
            return Vec::new();
        };
        let removed = self.descendants(child);
        self.nodes[parent].children.remove(position);
        for id in &removed {
            self.nodes.remove(*id);
        }
        self.events.push(DocumentEvent::ChildrenRemoved {
            parent,
            removed: removed.clone(),
        });
        removed
    }

    /// Remove all children of a node at once.
    pub fn reset_children(&mut self, parent: NodeId) -> Vec<NodeId> {
        if !self.nodes.contains_key(parent) {
            return Vec::new();
        }
        let children: Vec<NodeId> = self.nodes[parent].children.drain(..).collect();
        let mut removed = Vec::new();
        for child in children {
            removed.extend(self.descendants(child));
        }
        for id in &removed {
            self.nodes.remove(*id);
        }
        if !removed.is_empty() {
            self.events.push(DocumentEvent::ChildrenReset {
                parent,
                removed: removed.clone(),
            });
        }
        removed
    }

    /// Drain queued change notifications, oldest first.
    pub fn drain_events(&mut self) -> Vec<DocumentEvent> {
        std::mem::take(&mut self.events)
    }

    /// Export a node back to the serialized component form.
    pub fn to_component(&self, id: NodeId) -> Option<ComponentData> {
        let node = self.nodes.get(id)?;

        if let Some(text) = &node.text {
            let mut data = ComponentData::default();
            data.kind = Some("textnode".to_string());
            data.content = Some(text.clone());
            return Some(data);
        }

        let mut data = ComponentData::default();
        data.kind = node.identity.clone();
        data.attributes = node
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), crate::project::prop_to_json(v)))
            .collect();
        data.classes = node
            .classes
            .iter()
            .map(|c| ClassEntry::Name(c.clone()))
            .collect();
        data.components = node
            .children
            .iter()
            .filter_map(|c| self.to_component(*c))
            .collect();
        Some(data)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

fn serialization_tag(identity: &Option<String>, tag_name: &Option<String>, widget: bool) -> String {
    if widget {
        if let Some(identity) = identity {
            return identity.clone();
        }
    }
    if let Some(tag) = tag_name {
        return tag.clone();
    }
    match identity.as_deref() {
        // the wrapper and generic container types serialize as plain divs
        Some("wrapper") | Some("default") | None => "div".to_string(),
        Some(other) if other.chars().all(|c| c.is_ascii_lowercase()) => other.to_string(),
        Some(_) => "div".to_string(),
    }
}
