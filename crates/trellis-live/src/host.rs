//! Host element arena: the surface live widgets mount into.
//!
//! A small DOM analog. Rendered instances, off-screen holders, and the
//! canvas all live in one [`HostTree`]; relocating nested children is a
//! plain re-parenting of arena nodes.

use indexmap::IndexMap;
use slotmap::{new_key_type, SlotMap};

use trellis_widgets::VNode;

new_key_type! {
    /// Key of a host node.
    pub struct HostId;
}

/// Payload of a host node.
#[derive(Debug, Clone)]
pub enum HostKind {
    Element {
        tag: String,
        /// `None` values are bare attributes
        attributes: IndexMap<String, Option<String>>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct HostEntry {
    kind: HostKind,
    parent: Option<HostId>,
    children: Vec<HostId>,
}

/// Arena of host nodes.
#[derive(Debug, Default)]
pub struct HostTree {
    nodes: SlotMap<HostId, HostEntry>,
}

impl HostTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> HostId {
        self.nodes.insert(HostEntry {
            kind: HostKind::Element {
                tag: tag.to_string(),
                attributes: IndexMap::new(),
            },
            parent: None,
            children: Vec::new(),
        })
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, content: &str) -> HostId {
        self.nodes.insert(HostEntry {
            kind: HostKind::Text(content.to_string()),
            parent: None,
            children: Vec::new(),
        })
    }

    /// Set an attribute on an element; `None` makes it a bare attribute.
    pub fn set_attribute(&mut self, id: HostId, name: &str, value: Option<String>) {
        if let Some(HostEntry {
            kind: HostKind::Element { attributes, .. },
            ..
        }) = self.nodes.get_mut(id)
        {
            attributes.insert(name.to_string(), value);
        }
    }

    /// Read an attribute value.
    pub fn attribute(&self, id: HostId, name: &str) -> Option<&Option<String>> {
        match self.nodes.get(id)? {
            HostEntry {
                kind: HostKind::Element { attributes, .. },
                ..
            } => attributes.get(name),
            _ => None,
        }
    }

    /// Whether the node still exists in the arena.
    pub fn contains(&self, id: HostId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live nodes, detached ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Children of a node in order.
    pub fn children(&self, id: HostId) -> &[HostId] {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Tag name of an element node.
    pub fn tag(&self, id: HostId) -> Option<&str> {
        match &self.nodes.get(id)?.kind {
            HostKind::Element { tag, .. } => Some(tag),
            HostKind::Text(_) => None,
        }
    }

    /// Append `child` to `parent`, detaching it from its current parent
    /// first. Re-appending is how children are relocated.
    pub fn append(&mut self, parent: HostId, child: HostId) {
        if !self.nodes.contains_key(parent) || !self.nodes.contains_key(child) {
            return;
        }
        self.detach(child);
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    /// Detach a node from its parent, keeping the subtree alive.
    pub fn detach(&mut self, id: HostId) {
        let Some(parent) = self.nodes.get(id).and_then(|n| n.parent) else {
            return;
        };
        if let Some(entry) = self.nodes.get_mut(parent) {
            entry.children.retain(|c| *c != id);
        }
        self.nodes[id].parent = None;
    }

    /// Remove a subtree from the arena entirely. Missing ids are a no-op so
    /// teardown stays best-effort.
    pub fn remove_subtree(&mut self, id: HostId) {
        if !self.nodes.contains_key(id) {
            return;
        }
        self.detach(id);
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            if let Some(entry) = self.nodes.remove(node) {
                stack.extend(entry.children);
            }
        }
    }

    /// Remove every child subtree of a node.
    pub fn clear_children(&mut self, id: HostId) {
        let children: Vec<HostId> = self.children(id).to_vec();
        for child in children {
            self.remove_subtree(child);
        }
    }

    /// Move all children of `from` to the end of `to`, preserving order.
    pub fn move_children(&mut self, from: HostId, to: HostId) {
        let children: Vec<HostId> = self.children(from).to_vec();
        for child in children {
            self.append(to, child);
        }
    }

    /// Depth-first search for the first element carrying `attr`.
    pub fn find_by_attribute(&self, root: HostId, attr: &str) -> Option<HostId> {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let Some(entry) = self.nodes.get(id) {
                if let HostKind::Element { attributes, .. } = &entry.kind {
                    if attributes.contains_key(attr) {
                        return Some(id);
                    }
                }
                stack.extend(entry.children.iter().rev().copied());
            }
        }
        None
    }

    /// Materialize a [`VNode`] subtree under `parent`, returning the created
    /// root.
    pub fn mount(&mut self, parent: HostId, vnode: &VNode) -> HostId {
        let id = match vnode {
            VNode::Text(text) => self.create_text(text),
            VNode::Element {
                tag,
                attributes,
                children,
            } => {
                let el = self.create_element(tag);
                for (name, value) in attributes {
                    self.set_attribute(el, name, value.clone());
                }
                for child in children {
                    self.mount(el, child);
                }
                el
            }
        };
        self.append(parent, id);
        id
    }

    /// Serialize a subtree to markup text.
    pub fn to_html(&self, id: HostId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    fn write_html(&self, id: HostId, out: &mut String) {
        let Some(entry) = self.nodes.get(id) else {
            return;
        };
        match &entry.kind {
            HostKind::Text(text) => out.push_str(&html_escape::encode_text(text)),
            HostKind::Element { tag, attributes } => {
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
                for child in &entry.children {
                    self.write_html(*child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

/// A scoped off-screen mount: its own host tree with a hidden root.
///
/// One is allocated per headless pipeline invocation so concurrent runs never
/// share a surface; dropping it releases everything it held.
#[derive(Debug)]
pub struct OffscreenMount {
    tree: HostTree,
    root: HostId,
}

impl OffscreenMount {
    /// Allocate a fresh off-screen mount.
    pub fn allocate() -> Self {
        let mut tree = HostTree::new();
        let root = tree.create_element("div");
        tree.set_attribute(root, "style", Some("display: none".to_string()));
        Self { tree, root }
    }

    pub fn root(&self) -> HostId {
        self.root
    }

    pub fn tree(&self) -> &HostTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut HostTree {
        &mut self.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use trellis_widgets::CHILDREN_MARKER_ATTR;

    #[test]
    fn append_detaches_from_previous_parent() {
        let mut tree = HostTree::new();
        let a = tree.create_element("div");
        let b = tree.create_element("div");
        let child = tree.create_text("x");

        tree.append(a, child);
        tree.append(b, child);

        assert!(tree.children(a).is_empty());
        assert_eq!(tree.children(b), &[child]);
    }

    #[test]
    fn move_children_preserves_order() {
        let mut tree = HostTree::new();
        let from = tree.create_element("div");
        let to = tree.create_element("div");
        let one = tree.create_text("1");
        let two = tree.create_text("2");
        let three = tree.create_text("3");
        for c in [one, two, three] {
            tree.append(from, c);
        }

        tree.move_children(from, to);

        assert!(tree.children(from).is_empty());
        assert_eq!(tree.children(to), &[one, two, three]);
        assert_eq!(tree.to_html(to), "<div>123</div>");
    }

    #[test]
    fn finds_marker_attribute_depth_first() {
        let mut tree = HostTree::new();
        let root = tree.create_element("button");
        let span = tree.create_element("span");
        tree.set_attribute(span, CHILDREN_MARKER_ATTR, None);
        let inner = tree.create_element("b");
        tree.append(root, inner);
        tree.append(inner, span);

        assert_eq!(tree.find_by_attribute(root, CHILDREN_MARKER_ATTR), Some(span));
        assert_eq!(tree.find_by_attribute(span, "missing"), None);
    }

    #[test]
    fn remove_subtree_releases_every_node() {
        let mut tree = HostTree::new();
        let root = tree.create_element("div");
        let child = tree.create_element("span");
        let text = tree.create_text("x");
        tree.append(root, child);
        tree.append(child, text);

        tree.remove_subtree(child);

        assert!(tree.contains(root));
        assert!(!tree.contains(child));
        assert!(!tree.contains(text));
        assert_eq!(tree.len(), 1);

        // removing again is a no-op
        tree.remove_subtree(child);
    }

    #[test]
    fn mounts_vnodes_with_bare_attributes() {
        let mut tree = HostTree::new();
        let root = tree.create_element("div");
        let vnode = VNode::element("button")
            .with_attr("class", "btn")
            .with_bare_attr("disabled")
            .with_child(VNode::text("go"));

        tree.mount(root, &vnode);

        assert_eq!(
            tree.to_html(root),
            "<div><button class=\"btn\" disabled>go</button></div>"
        );
    }

    #[test]
    fn offscreen_mount_is_hidden_and_scoped() {
        let mount = OffscreenMount::allocate();
        assert_eq!(
            mount.tree().attribute(mount.root(), "style"),
            Some(&Some("display: none".to_string()))
        );
    }
}
