//! Widget registry for looking up type descriptors.
//!
//! Holds every registered widget type descriptor and provides lookup by tag
//! identifier for the live adapter and the rehydration pipeline. The registry
//! is an explicit value constructed once at startup and passed by reference
//! wherever it is needed; nothing in the crate keeps global state.

use std::collections::HashMap;

use crate::descriptor::{Block, WidgetDescriptor};

/// A registry of widget type descriptors.
///
/// Lookup is case-insensitive: markup tag names are case-normalized by the
/// host document format while descriptor tags may be authored in mixed case,
/// so keys are stored lowercased the same way on both sides.
#[derive(Debug, Clone, Default)]
pub struct WidgetRegistry {
    widgets: HashMap<String, WidgetDescriptor>,
    blocks: Vec<Block>,
}

impl WidgetRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor, replacing any previous one with the same tag.
    ///
    /// A descriptor carrying palette metadata also contributes an entry to
    /// the insertable-blocks catalog.
    pub fn register(&mut self, descriptor: WidgetDescriptor) {
        let key = descriptor.tag.to_lowercase();

        if let Some(palette) = &descriptor.palette {
            self.blocks.retain(|b| b.id != key);
            self.blocks.push(Block {
                id: key.clone(),
                label: palette.label.clone(),
                category: palette.category.clone(),
                content: palette.content.clone(),
            });
        }

        self.widgets.insert(key, descriptor);
    }

    /// Look up a descriptor by tag identifier (case-insensitive).
    pub fn get(&self, tag: &str) -> Option<&WidgetDescriptor> {
        self.widgets.get(&tag.to_lowercase())
    }

    /// Check whether a tag identifier is registered.
    pub fn contains(&self, tag: &str) -> bool {
        self.widgets.contains_key(&tag.to_lowercase())
    }

    /// All registered tag identifiers, as authored.
    pub fn names(&self) -> Vec<&str> {
        self.widgets.values().map(|d| d.tag.as_str()).collect()
    }

    /// The insertable-blocks catalog for the builder palette.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Number of registered widget types.
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }
}
