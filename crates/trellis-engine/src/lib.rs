//! Headless page-builder engine for trellis.
//!
//! This crate owns the serialized project format, the mutable document tree
//! with change notification, markup parsing/generation, and stylesheet
//! rendering. The live adapter and the preview pipeline both sit on top of
//! it, sharing one widget registry.

pub mod document;
pub mod engine;
pub mod markup;
pub mod project;
pub mod style;

pub use document::{Document, DocumentEvent, NodeData, NodeId};
pub use engine::{Engine, EngineError, EngineOptions, EnginePage};
pub use markup::{parse_markup, MarkupNode};
pub use project::{
    ClassEntry, ComponentData, FrameData, PageData, ProjectData, ProjectError, SelectorEntry,
    StyleRule,
};
pub use style::render_css;
