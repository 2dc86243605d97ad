//! Markup round-trip pipeline for trellis.
//!
//! Takes a serialized project, reconstructs it in a headless engine,
//! extracts the generated markup and stylesheet, and rehydrates the markup
//! into live widget instances — a fully independent preview of what the
//! builder canvas shows, without the editing UI.

pub mod builder;
pub mod pipeline;
pub mod rehydrate;
pub mod templates;

pub use builder::{BuildConfig, BuildError, BuildResult, PreviewBuilder};
pub use pipeline::{Preview, PreviewError, PreviewPage, PreviewPipeline};
pub use rehydrate::{rehydrate, RenderedInstance, RenderedNode};
pub use templates::{PageContext, TemplateEngine};
