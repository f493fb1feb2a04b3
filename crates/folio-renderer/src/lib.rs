//! Block document model and renderer.
//!
//! This crate provides the typed document model for content blocks and the
//! rendering pipeline that turns blocks into a backend-independent
//! [`RenderNode`] tree.
//!
//! # Architecture
//!
//! - [`document`]: [`Block`], [`BlockKind`] and [`RichTextSpan`], decoded from
//!   source payloads by [`BlockKind::from_payload`]
//! - [`RichTextRenderer`]: one text leaf per span
//! - [`BlockRendererRegistry`]: exhaustive dispatch from block variant to
//!   render node
//! - [`render_html`]: semantic HTML5 output
//!
//! Serialization of the model and render tree is behind the `serde` feature.
//!
//! # Example
//!
//! ```
//! use folio_renderer::{Block, BlockKind, BlockRendererRegistry, RichTextSpan, render_html};
//!
//! let block = Block::new("b1", BlockKind::Paragraph {
//!     rich_text: vec![RichTextSpan::plain("Hi")],
//! });
//! let nodes = BlockRendererRegistry::new().render_blocks(&[block]);
//! assert_eq!(render_html(&nodes), "<p>Hi</p>");
//! ```

pub mod document;
mod html;
mod node;
mod registry;
mod rich_text;

pub use document::{
    Annotations, Block, BlockKind, Color, DecodeError, MAX_TABLE_COLUMNS, RichTextSpan,
};
pub use html::{escape_html, render_html};
pub use node::{RenderNode, TextLeaf};
pub use registry::BlockRendererRegistry;
pub use rich_text::RichTextRenderer;
