//! # Vidnote Renderer
//!
//! Turns a [`vidnote_document::Document`] into presentation markup.
//!
//! ```rust
//! use vidnote_document::{Block, Document, FormatBits, Inline};
//! use vidnote_renderer::render;
//!
//! let doc = Document::new(vec![Block::paragraph(vec![Inline::formatted(
//!     "hi",
//!     FormatBits::BOLD | FormatBits::ITALIC,
//! )])]);
//!
//! let html = render(&doc, |_| None).to_html();
//! assert_eq!(html, "<p><strong><em>hi</em></strong></p>");
//! ```

pub mod html;
mod markup;
mod render;

pub use html::{to_html, to_html_with_options, HtmlOptions};
pub use markup::{MarkupNode, MarkupTree};
pub use render::{
    heading_class, render, render_with_options, RenderOptions, IMAGE_CLASS, QUOTE_CLASS,
};
