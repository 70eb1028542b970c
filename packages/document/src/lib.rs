//! # Vidnote Document
//!
//! Rich-text bodies attached to video timecodes.
//!
//! ```text
//! editor JSON ──deserialize──▶ Document ──serialize──▶ editor JSON
//!                                 │
//!                                 └──▶ renderer / resolver (read-only)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use vidnote_document::{deserialize, serialize, Block, Document, FormatBits, Inline};
//!
//! let doc = Document::new(vec![
//!     Block::heading(Some(3), vec![Inline::text("Setup")]),
//!     Block::paragraph(vec![Inline::formatted("careful", FormatBits::BOLD | FormatBits::ITALIC)]),
//! ]);
//!
//! let stored = serialize(&doc);
//! assert_eq!(deserialize(&stored).unwrap(), doc);
//! ```

mod error;
mod model;
pub mod visitor;
mod wire;

pub use error::{ParseError, ParseResult};
pub use model::{
    Alignment, Block, Document, FormatBits, HeadingLevel, Image, Inline, List, ListItem,
    LogicalPath, Node, ResolvedUrl, Text,
};
pub use visitor::{Visitor, VisitorMut};
pub use wire::{deserialize, deserialize_lossy, from_value, serialize, to_value};
