//! # Document Model
//!
//! Immutable value tree for a rich-text body.
//!
//! ```text
//! Document
//!   └── Block*        paragraph | heading | quote | list | code | image | opaque
//!         └── Inline* text | link | linebreak | image | opaque
//! ```
//!
//! Nodes are owned by their parent and compared structurally. Display keys
//! are not part of the model; renderers derive them from sibling position.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage-relative path of a binary asset (e.g. `/timecodes-images/1700000000-cat.png`).
///
/// This is the only image reference a persisted document may hold.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicalPath(String);

impl LogicalPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for LogicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LogicalPath {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for LogicalPath {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Short-lived fetch URL issued by blob storage for a [`LogicalPath`].
///
/// Never persisted: it expires and is re-derived on every read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolvedUrl(String);

impl ResolvedUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResolvedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResolvedUrl {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

bitflags! {
    /// Inline text styling flags. Any combination may be set.
    ///
    /// Bits outside the named flags are retained so that editor-specific
    /// formats (subscript, highlight, ...) survive a round trip.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FormatBits: u32 {
        const BOLD = 1;
        const ITALIC = 2;
        const UNDERLINE = 4;
        const STRIKETHROUGH = 8;
        const CODE = 16;
    }
}

impl FormatBits {
    pub fn from_raw(bits: u32) -> Self {
        Self::from_bits_retain(bits)
    }
}

/// Paragraph alignment as written by the editor's `format` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Alignment {
    #[default]
    Unset,
    Left,
    Start,
    Center,
    Right,
    End,
    Justify,
}

impl Alignment {
    /// Unknown strings fall back to [`Alignment::Unset`].
    pub fn from_wire(value: &str) -> Self {
        match value {
            "left" => Alignment::Left,
            "start" => Alignment::Start,
            "center" => Alignment::Center,
            "right" => Alignment::Right,
            "end" => Alignment::End,
            "justify" => Alignment::Justify,
            _ => Alignment::Unset,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            Alignment::Unset => "",
            Alignment::Left => "left",
            Alignment::Start => "start",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::End => "end",
            Alignment::Justify => "justify",
        }
    }
}

/// Heading level, always within `1..=6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    pub const DEFAULT: HeadingLevel = HeadingLevel(2);

    /// Returns `None` outside `1..=6`.
    pub fn new(level: i64) -> Option<Self> {
        if (1..=6).contains(&level) {
            Some(HeadingLevel(level as u8))
        } else {
            None
        }
    }

    /// Out-of-range or absent levels become [`HeadingLevel::DEFAULT`].
    pub fn new_or_default(level: Option<i64>) -> Self {
        level.and_then(Self::new).unwrap_or(Self::DEFAULT)
    }

    /// Parses a tag such as `h3` / `H3`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let digits = tag
            .strip_prefix('h')
            .or_else(|| tag.strip_prefix('H'))?;
        if digits.len() != 1 {
            return None;
        }
        digits.parse::<i64>().ok().and_then(Self::new)
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    pub fn tag(&self) -> String {
        format!("h{}", self.0)
    }
}

impl Default for HeadingLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Embedded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub src: LogicalPath,
    pub alt_text: String,
    /// Fetchable URL shown while editing. Transient: stripped before storage.
    pub preview_hint: Option<ResolvedUrl>,
}

impl Image {
    pub fn new(src: impl Into<LogicalPath>, alt_text: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            alt_text: alt_text.into(),
            preview_hint: None,
        }
    }

    pub fn with_preview(mut self, preview: ResolvedUrl) -> Self {
        self.preview_hint = Some(preview);
        self
    }
}

/// Run of text sharing one set of format bits.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Text {
    pub content: String,
    pub format: FormatBits,
    /// Inline CSS from the editor's font-size control, rendered as a
    /// `<span style>` around the formatted run.
    pub style: Option<String>,
}

/// Character-level node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(Text),
    Link { href: String, children: Vec<Inline> },
    LineBreak,
    Image(Image),
    /// Unrecognized inline kind; only its children are kept.
    Opaque { kind: String, children: Vec<Inline> },
}

impl Inline {
    pub fn text(content: impl Into<String>) -> Self {
        Inline::Text(Text {
            content: content.into(),
            ..Default::default()
        })
    }

    pub fn formatted(content: impl Into<String>, format: FormatBits) -> Self {
        Inline::Text(Text {
            content: content.into(),
            format,
            style: None,
        })
    }

    pub fn link(href: impl Into<String>, children: Vec<Inline>) -> Self {
        Inline::Link {
            href: href.into(),
            children,
        }
    }
}

/// Ordered or bulleted list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    pub ordered: bool,
    pub start: u32,
    pub items: Vec<ListItem>,
}

impl List {
    pub fn new(ordered: bool, items: Vec<ListItem>) -> Self {
        Self {
            ordered,
            start: 1,
            items,
        }
    }
}

/// One list entry: its inline content followed by any nested lists.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListItem {
    pub children: Vec<Inline>,
    pub nested: Vec<List>,
}

impl ListItem {
    pub fn new(children: Vec<Inline>) -> Self {
        Self {
            children,
            nested: Vec::new(),
        }
    }
}

/// Structural node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph {
        alignment: Alignment,
        children: Vec<Inline>,
    },
    Heading {
        level: HeadingLevel,
        children: Vec<Inline>,
    },
    Quote {
        children: Vec<Block>,
    },
    List(List),
    Code {
        language: Option<String>,
        children: Vec<Inline>,
    },
    Image(Image),
    /// Unrecognized block kind; only its children are kept.
    Opaque { kind: String, children: Vec<Node> },
}

impl Block {
    pub fn paragraph(children: Vec<Inline>) -> Self {
        Block::Paragraph {
            alignment: Alignment::Unset,
            children,
        }
    }

    pub fn aligned_paragraph(alignment: Alignment, children: Vec<Inline>) -> Self {
        Block::Paragraph {
            alignment,
            children,
        }
    }

    /// Levels outside `1..=6` (or `None`) become level 2.
    pub fn heading(level: Option<i64>, children: Vec<Inline>) -> Self {
        Block::Heading {
            level: HeadingLevel::new_or_default(level),
            children,
        }
    }

    pub fn quote(children: Vec<Block>) -> Self {
        Block::Quote { children }
    }

    pub fn code(language: Option<String>, children: Vec<Inline>) -> Self {
        Block::Code { language, children }
    }

    pub fn image(src: impl Into<LogicalPath>, alt_text: impl Into<String>) -> Self {
        Block::Image(Image::new(src, alt_text))
    }

    pub fn opaque(kind: impl Into<String>, children: Vec<Node>) -> Self {
        Block::Opaque {
            kind: kind.into(),
            children,
        }
    }
}

/// Child of an opaque block, which may hold either node category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Block(Block),
    Inline(Inline),
}

/// Rich-text body: exactly one root holding blocks in display order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Single plain paragraph holding `text` verbatim.
    pub fn plain_text(text: impl Into<String>) -> Self {
        Self::new(vec![Block::paragraph(vec![Inline::text(text)])])
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Copy with every image preview hint removed, ready for persistence.
    pub fn without_preview_hints(&self) -> Document {
        let mut copy = self.clone();
        crate::visitor::VisitorMut::visit_document_mut(&mut StripPreviews, &mut copy);
        copy
    }
}

struct StripPreviews;

impl crate::visitor::VisitorMut for StripPreviews {
    fn visit_image_mut(&mut self, image: &mut Image) {
        image.preview_hint = None;
    }
}
