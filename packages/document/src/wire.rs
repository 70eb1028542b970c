//! # Wire Format
//!
//! Converts a [`Document`] to and from the editor's JSON state:
//!
//! ```json
//! {"root": {"type": "root", "version": 1, "children": [
//!     {"type": "heading", "tag": "h2", "children": [{"type": "text", "text": "Intro", "format": 1}]},
//!     {"type": "image", "src": "/timecodes-images/1700000000-cat.png", "altText": "cat"}
//! ]}}
//! ```
//!
//! `type` discriminates the node kind, `format` carries the alignment string on
//! paragraphs and the bit mask on text, `tag`/`level` carry heading levels.
//!
//! Reading is tolerant: a bare block is accepted as the root, unrecognized kinds
//! are kept as opaque nodes holding only their children, and text that is not
//! JSON at all is reported as [`ParseError::MalformedPayload`] (or read as plain
//! text via [`deserialize_lossy`]).
//!
//! `deserialize(serialize(d)) == d` holds for every document whose opaque nodes
//! use kinds other than the recognized ones.

use crate::error::ParseResult;
use crate::model::*;
use serde_json::{json, Map, Value};

const VERSION: u64 = 1;

/// Kinds read as inline nodes wherever the node category is ambiguous.
const INLINE_KINDS: &[&str] = &[
    "text",
    "code-highlight",
    "tab",
    "link",
    "autolink",
    "linebreak",
];

/// Numeric heading-level candidates, tried first.
const LEVEL_FIELDS: &[&[&str]] = &[
    &["level"],
    &["headingLevel"],
    &["attrs", "level"],
    &["attributes", "level"],
];

/// Tag-like heading candidates (`h1`..`h6`), tried second.
const TAG_FIELDS: &[&[&str]] = &[
    &["tag"],
    &["tagName"],
    &["name"],
    &["attrs", "tag"],
    &["attrs", "tagName"],
];

/// Serialize a document to its stored text form.
pub fn serialize(doc: &Document) -> String {
    to_value(doc).to_string()
}

/// Serialize a document to a JSON value.
pub fn to_value(doc: &Document) -> Value {
    json!({
        "root": {
            "type": "root",
            "version": VERSION,
            "direction": null,
            "format": "",
            "indent": 0,
            "children": doc.blocks.iter().map(write_block).collect::<Vec<_>>(),
        }
    })
}

/// Parse stored text into a document.
///
/// Empty input is an empty document. Input that is not JSON fails with
/// [`crate::ParseError::MalformedPayload`].
pub fn deserialize(text: &str) -> ParseResult<Document> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Document::default());
    }
    let value: Value = serde_json::from_str(trimmed)?;
    Ok(from_value(&value))
}

/// Like [`deserialize`], but a malformed payload becomes a single plain-text
/// paragraph holding the input verbatim. Never fails.
pub fn deserialize_lossy(text: &str) -> Document {
    match deserialize(text) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::debug!(error = %e, "payload is not structured, reading as plain text");
            Document::plain_text(text)
        }
    }
}

/// Read an already-parsed JSON value into a document.
pub fn from_value(value: &Value) -> Document {
    match value {
        Value::Null => Document::default(),
        Value::String(s) if s.is_empty() => Document::default(),
        Value::String(s) => Document::plain_text(s.clone()),
        Value::Bool(_) | Value::Number(_) => Document::plain_text(value.to_string()),
        Value::Array(items) => Document::new(read_blocks(items)),
        Value::Object(map) => {
            let root = match map.get("root") {
                Some(Value::Object(root)) => root,
                _ => map,
            };
            let kind = kind_of(root);
            if matches!(kind, "root" | "") && heading_tag(root).is_none() {
                Document::new(read_blocks(children_of(root)))
            } else if is_inline_kind(kind) {
                Document::new(vec![Block::paragraph(vec![read_inline(root)])])
            } else {
                Document::new(vec![read_block(root)])
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

fn element(kind: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("type".into(), Value::from(kind));
    map.insert("version".into(), Value::from(VERSION));
    map
}

fn container(kind: &str, format: &str, children: Vec<Value>) -> Map<String, Value> {
    let mut map = element(kind);
    map.insert("direction".into(), Value::Null);
    map.insert("format".into(), Value::from(format));
    map.insert("indent".into(), Value::from(0));
    map.insert("children".into(), Value::Array(children));
    map
}

fn write_block(block: &Block) -> Value {
    let map = match block {
        Block::Paragraph {
            alignment,
            children,
        } => container("paragraph", alignment.as_wire(), write_inlines(children)),
        Block::Heading { level, children } => {
            let mut map = container("heading", "", write_inlines(children));
            map.insert("tag".into(), Value::from(level.tag()));
            map
        }
        Block::Quote { children } => {
            container("quote", "", children.iter().map(write_block).collect())
        }
        Block::List(list) => return write_list(list),
        Block::Code { language, children } => {
            let mut map = container("code", "", write_inlines(children));
            if let Some(language) = language {
                map.insert("language".into(), Value::from(language.as_str()));
            }
            map
        }
        Block::Image(image) => write_image(image),
        Block::Opaque { kind, children } => container(
            kind,
            "",
            children.iter().map(write_node).collect(),
        ),
    };
    Value::Object(map)
}

fn write_node(node: &Node) -> Value {
    match node {
        Node::Block(block) => write_block(block),
        Node::Inline(inline) => {
            let mut value = write_inline(inline);
            // Images and opaque nodes read back as blocks under an opaque
            // parent unless marked.
            if matches!(inline, Inline::Image(_) | Inline::Opaque { .. }) {
                if let Value::Object(map) = &mut value {
                    map.insert("inline".into(), Value::Bool(true));
                }
            }
            value
        }
    }
}

fn write_list(list: &List) -> Value {
    let items = list
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let mut children = write_inlines(&item.children);
            children.extend(item.nested.iter().map(write_list));
            let mut map = container("listitem", "", children);
            map.insert("value".into(), Value::from(list.start as u64 + i as u64));
            Value::Object(map)
        })
        .collect();

    let mut map = container("list", "", items);
    let (list_type, tag) = if list.ordered {
        ("number", "ol")
    } else {
        ("bullet", "ul")
    };
    map.insert("listType".into(), Value::from(list_type));
    map.insert("tag".into(), Value::from(tag));
    map.insert("start".into(), Value::from(list.start));
    Value::Object(map)
}

fn write_image(image: &Image) -> Map<String, Value> {
    let mut map = element("image");
    map.insert("src".into(), Value::from(image.src.as_str()));
    map.insert("altText".into(), Value::from(image.alt_text.as_str()));
    if let Some(preview) = &image.preview_hint {
        map.insert("preview".into(), Value::from(preview.as_str()));
    }
    map
}

fn write_inlines(inlines: &[Inline]) -> Vec<Value> {
    inlines.iter().map(write_inline).collect()
}

fn write_inline(inline: &Inline) -> Value {
    let map = match inline {
        Inline::Text(text) => {
            let mut map = element("text");
            map.insert("text".into(), Value::from(text.content.as_str()));
            map.insert("format".into(), Value::from(text.format.bits()));
            map.insert("detail".into(), Value::from(0));
            map.insert("mode".into(), Value::from("normal"));
            if let Some(style) = &text.style {
                map.insert("style".into(), Value::from(style.as_str()));
            }
            map
        }
        Inline::Link { href, children } => {
            let mut map = container("link", "", write_inlines(children));
            map.insert("url".into(), Value::from(href.as_str()));
            map
        }
        Inline::LineBreak => element("linebreak"),
        Inline::Image(image) => write_image(image),
        Inline::Opaque { kind, children } => container(kind, "", write_inlines(children)),
    };
    Value::Object(map)
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

fn kind_of(map: &Map<String, Value>) -> &str {
    map.get("type").and_then(Value::as_str).unwrap_or("")
}

fn children_of(map: &Map<String, Value>) -> &[Value] {
    match map.get("children") {
        Some(Value::Array(children)) => children,
        _ => &[],
    }
}

fn lookup<'a>(map: &'a Map<String, Value>, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let value = map.get(*first)?;
    if rest.is_empty() {
        return Some(value);
    }
    match value {
        Value::Object(inner) => lookup(inner, rest),
        _ => None,
    }
}

fn level_from_number(value: &Value) -> Option<HeadingLevel> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .and_then(HeadingLevel::new),
        Value::String(s) => s.trim().parse::<i64>().ok().and_then(HeadingLevel::new),
        _ => None,
    }
}

/// Tag-like candidate matching `h1`..`h6`, if any.
fn heading_tag(map: &Map<String, Value>) -> Option<HeadingLevel> {
    TAG_FIELDS
        .iter()
        .filter_map(|path| lookup(map, path).and_then(Value::as_str))
        .find_map(HeadingLevel::from_tag)
}

/// Numeric level fields first, then tag-like fields, then level 2.
fn infer_heading_level(map: &Map<String, Value>) -> HeadingLevel {
    if let Some(level) = LEVEL_FIELDS
        .iter()
        .filter_map(|path| lookup(map, path))
        .find_map(level_from_number)
    {
        return level;
    }

    TAG_FIELDS
        .iter()
        .filter_map(|path| lookup(map, path).and_then(Value::as_str))
        .find_map(|tag| {
            HeadingLevel::from_tag(tag).or_else(|| level_from_number(&Value::from(tag)))
        })
        .unwrap_or_default()
}

fn is_inline_kind(kind: &str) -> bool {
    INLINE_KINDS.contains(&kind)
}

/// Read block-context children. Runs of inline nodes are grouped into
/// paragraphs; nested arrays are flattened.
fn read_blocks(values: &[Value]) -> Vec<Block> {
    fn flush(loose: &mut Vec<Inline>, blocks: &mut Vec<Block>) {
        if !loose.is_empty() {
            blocks.push(Block::paragraph(std::mem::take(loose)));
        }
    }

    let mut blocks = Vec::new();
    let mut loose: Vec<Inline> = Vec::new();

    for value in values {
        match value {
            Value::Object(map) if is_inline_kind(kind_of(map)) => {
                loose.push(read_inline(map));
            }
            Value::Object(map) => {
                flush(&mut loose, &mut blocks);
                blocks.push(read_block(map));
            }
            Value::Array(nested) => {
                flush(&mut loose, &mut blocks);
                blocks.extend(read_blocks(nested));
            }
            Value::String(s) => loose.push(Inline::text(s.clone())),
            other => {
                tracing::debug!(value = %other, "skipping non-node value in block position");
            }
        }
    }
    flush(&mut loose, &mut blocks);
    blocks
}

fn read_block(map: &Map<String, Value>) -> Block {
    let kind = kind_of(map);

    if kind == "heading" || heading_tag(map).is_some() {
        return Block::Heading {
            level: infer_heading_level(map),
            children: read_inlines(children_of(map)),
        };
    }

    match kind {
        "paragraph" => Block::Paragraph {
            alignment: map
                .get("format")
                .and_then(Value::as_str)
                .map(Alignment::from_wire)
                .unwrap_or_default(),
            children: read_inlines(children_of(map)),
        },
        "quote" => Block::Quote {
            children: read_blocks(children_of(map)),
        },
        "list" => Block::List(read_list(map)),
        "code" => Block::Code {
            language: map
                .get("language")
                .and_then(Value::as_str)
                .map(str::to_string),
            children: read_inlines(children_of(map)),
        },
        "image" => Block::Image(read_image(map)),
        other => {
            tracing::debug!(kind = other, "unrecognized block kind, keeping children only");
            Block::Opaque {
                kind: other.to_string(),
                children: read_nodes(children_of(map)),
            }
        }
    }
}

fn read_nodes(values: &[Value]) -> Vec<Node> {
    let mut nodes = Vec::new();
    for value in values {
        match value {
            Value::Object(map) => {
                let marked_inline = map.get("inline").and_then(Value::as_bool) == Some(true);
                if marked_inline || is_inline_kind(kind_of(map)) {
                    nodes.push(Node::Inline(read_inline(map)));
                } else {
                    nodes.push(Node::Block(read_block(map)));
                }
            }
            Value::Array(nested) => nodes.extend(read_nodes(nested)),
            Value::String(s) => nodes.push(Node::Inline(Inline::text(s.clone()))),
            _ => {}
        }
    }
    nodes
}

fn read_list(map: &Map<String, Value>) -> List {
    let ordered = map.get("listType").and_then(Value::as_str) == Some("number")
        || map.get("tag").and_then(Value::as_str) == Some("ol");
    let start = map
        .get("start")
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(1);

    let items = children_of(map)
        .iter()
        .filter_map(Value::as_object)
        .map(|child| match kind_of(child) {
            "listitem" => read_list_item(child),
            kind if is_inline_kind(kind) => ListItem::new(vec![read_inline(child)]),
            "list" => ListItem {
                children: Vec::new(),
                nested: vec![read_list(child)],
            },
            _ => read_list_item(child),
        })
        .collect();

    List {
        ordered,
        start,
        items,
    }
}

fn read_list_item(map: &Map<String, Value>) -> ListItem {
    let mut item = ListItem::default();
    for child in children_of(map).iter().filter_map(Value::as_object) {
        if kind_of(child) == "list" {
            item.nested.push(read_list(child));
        } else {
            item.children.push(read_inline(child));
        }
    }
    item
}

fn read_image(map: &Map<String, Value>) -> Image {
    let src = map
        .get("src")
        .and_then(Value::as_str)
        .or_else(|| lookup(map, &["attrs", "src"]).and_then(Value::as_str))
        .unwrap_or("");
    let alt = map
        .get("altText")
        .and_then(Value::as_str)
        .or_else(|| map.get("alt").and_then(Value::as_str))
        .unwrap_or("");

    Image {
        src: LogicalPath::new(src),
        alt_text: alt.to_string(),
        preview_hint: map
            .get("preview")
            .and_then(Value::as_str)
            .map(ResolvedUrl::new),
    }
}

fn read_inlines(values: &[Value]) -> Vec<Inline> {
    let mut inlines = Vec::new();
    for value in values {
        match value {
            Value::Object(map) => inlines.push(read_inline(map)),
            Value::Array(nested) => inlines.extend(read_inlines(nested)),
            Value::String(s) => inlines.push(Inline::text(s.clone())),
            _ => {}
        }
    }
    inlines
}

fn read_inline(map: &Map<String, Value>) -> Inline {
    match kind_of(map) {
        "text" | "code-highlight" | "tab" => Inline::Text(Text {
            content: map
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            format: FormatBits::from_raw(
                map.get("format")
                    .and_then(Value::as_u64)
                    .and_then(|n| u32::try_from(n).ok())
                    .unwrap_or(0),
            ),
            style: map.get("style").and_then(Value::as_str).map(str::to_string),
        }),
        "link" | "autolink" => Inline::Link {
            href: map
                .get("url")
                .or_else(|| map.get("href"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            children: read_inlines(children_of(map)),
        },
        "linebreak" => Inline::LineBreak,
        "image" => Inline::Image(read_image(map)),
        other => {
            tracing::debug!(kind = other, "unrecognized inline kind, keeping children only");
            Inline::Opaque {
                kind: other.to_string(),
                children: read_inlines(children_of(map)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_editor_state() {
        let stored = r#"{"root":{"children":[
            {"children":[{"detail":0,"format":3,"mode":"normal","style":"","text":"Hello","type":"text","version":1}],
             "direction":"ltr","format":"center","indent":0,"type":"paragraph","version":1},
            {"children":[],"direction":null,"format":"","indent":0,"type":"paragraph","version":1},
            {"children":[{"text":"Title","type":"text","format":0}],"tag":"h1","type":"heading","version":1}
        ],"direction":"ltr","format":"","indent":0,"type":"root","version":1}}"#;

        let doc = deserialize(stored).unwrap();

        assert_eq!(
            doc,
            Document::new(vec![
                Block::aligned_paragraph(
                    Alignment::Center,
                    vec![Inline::Text(Text {
                        content: "Hello".into(),
                        format: FormatBits::BOLD | FormatBits::ITALIC,
                        style: Some(String::new()),
                    })]
                ),
                Block::paragraph(vec![]),
                Block::heading(Some(1), vec![Inline::text("Title")]),
            ])
        );
    }

    #[test]
    fn bare_block_is_treated_as_root() {
        let doc = deserialize(r#"{"type":"paragraph","children":[{"type":"text","text":"x"}]}"#).unwrap();
        assert_eq!(doc, Document::new(vec![Block::paragraph(vec![Inline::text("x")])]));

        let doc = deserialize(r#"{"root":{"type":"quote","children":[]}}"#).unwrap();
        assert_eq!(doc, Document::new(vec![Block::quote(vec![])]));
    }

    #[test]
    fn array_payload_is_a_block_list() {
        let doc = deserialize(r#"[{"type":"image","src":"/a.png","altText":"a"}]"#).unwrap();
        assert_eq!(doc, Document::new(vec![Block::image("/a.png", "a")]));
    }

    #[test]
    fn non_json_is_malformed_and_lossy_falls_back_to_text() {
        let err = deserialize("just some notes").unwrap_err();
        assert!(matches!(err, crate::ParseError::MalformedPayload { .. }));

        assert_eq!(
            deserialize_lossy("just some notes"),
            Document::plain_text("just some notes")
        );
    }

    #[test]
    fn empty_and_null_payloads_are_empty_documents() {
        assert!(deserialize("").unwrap().is_empty());
        assert!(deserialize("   ").unwrap().is_empty());
        assert!(deserialize("null").unwrap().is_empty());
        assert!(deserialize(r#""""#).unwrap().is_empty());
    }

    #[test]
    fn unknown_block_keeps_children() {
        let doc = deserialize(
            r#"{"root":{"type":"root","children":[
                {"type":"footnote","children":[{"type":"text","text":"a"},{"type":"text","text":"b"}]}
            ]}}"#,
        )
        .unwrap();

        assert_eq!(
            doc.blocks,
            vec![Block::opaque(
                "footnote",
                vec![Node::Inline(Inline::text("a")), Node::Inline(Inline::text("b"))]
            )]
        );
    }

    #[test]
    fn unknown_wrapper_keeps_nested_valid_blocks() {
        let doc = deserialize(
            r#"{"root":{"type":"root","children":[
                {"type":"collapsible","children":[
                    {"type":"heading","tag":"h4","children":[{"type":"text","text":"inside"}]}
                ]}
            ]}}"#,
        )
        .unwrap();

        assert_eq!(
            doc.blocks,
            vec![Block::opaque(
                "collapsible",
                vec![Node::Block(Block::heading(Some(4), vec![Inline::text("inside")]))]
            )]
        );
    }

    #[test]
    fn heading_level_prefers_numeric_fields() {
        let doc = deserialize(r#"{"type":"heading","level":5,"tag":"h1","children":[]}"#).unwrap();
        assert_eq!(doc.blocks, vec![Block::heading(Some(5), vec![])]);

        let doc = deserialize(r#"{"type":"heading","attrs":{"level":"4"},"children":[]}"#).unwrap();
        assert_eq!(doc.blocks, vec![Block::heading(Some(4), vec![])]);
    }

    #[test]
    fn heading_level_from_tag_then_default() {
        let doc = deserialize(r#"{"type":"heading","tag":"h3","children":[]}"#).unwrap();
        assert_eq!(doc.blocks, vec![Block::heading(Some(3), vec![])]);

        let doc = deserialize(r#"{"type":"heading","children":[]}"#).unwrap();
        assert_eq!(doc.blocks, vec![Block::heading(None, vec![])]);

        let doc = deserialize(r#"{"type":"heading","level":9,"children":[]}"#).unwrap();
        assert_eq!(doc.blocks[0], Block::heading(Some(2), vec![]));
    }

    #[test]
    fn unknown_kind_with_heading_tag_reads_as_heading() {
        let doc = deserialize(r#"{"type":"custom-title","tagName":"H2","children":[{"type":"text","text":"t"}]}"#)
            .unwrap();
        assert_eq!(doc.blocks, vec![Block::heading(Some(2), vec![Inline::text("t")])]);
    }

    #[test]
    fn inline_images_and_loose_text_in_quotes() {
        let doc = deserialize(
            r#"{"root":{"type":"root","children":[
                {"type":"paragraph","children":[{"type":"image","src":"/p.png","altText":"p"}]},
                {"type":"quote","children":[{"type":"text","text":"said"},{"type":"linebreak"},{"type":"text","text":"twice"}]}
            ]}}"#,
        )
        .unwrap();

        assert_eq!(
            doc.blocks,
            vec![
                Block::paragraph(vec![Inline::Image(Image::new("/p.png", "p"))]),
                Block::quote(vec![Block::paragraph(vec![
                    Inline::text("said"),
                    Inline::LineBreak,
                    Inline::text("twice"),
                ])]),
            ]
        );
    }

    #[test]
    fn nested_lists() {
        let doc = deserialize(
            r#"{"type":"list","listType":"number","start":3,"tag":"ol","children":[
                {"type":"listitem","value":3,"children":[{"type":"text","text":"one"}]},
                {"type":"listitem","value":4,"children":[
                    {"type":"list","listType":"bullet","children":[
                        {"type":"listitem","children":[{"type":"text","text":"deep"}]}
                    ]}
                ]}
            ]}"#,
        )
        .unwrap();

        assert_eq!(
            doc.blocks,
            vec![Block::List(List {
                ordered: true,
                start: 3,
                items: vec![
                    ListItem::new(vec![Inline::text("one")]),
                    ListItem {
                        children: vec![],
                        nested: vec![List::new(false, vec![ListItem::new(vec![Inline::text("deep")])])],
                    },
                ],
            })]
        );
    }

    #[test]
    fn code_highlight_and_tab_read_as_text() {
        let doc = deserialize(
            r#"{"type":"code","language":"rust","children":[
                {"type":"code-highlight","text":"fn","highlightType":"keyword"},
                {"type":"tab","text":"\t"},
                {"type":"linebreak"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(
            doc.blocks,
            vec![Block::code(
                Some("rust".into()),
                vec![Inline::text("fn"), Inline::text("\t"), Inline::LineBreak]
            )]
        );
    }

    #[test]
    fn malformed_fields_take_defaults() {
        let doc = deserialize(
            r#"{"type":"paragraph","format":7,"children":[{"type":"text","format":"bold"},{"type":"link","href":"/x"}, 42]}"#,
        )
        .unwrap();

        assert_eq!(
            doc.blocks,
            vec![Block::paragraph(vec![
                Inline::text(""),
                Inline::link("/x", vec![]),
            ])]
        );
    }

    #[test]
    fn serialized_form_uses_editor_fields() {
        let doc = Document::new(vec![
            Block::heading(Some(3), vec![Inline::formatted("x", FormatBits::BOLD)]),
            Block::aligned_paragraph(Alignment::Right, vec![]),
        ]);

        let value = to_value(&doc);
        let children = &value["root"]["children"];

        assert_eq!(value["root"]["type"], "root");
        assert_eq!(children[0]["type"], "heading");
        assert_eq!(children[0]["tag"], "h3");
        assert_eq!(children[0]["children"][0]["format"], 1);
        assert_eq!(children[1]["format"], "right");
    }
}
