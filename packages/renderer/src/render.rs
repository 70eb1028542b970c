use crate::markup::{MarkupNode, MarkupTree};
use vidnote_document::{
    Alignment, Block, Document, FormatBits, HeadingLevel, Image, Inline, List, LogicalPath, Node,
    ResolvedUrl, Text,
};

pub const IMAGE_CLASS: &str = "max-w-full rounded block mx-auto";
pub const QUOTE_CLASS: &str = "mt-4 border-l-2 pl-4 italic text-muted-foreground";

/// Options for a render pass
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Attach typography classes to headings, quotes, images and aligned
    /// paragraphs.
    pub typography: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { typography: true }
    }
}

/// Class list for a heading of the given level.
pub fn heading_class(level: HeadingLevel) -> &'static str {
    match level.get() {
        1 => "scroll-m-20 text-4xl font-extrabold tracking-tight lg:text-5xl",
        3 => "scroll-m-20 text-2xl font-semibold tracking-tight",
        4 => "scroll-m-20 text-xl font-semibold tracking-tight",
        5 => "scroll-m-20 text-lg font-semibold tracking-tight",
        6 => "scroll-m-20 text-base font-semibold tracking-tight",
        _ => "scroll-m-20 text-3xl font-semibold tracking-tight",
    }
}

fn alignment_class(alignment: Alignment) -> Option<&'static str> {
    match alignment {
        Alignment::Center => Some("text-center"),
        Alignment::Right | Alignment::End => Some("text-right"),
        Alignment::Justify => Some("text-justify"),
        Alignment::Unset | Alignment::Left | Alignment::Start => None,
    }
}

struct Context<'a, F> {
    options: &'a RenderOptions,
    resolve: &'a F,
    in_code: bool,
}

impl<'a, F> Context<'a, F>
where
    F: Fn(&LogicalPath) -> Option<ResolvedUrl>,
{
    fn class(&self, node: MarkupNode, class: Option<&str>) -> MarkupNode {
        if self.options.typography {
            node.with_optional_attr("class", class)
        } else {
            node
        }
    }

    fn image_src(&self, image: &Image) -> String {
        match (self.resolve)(&image.src) {
            Some(url) => url.as_str().to_string(),
            None => image.src.as_str().to_string(),
        }
    }
}

/// Render with default options.
pub fn render<F>(doc: &Document, resolve: F) -> MarkupTree
where
    F: Fn(&LogicalPath) -> Option<ResolvedUrl>,
{
    render_with_options(doc, resolve, &RenderOptions::default())
}

/// Render a document into presentation markup.
///
/// `resolve` maps an image's logical path to a displayable URL. When it
/// returns `None` the logical path itself is used as the source. Rendering
/// is pure: the same inputs always yield the same tree.
pub fn render_with_options<F>(doc: &Document, resolve: F, options: &RenderOptions) -> MarkupTree
where
    F: Fn(&LogicalPath) -> Option<ResolvedUrl>,
{
    let ctx = Context {
        options,
        resolve: &resolve,
        in_code: false,
    };

    MarkupTree::new(render_blocks(&ctx, &doc.blocks))
}

fn render_blocks<F>(ctx: &Context<F>, blocks: &[Block]) -> Vec<MarkupNode>
where
    F: Fn(&LogicalPath) -> Option<ResolvedUrl>,
{
    let mut nodes = Vec::new();
    for block in blocks {
        render_block(ctx, block, &mut nodes);
    }
    keyed(nodes)
}

fn render_block<F>(ctx: &Context<F>, block: &Block, out: &mut Vec<MarkupNode>)
where
    F: Fn(&LogicalPath) -> Option<ResolvedUrl>,
{
    match block {
        Block::Paragraph {
            alignment,
            children,
        } => {
            let p = ctx.class(MarkupNode::element("p"), alignment_class(*alignment));
            // An empty paragraph keeps its vertical space.
            let p = if children.is_empty() {
                p.with_child(MarkupNode::element("br"))
            } else {
                p.with_children(render_inlines(ctx, children))
            };
            out.push(p);
        }
        Block::Heading { level, children } => {
            let h = ctx.class(MarkupNode::element(level.tag()), Some(heading_class(*level)));
            out.push(h.with_children(render_inlines(ctx, children)));
        }
        Block::Quote { children } => {
            let quote = ctx.class(MarkupNode::element("blockquote"), Some(QUOTE_CLASS));
            out.push(quote.with_children(render_blocks(ctx, children)));
        }
        Block::List(list) => out.push(render_list(ctx, list)),
        Block::Code { language, children } => {
            let code_ctx = Context {
                options: ctx.options,
                resolve: ctx.resolve,
                in_code: true,
            };
            let code = MarkupNode::element("code")
                .with_optional_attr("class", language.as_ref().map(|l| format!("language-{}", l)))
                .with_children(render_inlines(&code_ctx, children));
            out.push(MarkupNode::element("pre").with_child(code));
        }
        Block::Image(image) => out.push(render_image(ctx, image)),
        Block::Opaque { children, .. } => {
            for child in children {
                match child {
                    Node::Block(block) => render_block(ctx, block, out),
                    Node::Inline(inline) => render_inline(ctx, inline, out),
                }
            }
        }
    }
}

fn render_list<F>(ctx: &Context<F>, list: &List) -> MarkupNode
where
    F: Fn(&LogicalPath) -> Option<ResolvedUrl>,
{
    let tag = if list.ordered { "ol" } else { "ul" };
    let mut node = MarkupNode::element(tag);
    if list.ordered && list.start != 1 {
        node = node.with_attr("start", list.start.to_string());
    }

    let items = list
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let mut li = MarkupNode::element("li")
                .with_key(i)
                .with_children(render_inlines(ctx, &item.children));
            for nested in &item.nested {
                li = li.with_child(render_list(ctx, nested));
            }
            li
        })
        .collect();

    node.with_children(items)
}

fn render_image<F>(ctx: &Context<F>, image: &Image) -> MarkupNode
where
    F: Fn(&LogicalPath) -> Option<ResolvedUrl>,
{
    let img = MarkupNode::element("img")
        .with_attr("src", ctx.image_src(image))
        .with_attr("alt", image.alt_text.clone())
        .with_attr("loading", "lazy");
    ctx.class(img, Some(IMAGE_CLASS))
}

fn render_inlines<F>(ctx: &Context<F>, inlines: &[Inline]) -> Vec<MarkupNode>
where
    F: Fn(&LogicalPath) -> Option<ResolvedUrl>,
{
    let mut nodes = Vec::new();
    for inline in inlines {
        render_inline(ctx, inline, &mut nodes);
    }
    nodes
}

fn render_inline<F>(ctx: &Context<F>, inline: &Inline, out: &mut Vec<MarkupNode>)
where
    F: Fn(&LogicalPath) -> Option<ResolvedUrl>,
{
    match inline {
        Inline::Text(text) => out.push(render_text(text)),
        Inline::Link { href, children } => out.push(
            MarkupNode::element("a")
                .with_attr("href", href.clone())
                .with_children(render_inlines(ctx, children)),
        ),
        Inline::LineBreak if ctx.in_code => out.push(MarkupNode::text("\n")),
        Inline::LineBreak => out.push(MarkupNode::element("br")),
        Inline::Image(image) => out.push(render_image(ctx, image)),
        Inline::Opaque { children, .. } => {
            for child in children {
                render_inline(ctx, child, out);
            }
        }
    }
}

/// Wraps from the inside out: code, s, u, em, strong. Bold is always the
/// outermost element.
fn render_text(text: &Text) -> MarkupNode {
    const WRAPPERS: [(FormatBits, &str); 5] = [
        (FormatBits::CODE, "code"),
        (FormatBits::STRIKETHROUGH, "s"),
        (FormatBits::UNDERLINE, "u"),
        (FormatBits::ITALIC, "em"),
        (FormatBits::BOLD, "strong"),
    ];

    let mut node = MarkupNode::text(text.content.clone());
    for (bit, tag) in WRAPPERS {
        if text.format.contains(bit) {
            node = MarkupNode::element(tag).with_child(node);
        }
    }

    match &text.style {
        Some(style) if !style.is_empty() => MarkupNode::element("span")
            .with_attr("style", style.clone())
            .with_child(node),
        _ => node,
    }
}

fn keyed(nodes: Vec<MarkupNode>) -> Vec<MarkupNode> {
    nodes
        .into_iter()
        .enumerate()
        .map(|(i, node)| node.with_key(i))
        .collect()
}
