use crate::markup::{MarkupNode, MarkupTree};

/// Options for HTML emission
#[derive(Debug, Clone, Default)]
pub struct HtmlOptions {
    /// Put each top-level node on its own line. Nested content is never
    /// reflowed, since whitespace inside inline runs is significant.
    pub line_per_block: bool,
}

struct Context {
    options: HtmlOptions,
    buffer: String,
}

impl Context {
    fn new(options: HtmlOptions) -> Self {
        Self {
            options,
            buffer: String::new(),
        }
    }

    fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn get_output(self) -> String {
        self.buffer
    }
}

pub fn to_html(tree: &MarkupTree) -> String {
    to_html_with_options(tree, HtmlOptions::default())
}

pub fn to_html_with_options(tree: &MarkupTree, options: HtmlOptions) -> String {
    let mut ctx = Context::new(options);

    for (i, node) in tree.nodes.iter().enumerate() {
        if i > 0 && ctx.options.line_per_block {
            ctx.add("\n");
        }
        write_node(&mut ctx, node);
    }

    ctx.get_output()
}

fn write_node(ctx: &mut Context, node: &MarkupNode) {
    match node {
        MarkupNode::Text { content } => ctx.add(&escape_html(content)),
        MarkupNode::Element {
            tag,
            attributes,
            children,
            ..
        } => {
            ctx.add("<");
            ctx.add(tag);
            for (name, value) in attributes {
                ctx.add(&format!(" {}=\"{}\"", name, escape_html(value)));
            }

            if is_self_closing(tag) {
                ctx.add("/>");
                return;
            }

            ctx.add(">");
            for child in children {
                write_node(ctx, child);
            }
            ctx.add(&format!("</{}>", tag));
        }
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn is_self_closing(tag: &str) -> bool {
    matches!(tag, "img" | "br" | "hr" | "wbr" | "source")
}
