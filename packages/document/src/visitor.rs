use crate::model::*;

/// Visitor pattern for traversing document nodes immutably
///
/// Default implementations walk the entire tree. Override specific
/// `visit_*` methods to act on particular nodes.
pub trait Visitor: Sized {
    fn visit_document(&mut self, doc: &Document) {
        walk_document(self, doc);
    }

    fn visit_block(&mut self, block: &Block) {
        walk_block(self, block);
    }

    fn visit_list(&mut self, list: &List) {
        walk_list(self, list);
    }

    fn visit_inline(&mut self, inline: &Inline) {
        walk_inline(self, inline);
    }

    fn visit_image(&mut self, _image: &Image) {
        // Leaf node, no children to walk
    }
}

/// Mutable visitor pattern for transforming document nodes
///
/// Callers should run this over a copy; stored documents are never edited in place.
pub trait VisitorMut: Sized {
    fn visit_document_mut(&mut self, doc: &mut Document) {
        walk_document_mut(self, doc);
    }

    fn visit_block_mut(&mut self, block: &mut Block) {
        walk_block_mut(self, block);
    }

    fn visit_list_mut(&mut self, list: &mut List) {
        walk_list_mut(self, list);
    }

    fn visit_inline_mut(&mut self, inline: &mut Inline) {
        walk_inline_mut(self, inline);
    }

    fn visit_image_mut(&mut self, _image: &mut Image) {
        // Leaf node, no children to walk
    }
}

// Default walk implementations for immutable visitor

pub fn walk_document<V: Visitor>(visitor: &mut V, doc: &Document) {
    for block in &doc.blocks {
        visitor.visit_block(block);
    }
}

pub fn walk_block<V: Visitor>(visitor: &mut V, block: &Block) {
    match block {
        Block::Paragraph { children, .. }
        | Block::Heading { children, .. }
        | Block::Code { children, .. } => {
            for child in children {
                visitor.visit_inline(child);
            }
        }
        Block::Quote { children } => {
            for child in children {
                visitor.visit_block(child);
            }
        }
        Block::List(list) => visitor.visit_list(list),
        Block::Image(image) => visitor.visit_image(image),
        Block::Opaque { children, .. } => {
            for child in children {
                match child {
                    Node::Block(block) => visitor.visit_block(block),
                    Node::Inline(inline) => visitor.visit_inline(inline),
                }
            }
        }
    }
}

pub fn walk_list<V: Visitor>(visitor: &mut V, list: &List) {
    for item in &list.items {
        for child in &item.children {
            visitor.visit_inline(child);
        }
        for nested in &item.nested {
            visitor.visit_list(nested);
        }
    }
}

pub fn walk_inline<V: Visitor>(visitor: &mut V, inline: &Inline) {
    match inline {
        Inline::Link { children, .. } | Inline::Opaque { children, .. } => {
            for child in children {
                visitor.visit_inline(child);
            }
        }
        Inline::Image(image) => visitor.visit_image(image),
        Inline::Text(_) | Inline::LineBreak => {}
    }
}

// Default walk implementations for mutable visitor

pub fn walk_document_mut<V: VisitorMut>(visitor: &mut V, doc: &mut Document) {
    for block in &mut doc.blocks {
        visitor.visit_block_mut(block);
    }
}

pub fn walk_block_mut<V: VisitorMut>(visitor: &mut V, block: &mut Block) {
    match block {
        Block::Paragraph { children, .. }
        | Block::Heading { children, .. }
        | Block::Code { children, .. } => {
            for child in children {
                visitor.visit_inline_mut(child);
            }
        }
        Block::Quote { children } => {
            for child in children {
                visitor.visit_block_mut(child);
            }
        }
        Block::List(list) => visitor.visit_list_mut(list),
        Block::Image(image) => visitor.visit_image_mut(image),
        Block::Opaque { children, .. } => {
            for child in children {
                match child {
                    Node::Block(block) => visitor.visit_block_mut(block),
                    Node::Inline(inline) => visitor.visit_inline_mut(inline),
                }
            }
        }
    }
}

pub fn walk_list_mut<V: VisitorMut>(visitor: &mut V, list: &mut List) {
    for item in &mut list.items {
        for child in &mut item.children {
            visitor.visit_inline_mut(child);
        }
        for nested in &mut item.nested {
            visitor.visit_list_mut(nested);
        }
    }
}

pub fn walk_inline_mut<V: VisitorMut>(visitor: &mut V, inline: &mut Inline) {
    match inline {
        Inline::Link { children, .. } | Inline::Opaque { children, .. } => {
            for child in children {
                visitor.visit_inline_mut(child);
            }
        }
        Inline::Image(image) => visitor.visit_image_mut(image),
        Inline::Text(_) | Inline::LineBreak => {}
    }
}
