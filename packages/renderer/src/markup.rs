use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Presentation markup node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MarkupNode {
    /// HTML element
    Element {
        tag: String,
        /// Ordered so that output is deterministic
        attributes: BTreeMap<String, String>,
        children: Vec<MarkupNode>,
        /// Position among siblings, for display-list diffing
        #[serde(skip_serializing_if = "Option::is_none")]
        key: Option<usize>,
    },

    /// Text node
    Text { content: String },
}

impl MarkupNode {
    pub fn element(tag: impl Into<String>) -> Self {
        MarkupNode::Element {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
            key: None,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        MarkupNode::Text {
            content: content.into(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let MarkupNode::Element {
            ref mut attributes, ..
        } = self
        {
            attributes.insert(key.into(), value.into());
        }
        self
    }

    pub fn with_optional_attr(self, key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.with_attr(key, value),
            None => self,
        }
    }

    pub fn with_child(mut self, child: MarkupNode) -> Self {
        if let MarkupNode::Element {
            ref mut children, ..
        } = self
        {
            children.push(child);
        }
        self
    }

    pub fn with_children(mut self, new_children: Vec<MarkupNode>) -> Self {
        if let MarkupNode::Element {
            ref mut children, ..
        } = self
        {
            children.extend(new_children);
        }
        self
    }

    pub fn with_key(mut self, index: usize) -> Self {
        if let MarkupNode::Element { ref mut key, .. } = self {
            *key = Some(index);
        }
        self
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            MarkupNode::Element { tag, .. } => Some(tag),
            MarkupNode::Text { .. } => None,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        match self {
            MarkupNode::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            MarkupNode::Text { .. } => None,
        }
    }

    pub fn children(&self) -> &[MarkupNode] {
        match self {
            MarkupNode::Element { children, .. } => children,
            MarkupNode::Text { .. } => &[],
        }
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(node: &MarkupNode, out: &mut String) {
    match node {
        MarkupNode::Text { content } => out.push_str(content),
        MarkupNode::Element { children, .. } => {
            for child in children {
                collect_text(child, out);
            }
        }
    }
}

/// Output of one render pass: the document's top-level nodes in order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MarkupTree {
    pub nodes: Vec<MarkupNode>,
}

impl MarkupTree {
    pub fn new(nodes: Vec<MarkupNode>) -> Self {
        Self { nodes }
    }

    pub fn text_content(&self) -> String {
        self.nodes.iter().map(MarkupNode::text_content).collect()
    }

    pub fn to_html(&self) -> String {
        crate::html::to_html(self)
    }
}
