use std::collections::HashSet;
use vidnote_document::{Document, Image, LogicalPath, Visitor};

#[derive(Default)]
struct ImagePathCollector {
    seen: HashSet<LogicalPath>,
    paths: Vec<LogicalPath>,
}

impl Visitor for ImagePathCollector {
    fn visit_image(&mut self, image: &Image) {
        if image.src.is_empty() {
            return;
        }
        if self.seen.insert(image.src.clone()) {
            self.paths.push(image.src.clone());
        }
    }
}

/// Distinct image paths of one or more documents, in order of first
/// appearance.
pub fn collect_image_paths<'a>(docs: impl IntoIterator<Item = &'a Document>) -> Vec<LogicalPath> {
    let mut collector = ImagePathCollector::default();
    for doc in docs {
        collector.visit_document(doc);
    }
    collector.paths
}
