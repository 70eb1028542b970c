use futures::future::join_all;
use std::collections::HashMap;
use tracing::{debug, warn};
use vidnote_document::{Document, Image, LogicalPath, ResolvedUrl, VisitorMut};
use vidnote_store::BlobStore;

/// Resolutions for one render pass. Never cached beyond it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionMap {
    urls: HashMap<LogicalPath, ResolvedUrl>,
    failed: Vec<LogicalPath>,
}

impl ResolutionMap {
    pub fn get(&self, path: &LogicalPath) -> Option<ResolvedUrl> {
        self.urls.get(path).cloned()
    }

    /// Paths whose resolution failed this pass, in request order.
    pub fn failed(&self) -> &[LogicalPath] {
        &self.failed
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// A copy of `doc` whose images carry their resolved URL as preview hint.
    /// `doc` itself is left untouched.
    pub fn annotate(&self, doc: &Document) -> Document {
        let mut copy = doc.clone();
        PreviewAnnotator { map: self }.visit_document_mut(&mut copy);
        copy
    }
}

struct PreviewAnnotator<'a> {
    map: &'a ResolutionMap,
}

impl VisitorMut for PreviewAnnotator<'_> {
    fn visit_image_mut(&mut self, image: &mut Image) {
        image.preview_hint = self.map.get(&image.src);
    }
}

/// Resolve every path with one concurrent call each.
///
/// Failures are logged and recorded; they never cancel the other calls.
pub async fn resolve_all<S>(store: &S, paths: &[LogicalPath]) -> ResolutionMap
where
    S: BlobStore + ?Sized,
{
    let results = join_all(paths.iter().map(|path| async move {
        (path, store.resolve_download_url(path).await)
    }))
    .await;

    let mut map = ResolutionMap::default();
    for (path, result) in results {
        match result {
            Ok(url) => {
                map.urls.insert(path.clone(), url);
            }
            Err(e) => {
                warn!(path = %path, error = %e, "image resolution failed; using logical path");
                map.failed.push(path.clone());
            }
        }
    }

    debug!(resolved = map.urls.len(), failed = map.failed.len(), "resolution pass done");
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidnote_document::Block;
    use vidnote_store::MemoryBlobStore;

    #[tokio::test]
    async fn test_partial_failure() {
        let store = MemoryBlobStore::new("https://dl.test");
        store.insert("/ok.png", vec![]).await;
        store.insert("/bad.png", vec![]).await;
        store.fail_resolution("/bad.png").await;

        let paths = vec![LogicalPath::from("/bad.png"), LogicalPath::from("/ok.png")];
        let map = resolve_all(&store, &paths).await;

        assert_eq!(
            map.get(&LogicalPath::from("/ok.png")),
            Some(ResolvedUrl::from("https://dl.test/ok.png"))
        );
        assert_eq!(map.get(&LogicalPath::from("/bad.png")), None);
        assert_eq!(map.failed(), &[LogicalPath::from("/bad.png")]);
    }

    #[tokio::test]
    async fn test_annotate_leaves_original_untouched() {
        let store = MemoryBlobStore::new("https://dl.test");
        store.insert("/a.png", vec![]).await;
        let doc = Document::new(vec![Block::image("/a.png", ""), Block::image("/gone.png", "")]);

        let map = resolve_all(&store, &[LogicalPath::from("/a.png"), LogicalPath::from("/gone.png")]).await;
        let annotated = map.annotate(&doc);

        assert_eq!(doc, Document::new(vec![Block::image("/a.png", ""), Block::image("/gone.png", "")]));
        match (&annotated.blocks[0], &annotated.blocks[1]) {
            (Block::Image(a), Block::Image(gone)) => {
                assert_eq!(a.preview_hint, Some(ResolvedUrl::from("https://dl.test/a.png")));
                assert_eq!(gone.preview_hint, None);
            }
            other => panic!("unexpected blocks {:?}", other),
        }
        assert_eq!(annotated.without_preview_hints(), doc);
    }
}
