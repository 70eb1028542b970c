use crate::collect::collect_image_paths;
use crate::resolve::{resolve_all, ResolutionMap};
use vidnote_document::Document;
use vidnote_renderer::{render_with_options, MarkupTree, RenderOptions};
use vidnote_store::BlobStore;

/// One render pass: collect image paths, resolve them once each, render.
///
/// The resolution map lives only as long as the pass.
#[derive(Debug, Clone, Default)]
pub struct RenderPass {
    pub options: RenderOptions,
}

impl RenderPass {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Resolve every image referenced by `docs`.
    pub async fn resolve<'a, S>(&self, store: &S, docs: impl IntoIterator<Item = &'a Document>) -> ResolutionMap
    where
        S: BlobStore + ?Sized,
    {
        let paths = collect_image_paths(docs);
        resolve_all(store, &paths).await
    }

    /// Render with an already resolved map.
    pub fn render(&self, doc: &Document, map: &ResolutionMap) -> MarkupTree {
        render_with_options(doc, |path| map.get(path), &self.options)
    }

    pub async fn run<S>(&self, store: &S, doc: &Document) -> MarkupTree
    where
        S: BlobStore + ?Sized,
    {
        let map = self.resolve(store, [doc]).await;
        self.render(doc, &map)
    }

    /// Render several documents sharing one resolution map, so an image used
    /// in more than one of them is still resolved once.
    pub async fn run_many<S>(&self, store: &S, docs: &[&Document]) -> Vec<MarkupTree>
    where
        S: BlobStore + ?Sized,
    {
        let map = self.resolve(store, docs.iter().copied()).await;
        docs.iter().map(|doc| self.render(doc, &map)).collect()
    }
}
