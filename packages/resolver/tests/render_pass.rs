use std::time::{Duration, Instant};
use vidnote_document::{Block, Document, Image, Inline, LogicalPath};
use vidnote_resolver::RenderPass;
use vidnote_store::MemoryBlobStore;

const DIAGRAM: &str = "/timecodes-images/1700000000000-diagram.png";

fn repeated_image_doc() -> Document {
    Document::new(vec![
        Block::image(DIAGRAM, "first"),
        Block::paragraph(vec![
            Inline::text("again "),
            Inline::Image(Image::new(DIAGRAM, "second")),
        ]),
        Block::quote(vec![Block::image(DIAGRAM, "third")]),
    ])
}

fn image_sources(html: &str) -> Vec<String> {
    html.split("src=\"")
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_repeated_path_resolves_once() {
    let store = MemoryBlobStore::new("https://dl.test");
    store.insert(DIAGRAM, vec![0u8; 4]).await;

    let html = RenderPass::default()
        .run(&store, &repeated_image_doc())
        .await
        .to_html();

    assert_eq!(store.resolve_calls(), 1);
    assert_eq!(
        image_sources(&html),
        vec![format!("https://dl.test{}", DIAGRAM); 3]
    );
}

#[tokio::test]
async fn test_failed_resolution_falls_back_everywhere() {
    let store = MemoryBlobStore::new("https://dl.test");
    store.insert(DIAGRAM, vec![]).await;
    store.fail_resolution(DIAGRAM).await;

    let html = RenderPass::default()
        .run(&store, &repeated_image_doc())
        .await
        .to_html();

    assert_eq!(store.resolve_calls(), 1);
    assert_eq!(image_sources(&html), vec![DIAGRAM.to_string(); 3]);
}

#[tokio::test]
async fn test_one_failure_does_not_affect_others() {
    let store = MemoryBlobStore::new("https://dl.test");
    store.insert("/ok.png", vec![]).await;
    let doc = Document::new(vec![Block::image("/missing.png", ""), Block::image("/ok.png", "")]);

    let html = RenderPass::default().run(&store, &doc).await.to_html();

    assert_eq!(
        image_sources(&html),
        vec!["/missing.png".to_string(), "https://dl.test/ok.png".to_string()]
    );
}

#[tokio::test]
async fn test_each_pass_resolves_afresh() {
    let store = MemoryBlobStore::new("https://dl.test");
    store.insert(DIAGRAM, vec![]).await;
    let pass = RenderPass::default();
    let doc = repeated_image_doc();

    pass.run(&store, &doc).await;
    pass.run(&store, &doc).await;

    assert_eq!(store.resolve_calls_for(&LogicalPath::from(DIAGRAM)).await, 2);
}

#[tokio::test]
async fn test_run_many_shares_one_map() {
    let store = MemoryBlobStore::new("https://dl.test");
    store.insert(DIAGRAM, vec![]).await;
    let a = repeated_image_doc();
    let b = Document::new(vec![Block::image(DIAGRAM, "")]);

    let trees = RenderPass::default().run_many(&store, &[&a, &b]).await;

    assert_eq!(trees.len(), 2);
    assert_eq!(store.resolve_calls(), 1);
}

#[tokio::test]
async fn test_resolutions_run_concurrently() {
    let store = MemoryBlobStore::new("https://dl.test").with_latency(Duration::from_millis(200));
    let mut blocks = Vec::new();
    for i in 0..5 {
        let path = format!("/img-{}.png", i);
        store.insert(path.as_str(), vec![]).await;
        blocks.push(Block::image(path, ""));
    }
    let doc = Document::new(blocks);

    let started = Instant::now();
    RenderPass::default().run(&store, &doc).await;

    assert_eq!(store.resolve_calls(), 5);
    assert!(started.elapsed() < Duration::from_millis(900));
}

#[tokio::test]
async fn test_stored_document_is_not_mutated() {
    let store = MemoryBlobStore::new("https://dl.test");
    store.insert(DIAGRAM, vec![]).await;
    let doc = repeated_image_doc();
    let before = doc.clone();

    RenderPass::default().run(&store, &doc).await;

    assert_eq!(doc, before);
}
