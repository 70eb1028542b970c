use tempfile::TempDir;
use vidnote_document::{deserialize_lossy, Block, Document, Image, Inline, ResolvedUrl};
use vidnote_store::{JsonFileMarkupStore, MarkupStore, StoreError};
use vidnote_timeline::{Markup, MarkupPatch, Timecode};

fn sample() -> Markup {
    let body = Document::new(vec![
        Block::heading(Some(2), vec![Inline::text("Setup")]),
        Block::Image(
            Image::new("/timecodes-images/1-diagram.png", "diagram")
                .with_preview(ResolvedUrl::from("https://dl.test/expiring?sig=abc")),
        ),
    ]);
    let mut markup = Markup::new("Lecture 3", "/timecodes/1700000000000-0a1b2c3d4e5f.mp4");
    markup.timecodes = vec![Timecode::new("t1", 12.0, 17.0)
        .with_title("Setup")
        .with_body(body)];
    markup
}

#[tokio::test]
async fn test_save_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileMarkupStore::open(dir.path()).await.unwrap();

    let id = store.save(sample()).await.unwrap();
    let loaded = store.load(&id).await.unwrap();

    assert_eq!(loaded.title, "Lecture 3");
    assert_eq!(loaded.timecodes.len(), 1);
    assert_eq!(loaded.timecodes[0].body, sample().timecodes[0].body.without_preview_hints());
}

#[tokio::test]
async fn test_resolved_urls_never_hit_disk() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileMarkupStore::open(dir.path()).await.unwrap();

    let id = store.save(sample()).await.unwrap();
    let raw = std::fs::read_to_string(dir.path().join(format!("{}.json", id))).unwrap();

    assert!(!raw.contains("dl.test"));
    assert!(raw.contains("/timecodes-images/1-diagram.png"));
}

#[tokio::test]
async fn test_records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let id = {
        let store = JsonFileMarkupStore::open(dir.path()).await.unwrap();
        store.save(sample()).await.unwrap()
    };

    let store = JsonFileMarkupStore::open(dir.path()).await.unwrap();
    let list = store.list().await.unwrap();

    assert_eq!(list.len(), 1);
    assert_eq!(list[0].id, id);
}

#[tokio::test]
async fn test_update_and_delete() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileMarkupStore::open(dir.path()).await.unwrap();
    let id = store.save(sample()).await.unwrap();

    store
        .update(
            &id,
            MarkupPatch {
                title: Some("Renamed".into()),
                timecodes: None,
            },
        )
        .await
        .unwrap();
    let loaded = store.load(&id).await.unwrap();
    assert_eq!(loaded.title, "Renamed");
    assert_eq!(loaded.timecodes.len(), 1);

    store.delete(&id).await.unwrap();
    assert_eq!(store.load(&id).await, Err(StoreError::NotFound(id.clone())));
    assert_eq!(store.delete(&id).await, Err(StoreError::NotFound(id)));
}

#[tokio::test]
async fn test_hostile_ids_miss() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileMarkupStore::open(dir.path()).await.unwrap();

    assert!(matches!(store.load("../etc/passwd").await, Err(StoreError::NotFound(_))));
    assert!(matches!(store.delete("").await, Err(StoreError::NotFound(_))));
}

#[tokio::test]
async fn test_corrupt_record_is_skipped_in_listing() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileMarkupStore::open(dir.path()).await.unwrap();
    store.save(sample()).await.unwrap();
    std::fs::write(dir.path().join("broken.json"), b"{not json").unwrap();

    assert_eq!(store.list().await.unwrap().len(), 1);
    assert!(matches!(store.load("broken").await, Err(StoreError::Unavailable(_))));
}

#[tokio::test]
async fn test_plain_text_bodies_load() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("legacy.json"),
        br#"{"_id":"legacy","title":"Old","videoPath":"/timecodes/old.mp4",
            "timecodes":[{"_id":"a","timeStart":0,"timeEnd":5,"title":"t","text":"just text"}]}"#,
    )
    .unwrap();
    let store = JsonFileMarkupStore::open(dir.path()).await.unwrap();

    let loaded = store.load("legacy").await.unwrap();
    assert_eq!(loaded.timecodes[0].body, deserialize_lossy("just text"));
}

#[tokio::test]
async fn test_failed_write_keeps_prior_record() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileMarkupStore::open(dir.path()).await.unwrap();
    let mut markup = sample();
    markup.title = "kept".into();
    let id = store.save(markup).await.unwrap();
    let listed = store.list().await.unwrap();

    // A directory squatting on the temp path makes the write fail.
    std::fs::create_dir(dir.path().join(format!(".{}.json.tmp", id))).unwrap();
    let result = store
        .update(
            &id,
            MarkupPatch {
                title: Some("lost".into()),
                timecodes: Some(vec![]),
            },
        )
        .await;

    assert!(matches!(result, Err(StoreError::Unavailable(_))));
    let loaded = store.load(&id).await.unwrap();
    assert_eq!(loaded.title, "kept");
    assert_eq!(loaded.timecodes.len(), 1);
    assert_eq!(store.list().await.unwrap(), listed);
}
