use crate::error::{StoreError, StoreResult};
use crate::naming::new_record_id;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use vidnote_timeline::{Markup, MarkupPatch, MarkupSummary};

/// Persistence for markups.
///
/// Writes are last-write-wins per record. A failed write leaves the
/// previously stored record untouched.
#[async_trait]
pub trait MarkupStore: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<MarkupSummary>>;

    async fn load(&self, id: &str) -> StoreResult<Markup>;

    /// Insert or replace. Assigns an id and creation time when missing and
    /// returns the id.
    async fn save(&self, markup: Markup) -> StoreResult<String>;

    async fn update(&self, id: &str, patch: MarkupPatch) -> StoreResult<()>;

    async fn delete(&self, id: &str) -> StoreResult<()>;
}

/// Stored bodies only ever hold logical paths.
pub(crate) fn strip_preview_hints(markup: &mut Markup) {
    for timecode in &mut markup.timecodes {
        timecode.body = timecode.body.without_preview_hints();
    }
}

/// Fill in the fields a new record needs.
pub(crate) fn prepare_for_save(mut markup: Markup) -> Markup {
    strip_preview_hints(&mut markup);
    if markup.id.is_empty() {
        markup.id = new_record_id();
    }
    if markup.created_at.is_none() {
        markup.created_at = Some(Utc::now());
    }
    markup
}

/// Markups held in memory, listed in insertion order.
#[derive(Default)]
pub struct MemoryMarkupStore {
    records: RwLock<Vec<Markup>>,
    fail_writes: AtomicBool,
}

impl MemoryMarkupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl MarkupStore for MemoryMarkupStore {
    async fn list(&self) -> StoreResult<Vec<MarkupSummary>> {
        Ok(self.records.read().await.iter().map(Markup::summary).collect())
    }

    async fn load(&self, id: &str) -> StoreResult<Markup> {
        self.records
            .read()
            .await
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn save(&self, markup: Markup) -> StoreResult<String> {
        self.check_writable()?;
        let markup = prepare_for_save(markup);
        let id = markup.id.clone();

        let mut records = self.records.write().await;
        match records.iter_mut().find(|m| m.id == id) {
            Some(existing) => *existing = markup,
            None => records.push(markup),
        }
        Ok(id)
    }

    async fn update(&self, id: &str, patch: MarkupPatch) -> StoreResult<()> {
        self.check_writable()?;
        let mut records = self.records.write().await;
        let markup = records
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        markup.apply(patch);
        strip_preview_hints(markup);
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        self.check_writable()?;
        let mut records = self.records.write().await;
        let index = records
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        records.remove(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidnote_document::{Block, Document, Image, ResolvedUrl};
    use vidnote_timeline::Timecode;

    fn hinted_timecode(id: &str) -> Timecode {
        let image = Image::new("/timecodes-images/1-cat.png", "cat")
            .with_preview(ResolvedUrl::from("https://dl.test/cat?sig=1"));
        Timecode::new(id, 0.0, 5.0).with_body(Document::new(vec![Block::Image(image)]))
    }

    fn preview_hints(markup: &Markup) -> Vec<Option<ResolvedUrl>> {
        markup
            .timecodes
            .iter()
            .flat_map(|tc| tc.body.blocks.iter())
            .filter_map(|block| match block {
                Block::Image(image) => Some(image.preview_hint.clone()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_save_assigns_id_and_time() {
        let store = MemoryMarkupStore::new();
        let id = store.save(Markup::new("Lecture", "/timecodes/1.mp4")).await.unwrap();

        let loaded = store.load(&id).await.unwrap();
        assert_eq!(loaded.id, id);
        assert!(loaded.created_at.is_some());
        assert_eq!(
            store.list().await.unwrap(),
            vec![MarkupSummary {
                id,
                title: "Lecture".into()
            }]
        );
    }

    #[tokio::test]
    async fn test_update_replaces_fields() {
        let store = MemoryMarkupStore::new();
        let id = store.save(Markup::new("a", "/v.mp4")).await.unwrap();

        store
            .update(
                &id,
                MarkupPatch {
                    title: None,
                    timecodes: Some(vec![Timecode::new("t1", 1.0, 6.0)]),
                },
            )
            .await
            .unwrap();

        let loaded = store.load(&id).await.unwrap();
        assert_eq!(loaded.title, "a");
        assert_eq!(loaded.timecodes.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_records() {
        let store = MemoryMarkupStore::new();

        assert_eq!(store.load("nope").await, Err(StoreError::NotFound("nope".into())));
        assert_eq!(
            store.update("nope", MarkupPatch::default()).await,
            Err(StoreError::NotFound("nope".into()))
        );
        assert_eq!(store.delete("nope").await, Err(StoreError::NotFound("nope".into())));
    }

    #[tokio::test]
    async fn test_failed_update_keeps_prior_state() {
        let store = MemoryMarkupStore::new();
        let id = store.save(Markup::new("kept", "/v.mp4")).await.unwrap();

        store.fail_writes(true);
        let result = store
            .update(
                &id,
                MarkupPatch {
                    title: Some("lost".into()),
                    timecodes: None,
                },
            )
            .await;

        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert_eq!(store.load(&id).await.unwrap().title, "kept");
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryMarkupStore::new();
        let a = store.save(Markup::new("a", "/a.mp4")).await.unwrap();
        let b = store.save(Markup::new("b", "/b.mp4")).await.unwrap();

        store.delete(&a).await.unwrap();

        let ids: Vec<String> = store.list().await.unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![b]);
    }

    #[tokio::test]
    async fn test_preview_hints_are_not_stored() {
        let store = MemoryMarkupStore::new();
        let mut markup = Markup::new("a", "/v.mp4");
        markup.timecodes = vec![hinted_timecode("t1")];
        let id = store.save(markup).await.unwrap();

        assert_eq!(preview_hints(&store.load(&id).await.unwrap()), vec![None]);

        store
            .update(
                &id,
                MarkupPatch {
                    title: None,
                    timecodes: Some(vec![hinted_timecode("t1"), hinted_timecode("t2")]),
                },
            )
            .await
            .unwrap();

        let loaded = store.load(&id).await.unwrap();
        assert_eq!(preview_hints(&loaded), vec![None, None]);
        assert_eq!(loaded.timecodes[0].body, hinted_timecode("t1").body.without_preview_hints());
    }
}
