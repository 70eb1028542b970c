use crate::error::{StoreError, StoreResult};
use crate::markup_store::{prepare_for_save, MarkupStore};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use vidnote_timeline::{Markup, MarkupPatch, MarkupSummary};

const RECORD_EXT: &str = "json";

/// One JSON file per markup under a data directory.
///
/// Records are written to a temporary sibling and renamed into place, so a
/// failed write never leaves a half-written record behind.
pub struct JsonFileMarkupStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileMarkupStore {
    /// Opens the store, creating `dir` if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Ids never contain path separators, so a hostile id can only miss.
    fn record_path(&self, id: &str) -> StoreResult<PathBuf> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(self.dir.join(format!("{}.{}", id, RECORD_EXT)))
    }

    async fn read_record(&self, id: &str) -> StoreResult<Markup> {
        let path = self.record_path(id)?;
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn write_record(&self, markup: &Markup) -> StoreResult<()> {
        let path = self.record_path(&markup.id)?;
        let tmp = self.dir.join(format!(".{}.{}.tmp", markup.id, RECORD_EXT));
        let bytes = serde_json::to_vec_pretty(markup)?;

        if let Err(e) = fs::write(&tmp, &bytes).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        fs::rename(&tmp, &path).await?;
        debug!(id = %markup.id, "markup written");
        Ok(())
    }
}

#[async_trait]
impl MarkupStore for JsonFileMarkupStore {
    async fn list(&self) -> StoreResult<Vec<MarkupSummary>> {
        let mut entries = fs::read_dir(&self.dir).await?;
        let mut markups = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_record = path.extension().and_then(|e| e.to_str()) == Some(RECORD_EXT)
                && !entry.file_name().to_string_lossy().starts_with('.');
            if !is_record {
                continue;
            }

            let parsed = fs::read(&path)
                .await
                .map_err(StoreError::from)
                .and_then(|bytes| serde_json::from_slice::<Markup>(&bytes).map_err(StoreError::from));
            match parsed {
                Ok(markup) => markups.push(markup),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable markup"),
            }
        }

        markups.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(markups.iter().map(Markup::summary).collect())
    }

    async fn load(&self, id: &str) -> StoreResult<Markup> {
        self.read_record(id).await
    }

    async fn save(&self, markup: Markup) -> StoreResult<String> {
        let markup = prepare_for_save(markup);
        let _guard = self.write_lock.lock().await;
        self.write_record(&markup).await?;
        Ok(markup.id)
    }

    async fn update(&self, id: &str, patch: MarkupPatch) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut markup = self.read_record(id).await?;
        markup.apply(patch);
        self.write_record(&markup).await
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let path = self.record_path(id)?;
        let _guard = self.write_lock.lock().await;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}
