use std::sync::Arc;
use vidnote_resolver::RenderPass;
use vidnote_store::{BlobStore, MarkupStore};

/// Shared handler state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub markups: Arc<dyn MarkupStore>,
    pub blobs: Arc<dyn BlobStore>,
    /// Admin routes refuse to run while this is unset.
    pub admin_password: Option<Arc<str>>,
    pub video_folder: Arc<str>,
    pub image_folder: Arc<str>,
    pub render: RenderPass,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(markups: Arc<dyn MarkupStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            markups,
            blobs,
            admin_password: None,
            video_folder: Arc::from("/timecodes"),
            image_folder: Arc::from("/timecodes-images"),
            render: RenderPass::default(),
            max_upload_bytes: 1024 * 1024 * 1024,
        }
    }

    pub fn with_admin_password(mut self, password: Option<String>) -> Self {
        self.admin_password = password.map(Arc::from);
        self
    }

    pub fn with_folders(mut self, video: &str, image: &str) -> Self {
        self.video_folder = Arc::from(video);
        self.image_folder = Arc::from(image);
        self
    }

    pub fn with_max_upload_bytes(mut self, limit: usize) -> Self {
        self.max_upload_bytes = limit;
        self
    }
}
