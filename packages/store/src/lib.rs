//! # Vidnote Store
//!
//! The two collaborators the rest of the system talks to: blob storage for
//! videos and images, and markup persistence.
//!
//! Both sit behind traits ([`BlobStore`], [`MarkupStore`]) with an in-memory
//! implementation for tests and local runs next to the real one.

mod blob;
mod disk_api;
mod error;
mod file_store;
mod markup_store;
pub mod naming;

pub use blob::{BlobStore, MemoryBlobStore};
pub use disk_api::{DiskApiBlobStore, DEFAULT_API_BASE};
pub use error::{BlobError, BlobResult, StoreError, StoreResult};
pub use file_store::JsonFileMarkupStore;
pub use markup_store::{MarkupStore, MemoryMarkupStore};
