//! # Vidnote Resolver
//!
//! Rewrites image sources at read time. Stored documents only hold logical
//! paths; each render pass turns them into fetchable URLs.
//!
//! ```text
//! Document ──collect──▶ distinct paths ──resolve (concurrent)──▶ ResolutionMap
//!     │                                                               │
//!     └────────────────────────── render ◀────────────────────────────┘
//! ```

mod collect;
mod pass;
mod resolve;

pub use collect::collect_image_paths;
pub use pass::RenderPass;
pub use resolve::{resolve_all, ResolutionMap};
