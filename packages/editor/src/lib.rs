//! # Vidnote Editor
//!
//! Admin-side draft state for building a markup's timecode list before it is
//! submitted.
//!
//! ```text
//!          create_draft            commit / cancel
//!   Idle ───────────────▶ Drafting ────────────────▶ Idle
//!                         │    ▲
//!                         └────┘ adjust_end
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use vidnote_document::Document;
//! use vidnote_editor::DraftSession;
//!
//! let mut session = DraftSession::new();
//! session.create_draft(12.7).unwrap();
//! session.adjust_end(5.0).unwrap();
//! let committed = session.commit("Intro", Document::plain_text("welcome")).unwrap();
//!
//! assert_eq!((committed.time_start, committed.time_end), (12.0, 22.0));
//! assert!(session.is_submittable());
//! ```

mod errors;
mod session;

pub use errors::SessionError;
pub use session::{DraftSession, DraftState, DEFAULT_DRAFT_LENGTH};
