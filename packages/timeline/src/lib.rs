//! # Vidnote Timeline
//!
//! Timecodes, the markups that own them, and playback-position queries.

mod index;
mod timecode;

pub use index::{active_at, format_clock};
pub use timecode::{Markup, MarkupPatch, MarkupSummary, Timecode};
