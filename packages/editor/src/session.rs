//! # Draft Session
//!
//! One admin's in-progress timecode list. At most one timecode is being
//! drafted at a time; committed timecodes accumulate in order.
//!
//! The session is an ordinary value owned by whoever drives the editor, so
//! two sessions never share state.

use crate::SessionError;
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;
use vidnote_document::Document;
use vidnote_timeline::{MarkupPatch, Timecode};

/// Seconds a fresh draft spans.
pub const DEFAULT_DRAFT_LENGTH: f64 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub enum DraftState {
    Idle,
    Drafting(Timecode),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DraftSession {
    state: DraftState,
    timecodes: Vec<Timecode>,
}

impl Default for DraftSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DraftSession {
    pub fn new() -> Self {
        Self {
            state: DraftState::Idle,
            timecodes: Vec::new(),
        }
    }

    /// Start from an existing list, e.g. one loaded from storage.
    pub fn with_timecodes(timecodes: Vec<Timecode>) -> Self {
        Self {
            state: DraftState::Idle,
            timecodes,
        }
    }

    pub fn state(&self) -> &DraftState {
        &self.state
    }

    pub fn pending(&self) -> Option<&Timecode> {
        match &self.state {
            DraftState::Drafting(tc) => Some(tc),
            DraftState::Idle => None,
        }
    }

    pub fn timecodes(&self) -> &[Timecode] {
        &self.timecodes
    }

    /// A markup can only be submitted with at least one timecode.
    pub fn is_submittable(&self) -> bool {
        !self.timecodes.is_empty()
    }

    /// Open a draft at the playback position `start`.
    ///
    /// The start is floored to whole seconds and the end set
    /// [`DEFAULT_DRAFT_LENGTH`] later.
    pub fn create_draft(&mut self, start: f64) -> Result<&Timecode, SessionError> {
        if let DraftState::Drafting(_) = self.state {
            return Err(SessionError::AlreadyDrafting);
        }
        if !start.is_finite() || start < 0.0 {
            return Err(SessionError::InvalidStart(start));
        }

        let time_start = start.floor();
        let draft = Timecode::new(draft_id(), time_start, time_start + DEFAULT_DRAFT_LENGTH);
        debug!(id = %draft.id, time_start, "draft opened");

        self.state = DraftState::Drafting(draft);
        self.pending().ok_or(SessionError::NotDrafting)
    }

    /// Move the draft's end by `delta` seconds, never below zero.
    ///
    /// The end is not checked against the start: an end before the start
    /// is allowed while drafting.
    pub fn adjust_end(&mut self, delta: f64) -> Result<f64, SessionError> {
        match &mut self.state {
            DraftState::Drafting(tc) => {
                tc.time_end = (tc.time_end + delta).max(0.0);
                Ok(tc.time_end)
            }
            DraftState::Idle => Err(SessionError::NotDrafting),
        }
    }

    /// Fill in the draft and append it to the list.
    pub fn commit(&mut self, title: impl Into<String>, body: Document) -> Result<&Timecode, SessionError> {
        let draft = match std::mem::replace(&mut self.state, DraftState::Idle) {
            DraftState::Drafting(tc) => tc,
            DraftState::Idle => return Err(SessionError::NotDrafting),
        };

        let committed = draft.with_title(title).with_body(body);
        debug!(id = %committed.id, "draft committed");
        self.timecodes.push(committed);

        self.timecodes.last().ok_or(SessionError::NotDrafting)
    }

    /// Discard the draft.
    pub fn cancel(&mut self) -> Result<Timecode, SessionError> {
        match std::mem::replace(&mut self.state, DraftState::Idle) {
            DraftState::Drafting(tc) => Ok(tc),
            DraftState::Idle => Err(SessionError::NotDrafting),
        }
    }

    /// Remove a committed timecode. Allowed in either state.
    pub fn remove(&mut self, id: &str) -> Result<Timecode, SessionError> {
        let index = self
            .timecodes
            .iter()
            .position(|tc| tc.id == id)
            .ok_or_else(|| SessionError::UnknownTimecode(id.to_string()))?;
        Ok(self.timecodes.remove(index))
    }

    /// Replace the committed list wholesale. Only allowed while idle, so an
    /// open draft is never silently dropped.
    pub fn load(&mut self, timecodes: Vec<Timecode>) -> Result<(), SessionError> {
        if let DraftState::Drafting(_) = self.state {
            return Err(SessionError::AlreadyDrafting);
        }
        self.timecodes = timecodes;
        Ok(())
    }

    /// The create/update payload for this session's list.
    pub fn submission(&self, title: impl Into<String>) -> MarkupPatch {
        MarkupPatch {
            title: Some(title.into()),
            timecodes: Some(self.timecodes.clone()),
        }
    }

    pub fn into_timecodes(self) -> Vec<Timecode> {
        self.timecodes
    }
}

/// `<millis>-<6 random chars>`
fn draft_id() -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("{}-{}", Utc::now().timestamp_millis(), &random[..6])
}
