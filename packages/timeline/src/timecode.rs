use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vidnote_document::{Document, LogicalPath};

/// A time-ranged annotation on a video.
///
/// On the wire the body travels as the serialized document string in `text`,
/// the shape the admin editor produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timecode {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub time_start: f64,
    #[serde(default)]
    pub time_end: f64,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "text", with = "body_text", default)]
    pub body: Document,
}

impl Timecode {
    pub fn new(id: impl Into<String>, time_start: f64, time_end: f64) -> Self {
        Self {
            id: id.into(),
            time_start,
            time_end,
            title: String::new(),
            body: Document::default(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_body(mut self, body: Document) -> Self {
        self.body = body;
        self
    }

    /// Both bounds are inclusive.
    pub fn is_active_at(&self, t: f64) -> bool {
        self.time_start <= t && t <= self.time_end
    }

    /// `0 <= timeStart <= timeEnd`. Not enforced on construction: an
    /// editing session may pass through ranges that fail this.
    pub fn is_well_formed(&self) -> bool {
        self.time_start >= 0.0 && self.time_start <= self.time_end
    }
}

mod body_text {
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;
    use vidnote_document::{deserialize_lossy, from_value, Document};

    pub fn serialize<S: Serializer>(body: &Document, serializer: S) -> Result<S::Ok, S::Error> {
        // Resolved URLs expire, so they never reach storage.
        serializer.serialize_str(&vidnote_document::serialize(&body.without_preview_hints()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Document, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(text) => deserialize_lossy(&text),
            other => from_value(&other),
        })
    }
}

/// A video with its timecodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Markup {
    /// Empty until the persistence collaborator assigns one.
    #[serde(rename = "_id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub video_path: LogicalPath,
    #[serde(default)]
    pub timecodes: Vec<Timecode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Markup {
    pub fn new(title: impl Into<String>, video_path: impl Into<LogicalPath>) -> Self {
        Self {
            id: String::new(),
            title: title.into(),
            video_path: video_path.into(),
            timecodes: Vec::new(),
            created_at: None,
        }
    }

    pub fn summary(&self) -> MarkupSummary {
        MarkupSummary {
            id: self.id.clone(),
            title: self.title.clone(),
        }
    }

    pub fn apply(&mut self, patch: MarkupPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(timecodes) = patch.timecodes {
            self.timecodes = timecodes;
        }
    }
}

/// Listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkupSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
}

/// Partial update. The timecode list is only ever replaced whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkupPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timecodes: Option<Vec<Timecode>>,
}

impl MarkupPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.timecodes.is_none()
    }
}
