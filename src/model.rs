//! Data models for the video API
//!
//! This module defines the stored video document, the payloads accepted by
//! the create and update endpoints, and the JSON envelope every endpoint
//! responds with.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Represents a video document stored in the database
///
/// # Example
/// ```json
/// {
///   "id": "Xk3p9QaLm2Rt7VbN",
///   "url": "https://videos.example.com/intro.mp4",
///   "title": "Intro",
///   "tags": ["rust", "axum"],
///   "thumbnail": "https://videos.example.com/intro.png",
///   "date_added": "2026-01-17T13:40:00Z",
///   "disabled": false
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Video {
    /// Identifier assigned by the store at creation, never changes
    pub id: String,

    pub url: String,

    pub title: String,

    /// Missing in a stored document means "no tags"
    #[serde(default)]
    pub tags: Vec<String>,

    pub thumbnail: String,

    pub date_added: DateTime<Utc>,

    /// Visibility flag.
    ///
    /// Required on creation, but documents written before the field existed,
    /// or updated with `"disabled": null`, carry no value at all. `None` is
    /// kept distinct from `Some(false)` because the query and filter listings
    /// treat it differently.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

/// Projection of a video down to its thumbnail
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub thumbnail: String,
}

impl From<Video> for Thumbnail {
    fn from(video: Video) -> Self {
        Self {
            thumbnail: video.thumbnail,
        }
    }
}

/// Request payload for creating a video
///
/// Every field is optional at the decoding stage so that missing fields are
/// reported by [`NewVideo::validate`] with one message each, instead of
/// failing on the first absent key.
///
/// # Example
/// ```json
/// {
///   "url": "https://videos.example.com/intro.mp4",
///   "title": "Intro",
///   "tags": ["rust"],
///   "thumbnail": "https://videos.example.com/intro.png",
///   "disabled": false
/// }
/// ```
#[derive(Deserialize, Debug, Clone, Default)]
pub struct NewVideo {
    pub url: Option<String>,
    pub title: Option<String>,
    pub tags: Option<Vec<String>>,
    pub thumbnail: Option<String>,
    /// Defaults to the creation time when omitted
    pub date_added: Option<DateTime<Utc>>,
    pub disabled: Option<bool>,
}

/// A creation payload that passed validation; only the id is missing
#[derive(Debug, Clone)]
pub struct ValidVideo {
    pub url: String,
    pub title: String,
    pub tags: Vec<String>,
    pub thumbnail: String,
    pub date_added: DateTime<Utc>,
    pub disabled: bool,
}

impl ValidVideo {
    pub fn with_id(self, id: String) -> Video {
        Video {
            id,
            url: self.url,
            title: self.title,
            tags: self.tags,
            thumbnail: self.thumbnail,
            date_added: self.date_added,
            disabled: Some(self.disabled),
        }
    }
}

impl NewVideo {
    /// Checks every required field and collects one message per invalid path.
    ///
    /// Only presence and non-emptiness are checked; `url` and `thumbnail` are
    /// not parsed as URLs.
    pub fn validate(self) -> Result<ValidVideo, ValidationError> {
        let mut errors = Vec::new();

        let url = required_text("url", self.url, &mut errors);
        let title = required_text("title", self.title, &mut errors);

        let tags = self.tags.unwrap_or_default();
        for (index, tag) in tags.iter().enumerate() {
            if tag.is_empty() {
                errors.push(required_message(&format!("tags.{}", index)));
            }
        }

        let thumbnail = required_text("thumbnail", self.thumbnail, &mut errors);

        if self.disabled.is_none() {
            errors.push(required_message("disabled"));
        }

        match (url, title, thumbnail, self.disabled) {
            (Some(url), Some(title), Some(thumbnail), Some(disabled)) if errors.is_empty() => {
                Ok(ValidVideo {
                    url,
                    title,
                    tags,
                    thumbnail,
                    date_added: self.date_added.unwrap_or_else(Utc::now),
                    disabled,
                })
            }
            _ => Err(ValidationError { messages: errors }),
        }
    }
}

fn required_text(path: &str, value: Option<String>, errors: &mut Vec<String>) -> Option<String> {
    match value {
        Some(text) if !text.is_empty() => Some(text),
        _ => {
            errors.push(required_message(path));
            None
        }
    }
}

fn required_message(path: &str) -> String {
    format!("Path `{}` is required.", path)
}

/// Raised when a creation payload is missing required fields
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Video validation failed: {}", .messages.join(", "))]
pub struct ValidationError {
    /// One entry per invalid field, in schema order
    pub messages: Vec<String>,
}

/// Request payload for updating a video
///
/// Absent fields are left untouched. Required-field checks are not re-run,
/// so a present-but-empty string is stored as given.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct VideoPatch {
    pub url: Option<String>,
    pub title: Option<String>,
    pub tags: Option<Vec<String>>,
    pub thumbnail: Option<String>,
    pub date_added: Option<DateTime<Utc>>,

    /// Outer `None`: field absent from the body. `Some(None)`: explicit
    /// `null`, which clears the flag.
    #[serde(default, deserialize_with = "present")]
    pub disabled: Option<Option<bool>>,
}

impl VideoPatch {
    /// Applies the present fields to `video`. The id is never touched.
    pub fn apply(self, video: &mut Video) {
        if let Some(url) = self.url {
            video.url = url;
        }
        if let Some(title) = self.title {
            video.title = title;
        }
        if let Some(tags) = self.tags {
            video.tags = tags;
        }
        if let Some(thumbnail) = self.thumbnail {
            video.thumbnail = thumbnail;
        }
        if let Some(date_added) = self.date_added {
            video.date_added = date_added;
        }
        if let Some(disabled) = self.disabled {
            video.disabled = disabled;
        }
    }
}

// Distinguishes an explicit `null` from a missing key.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Query parameters for the tag listings
///
/// Query string: `?tags=rust,axum`
#[derive(Deserialize, Debug, Default)]
pub struct TagParams {
    /// Comma-separated tag list, split verbatim
    pub tags: Option<String>,
}

/// `error` is either a single message or one message per invalid field
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ErrorBody {
    Message(String),
    Messages(Vec<String>),
}

/// Envelope shared by every JSON response
///
/// ```json
/// { "success": true, "resultsCount": 2, "data": [...] }
/// { "success": false, "error": "Video not found." }
/// ```
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub results_count: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl<T> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            results_count: None,
            data: Some(data),
            error: None,
        }
    }

    pub fn results(results_count: usize, data: T) -> Self {
        Self {
            success: true,
            results_count: Some(results_count),
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn count(results_count: usize) -> Self {
        Self {
            success: true,
            results_count: Some(results_count),
            data: None,
            error: None,
        }
    }

    pub fn error(error: ErrorBody) -> Self {
        Self {
            success: false,
            results_count: None,
            data: None,
            error: Some(error),
        }
    }
}

/// Serialises as `{}`; the data of a successful delete
#[derive(Serialize, Debug, Default)]
pub struct Empty {}
