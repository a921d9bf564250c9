//! Persistence contract for video documents
//!
//! [`VideoRepository`] is the only way the rest of the application touches
//! stored videos. Predicates are passed as data ([`VideoFilter`]) so the
//! store can evaluate them while it walks its own tables, instead of handing
//! every document back to the caller.

use crate::model::{NewVideo, Thumbnail, ValidationError, Video, VideoPatch};

/// Errors surfaced by a [`VideoRepository`]
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("database error: {0}")]
    Database(#[from] redb::Error),

    #[error("stored document could not be decoded: {0}")]
    Document(#[from] serde_json::Error),
}

impl From<redb::DatabaseError> for StoreError {
    fn from(err: redb::DatabaseError) -> Self {
        StoreError::Database(err.into())
    }
}

impl From<redb::TransactionError> for StoreError {
    fn from(err: redb::TransactionError) -> Self {
        StoreError::Database(err.into())
    }
}

impl From<redb::TableError> for StoreError {
    fn from(err: redb::TableError) -> Self {
        StoreError::Database(err.into())
    }
}

impl From<redb::StorageError> for StoreError {
    fn from(err: redb::StorageError) -> Self {
        StoreError::Database(err.into())
    }
}

impl From<redb::CommitError> for StoreError {
    fn from(err: redb::CommitError) -> Self {
        StoreError::Database(err.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Comparison against the `disabled` flag, with document-store semantics
///
/// A document without the flag is "not equal" to both `true` and `false`,
/// so it satisfies either variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisabledMatch {
    /// `disabled != true`: absent or `false`
    NotTrue,
    /// `disabled != false`: absent or `true`
    NotFalse,
}

impl DisabledMatch {
    pub fn matches(self, disabled: Option<bool>) -> bool {
        match self {
            DisabledMatch::NotTrue => disabled != Some(true),
            DisabledMatch::NotFalse => disabled != Some(false),
        }
    }
}

/// Predicate evaluated by the store. The default matches every document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoFilter {
    pub disabled: Option<DisabledMatch>,
    /// Matches when the video carries at least one of these tags
    pub any_tag: Option<Vec<String>>,
}

impl VideoFilter {
    pub fn disabled(mut self, disabled: DisabledMatch) -> Self {
        self.disabled = Some(disabled);
        self
    }

    pub fn any_tag(mut self, tags: Vec<String>) -> Self {
        self.any_tag = Some(tags);
        self
    }

    pub fn matches(&self, video: &Video) -> bool {
        if let Some(disabled) = self.disabled {
            if !disabled.matches(video.disabled) {
                return false;
            }
        }
        match &self.any_tag {
            Some(wanted) => video.tags.iter().any(|tag| wanted.contains(tag)),
            None => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Newest `date_added` first; equal timestamps keep storage order
    DateAddedDesc,
}

/// Create/find/update/delete contract over the video collection
///
/// Results without a sort come back in storage order (insertion order).
/// A `None` from the `*_by_id` methods means no document has that id.
pub trait VideoRepository: Send + Sync {
    /// Validates `fields`, assigns a fresh id and stores the document.
    fn create(&self, fields: NewVideo) -> StoreResult<Video>;

    fn find(&self, filter: &VideoFilter, sort: Option<SortOrder>) -> StoreResult<Vec<Video>>;

    /// Matching documents projected down to their thumbnail.
    fn find_thumbnails(&self, filter: &VideoFilter) -> StoreResult<Vec<Thumbnail>>;

    fn count(&self, filter: &VideoFilter) -> StoreResult<usize>;

    fn find_by_id(&self, id: &str) -> StoreResult<Option<Video>>;

    /// Applies `patch` without re-validating and returns the updated document.
    fn update_by_id(&self, id: &str, patch: VideoPatch) -> StoreResult<Option<Video>>;

    /// Removes the document and returns it as it was before deletion.
    fn delete_by_id(&self, id: &str) -> StoreResult<Option<Video>>;
}
