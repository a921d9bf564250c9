//! Read-side listings over the video collection
//!
//! Every read endpoint is served by a [`VideoLister`]. There are two
//! implementations and both stay reachable through their own routes:
//!
//! - [`QueryLister`] hands a [`VideoFilter`] to the store, which evaluates it
//!   while scanning its tables and returns only the matching documents.
//! - [`FilterLister`] fetches the entire collection and filters it in memory.
//!   Every call loads every document, so cost grows with the collection and
//!   the reported counts can disagree with a concurrent writer.
//!
//! The two disagree on purpose in a few places: documents without a
//! `disabled` flag, the thumbnail result count, and ordering of the
//! newest-first listing. Those differences are part of the response contract.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::model::{Thumbnail, Video};
use crate::store::{DisabledMatch, SortOrder, StoreResult, VideoFilter, VideoRepository};

/// Items of a listing plus the count reported alongside them
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub results_count: usize,
    pub items: Vec<T>,
}

impl<T> Listing<T> {
    fn counted(items: Vec<T>) -> Self {
        Self {
            results_count: items.len(),
            items,
        }
    }
}

/// The four read operations exposed by both strategies
pub trait VideoLister: Send + Sync {
    /// Videos that are not disabled, newest first.
    fn newest_active(&self) -> StoreResult<Listing<Video>>;

    /// Videos that are not disabled and carry at least one of `tags`.
    fn by_tags(&self, tags: &[String]) -> StoreResult<Listing<Video>>;

    /// Thumbnails of the videos that are not disabled.
    fn thumbnails(&self) -> StoreResult<Listing<Thumbnail>>;

    /// Number of disabled videos.
    fn count_disabled(&self) -> StoreResult<usize>;
}

/// Splits the `tags` query parameter on commas. Entries are not trimmed.
pub fn parse_tags(raw: Option<&str>) -> Vec<String> {
    match raw {
        Some(raw) => raw.split(',').map(str::to_string).collect(),
        None => Vec::new(),
    }
}

/// Listing strategy that pushes predicates down to the store
pub struct QueryLister {
    store: Arc<dyn VideoRepository>,
}

impl QueryLister {
    pub fn new(store: Arc<dyn VideoRepository>) -> Self {
        Self { store }
    }

    fn active() -> VideoFilter {
        VideoFilter::default().disabled(DisabledMatch::NotTrue)
    }
}

impl VideoLister for QueryLister {
    fn newest_active(&self) -> StoreResult<Listing<Video>> {
        let videos = self
            .store
            .find(&Self::active(), Some(SortOrder::DateAddedDesc))?;
        Ok(Listing::counted(videos))
    }

    fn by_tags(&self, tags: &[String]) -> StoreResult<Listing<Video>> {
        let filter = Self::active().any_tag(tags.to_vec());
        Ok(Listing::counted(self.store.find(&filter, None)?))
    }

    fn thumbnails(&self) -> StoreResult<Listing<Thumbnail>> {
        Ok(Listing::counted(self.store.find_thumbnails(&Self::active())?))
    }

    // `disabled != false` also counts documents without the flag, which
    // `newest_active` lists as active. Defaulting the flag to `false` on
    // stored documents would remove the overlap.
    fn count_disabled(&self) -> StoreResult<usize> {
        self.store
            .count(&VideoFilter::default().disabled(DisabledMatch::NotFalse))
    }
}

/// Listing strategy that loads the whole collection and filters in memory
pub struct FilterLister {
    store: Arc<dyn VideoRepository>,
}

impl FilterLister {
    pub fn new(store: Arc<dyn VideoRepository>) -> Self {
        Self { store }
    }

    fn fetch_all(&self) -> StoreResult<Vec<Video>> {
        self.store.find(&VideoFilter::default(), None)
    }

    fn active(videos: Vec<Video>) -> impl Iterator<Item = Video> {
        videos.into_iter().filter(|video| !is_disabled(video))
    }
}

/// Truthiness of the flag: only an explicit `true` counts.
fn is_disabled(video: &Video) -> bool {
    video.disabled.unwrap_or(false)
}

/// Newest-first comparator used by [`FilterLister::newest_active`].
///
/// Always reports the pair as equal, so the stable sort leaves storage order
/// untouched. Responses from `/filterVideos` depend on that order.
fn inert_newest_first(_a: &Video, _b: &Video) -> Ordering {
    Ordering::Equal
}

impl VideoLister for FilterLister {
    fn newest_active(&self) -> StoreResult<Listing<Video>> {
        let mut videos: Vec<Video> = Self::active(self.fetch_all()?).collect();
        videos.sort_by(inert_newest_first);
        Ok(Listing::counted(videos))
    }

    fn by_tags(&self, tags: &[String]) -> StoreResult<Listing<Video>> {
        let videos = Self::active(self.fetch_all()?)
            .filter(|video| video.tags.iter().any(|tag| tags.contains(tag)))
            .collect();
        Ok(Listing::counted(videos))
    }

    // The count is the size of the unfiltered fetch, not of `items`.
    fn thumbnails(&self) -> StoreResult<Listing<Thumbnail>> {
        let videos = self.fetch_all()?;
        let fetched = videos.len();

        let items = Self::active(videos).map(Thumbnail::from).collect();
        Ok(Listing {
            results_count: fetched,
            items,
        })
    }

    fn count_disabled(&self) -> StoreResult<usize> {
        Ok(self.fetch_all()?.iter().filter(|v| is_disabled(v)).count())
    }
}
