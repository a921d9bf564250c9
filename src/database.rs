//! Database initialization, table definitions and the redb-backed store
//!
//! This module handles the setup of the embedded redb database and
//! implements [`VideoRepository`] on top of it. It also defines the
//! application state handed to every request handler.

use std::sync::Arc;

use rand::{distr::Alphanumeric, Rng};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use crate::lister::{FilterLister, QueryLister, VideoLister};
use crate::model::{NewVideo, Thumbnail, Video, VideoPatch};
use crate::store::{SortOrder, StoreResult, VideoFilter, VideoRepository};

/// Main table holding one JSON document per video
///
/// Key: storage sequence number, assigned in insertion order
/// Value: JSON-serialized [`Video`]
///
/// Iterating this table yields documents in storage order, which is the
/// order every unsorted listing returns.
pub const TABLE_VIDEOS: TableDefinition<u64, &str> = TableDefinition::new("videos_v1");

/// Index from the public video id to its storage sequence number
///
/// Example:
/// - Key: "Xk3p9QaLm2Rt7VbN"
/// - Value: 42
pub const TABLE_VIDEO_IDS: TableDefinition<&str, u64> = TableDefinition::new("video_ids_v1");

const ID_LENGTH: usize = 16;

/// Application state shared across all request handlers
///
/// Built once at startup. The two listers wrap the same store and differ only
/// in where they evaluate predicates.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn VideoRepository>,
    /// Pushes predicates down to the store
    pub query: Arc<dyn VideoLister>,
    /// Fetches the whole collection and filters in memory
    pub filter: Arc<dyn VideoLister>,
}

impl AppState {
    pub fn new(store: Arc<dyn VideoRepository>) -> Self {
        Self {
            query: Arc::new(QueryLister::new(store.clone())),
            filter: Arc::new(FilterLister::new(store.clone())),
            store,
        }
    }
}

/// Initializes the embedded database and creates required tables
///
/// # Arguments
///
/// * `db_path` - File path where the database should be stored (e.g., "videos.db")
///
/// # Example
///
/// ```no_run
/// # use video_api::database::init_db;
/// let db = init_db("videos.db").expect("Failed to initialize database");
/// ```
pub fn init_db(db_path: &str) -> Result<Database, redb::Error> {
    let db = Database::create(db_path)?;

    let write_txn = db.begin_write()?;
    {
        write_txn.open_table(TABLE_VIDEOS)?;
        write_txn.open_table(TABLE_VIDEO_IDS)?;
    }
    write_txn.commit()?;

    Ok(db)
}

/// [`VideoRepository`] backed by a redb file
pub struct RedbVideoStore {
    db: Database,
}

impl RedbVideoStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Opens (or creates) the database file and its tables.
    pub fn open(db_path: &str) -> StoreResult<Self> {
        Ok(Self::new(init_db(db_path)?))
    }

    /// Walks every document in storage order inside one read transaction.
    fn scan<F>(&self, mut visit: F) -> StoreResult<()>
    where
        F: FnMut(Video),
    {
        // Begin a read-only transaction; every document is seen from one snapshot
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_VIDEOS)?;

        for entry in table.iter()? {
            let (_, value) = entry?;
            let video: Video = serde_json::from_str(value.value())?;
            visit(video);
        }

        Ok(())
    }
}

fn generate_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LENGTH)
        .map(char::from)
        .collect()
}

impl VideoRepository for RedbVideoStore {
    fn create(&self, fields: NewVideo) -> StoreResult<Video> {
        let valid = fields.validate()?;

        let write_txn = self.db.begin_write()?;
        let video = {
            let mut ids = write_txn.open_table(TABLE_VIDEO_IDS)?;
            let mut videos = write_txn.open_table(TABLE_VIDEOS)?;

            // Draw random ids until one is free; the check and the insert share this transaction
            let id = loop {
                let candidate = generate_id();
                if ids.get(candidate.as_str())?.is_none() {
                    break candidate;
                }
            };

            // Next sequence number after the highest stored one, so iteration follows insertion order
            let seq = videos
                .last()?
                .map(|(key, _)| key.value() + 1)
                .unwrap_or(0);

            let video = valid.with_id(id);
            let document = serde_json::to_string(&video)?;

            // Write the document, then the id index pointing at it
            videos.insert(seq, document.as_str())?;
            ids.insert(video.id.as_str(), seq)?;

            video
        };
        write_txn.commit()?;

        tracing::debug!(id = %video.id, "video created");
        Ok(video)
    }

    fn find(&self, filter: &VideoFilter, sort: Option<SortOrder>) -> StoreResult<Vec<Video>> {
        let mut videos = Vec::new();
        self.scan(|video| {
            if filter.matches(&video) {
                videos.push(video);
            }
        })?;

        match sort {
            Some(SortOrder::DateAddedDesc) => {
                videos.sort_by(|a, b| b.date_added.cmp(&a.date_added));
            }
            None => {}
        }

        Ok(videos)
    }

    fn find_thumbnails(&self, filter: &VideoFilter) -> StoreResult<Vec<Thumbnail>> {
        let mut thumbnails = Vec::new();
        self.scan(|video| {
            if filter.matches(&video) {
                thumbnails.push(Thumbnail::from(video));
            }
        })?;

        Ok(thumbnails)
    }

    fn count(&self, filter: &VideoFilter) -> StoreResult<usize> {
        let mut count = 0;
        self.scan(|video| {
            if filter.matches(&video) {
                count += 1;
            }
        })?;

        Ok(count)
    }

    fn find_by_id(&self, id: &str) -> StoreResult<Option<Video>> {
        let read_txn = self.db.begin_read()?;

        let ids = read_txn.open_table(TABLE_VIDEO_IDS)?;
        let Some(seq) = ids.get(id)?.map(|guard| guard.value()) else {
            return Ok(None);
        };

        let videos = read_txn.open_table(TABLE_VIDEOS)?;
        let document = videos.get(seq)?.map(|guard| guard.value().to_string());

        match document {
            Some(document) => Ok(Some(serde_json::from_str(&document)?)),
            None => Ok(None),
        }
    }

    fn update_by_id(&self, id: &str, patch: VideoPatch) -> StoreResult<Option<Video>> {
        let write_txn = self.db.begin_write()?;
        let video = {
            let ids = write_txn.open_table(TABLE_VIDEO_IDS)?;
            let Some(seq) = ids.get(id)?.map(|guard| guard.value()) else {
                return Ok(None);
            };

            let mut videos = write_txn.open_table(TABLE_VIDEOS)?;
            let Some(document) = videos.get(seq)?.map(|guard| guard.value().to_string()) else {
                return Ok(None);
            };

            // Rewrite in place under the same sequence number to keep the storage position
            let mut video: Video = serde_json::from_str(&document)?;
            patch.apply(&mut video);

            let document = serde_json::to_string(&video)?;
            videos.insert(seq, document.as_str())?;

            video
        };
        write_txn.commit()?;

        tracing::debug!(id = %video.id, "video updated");
        Ok(Some(video))
    }

    fn delete_by_id(&self, id: &str) -> StoreResult<Option<Video>> {
        let write_txn = self.db.begin_write()?;
        let video = {
            let mut ids = write_txn.open_table(TABLE_VIDEO_IDS)?;
            let Some(seq) = ids.remove(id)?.map(|guard| guard.value()) else {
                return Ok(None);
            };

            let mut videos = write_txn.open_table(TABLE_VIDEOS)?;
            let Some(document) = videos.remove(seq)?.map(|guard| guard.value().to_string()) else {
                return Ok(None);
            };

            serde_json::from_str::<Video>(&document)?
        };
        write_txn.commit()?;

        tracing::debug!(id = %video.id, "video deleted");
        Ok(Some(video))
    }
}
