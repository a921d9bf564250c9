//! Route definitions for the video API
//!
//! This module configures all HTTP routes and maps them to their respective handlers.

use axum::routing::{get, post};
use axum::Router;

use crate::database::AppState;
use crate::handler::{
    add_video, delete_video, filter_by_tags, filter_disabled_videos, filter_thumbnails,
    filter_videos, get_videos, query_by_tags, query_disabled_videos, query_thumbnails,
    query_videos, root, update_video,
};

/// Creates and configures the Axum application router with all routes
///
/// # Route Definitions
///
/// - `GET /` - Plain-text greeting
/// - `GET|POST /api/v1/videos` - List all videos / create a video
/// - `POST|DELETE /api/v1/videos/{id}` - Update / delete a video
/// - `GET /api/v1/videos/query*` - Listings filtered by the store
/// - `GET /api/v1/videos/filter*` - Listings filtered in memory
///
/// # Example Usage
///
/// ```no_run
/// # use std::sync::Arc;
/// # use video_api::database::{AppState, RedbVideoStore};
/// # use video_api::route::create_app;
/// let store = RedbVideoStore::open("videos.db").unwrap();
/// let app = create_app(AppState::new(Arc::new(store)));
/// // axum::serve(listener, app).await.unwrap();
/// ```
pub fn create_app(state: AppState) -> Router {
    let video_routes = Router::new()
        .route("/", get(get_videos).post(add_video))
        .route("/{id}", post(update_video).delete(delete_video))
        // Store-side filtering
        .route("/queryVideos", get(query_videos))
        .route("/queryByTags", get(query_by_tags))
        .route("/queryThumbnails", get(query_thumbnails))
        .route("/queryDisabled", get(query_disabled_videos))
        // In-memory filtering
        .route("/filterVideos", get(filter_videos))
        .route("/filterByTags", get(filter_by_tags))
        .route("/filterThumbnails", get(filter_thumbnails))
        .route("/filterDisabled", get(filter_disabled_videos));

    Router::new()
        .route("/", get(root))
        .nest("/api/v1/videos", video_routes)
        .with_state(state)
}
