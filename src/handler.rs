//! HTTP request handlers for the video API
//!
//! Each handler extracts its input, makes exactly one store or lister call
//! and wraps the result in an [`ApiResponse`]. Failures are turned into
//! responses by [`AppError`].

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::database::AppState;
use crate::error::AppError;
use crate::lister::{parse_tags, Listing, VideoLister};
use crate::model::{ApiResponse, Empty, NewVideo, TagParams, Thumbnail, Video, VideoPatch};
use crate::store::VideoFilter;

type ListResponse<T> = Result<Json<ApiResponse<Vec<T>>>, AppError>;
type CountResponse = Result<Json<ApiResponse<()>>, AppError>;

/// Plain-text greeting served at the server root
pub async fn root() -> &'static str {
    "Welcome to Simple Video API"
}

/// Lists every stored video, disabled ones included
///
/// `GET /api/v1/videos`
pub async fn get_videos(State(state): State<AppState>) -> ListResponse<Video> {
    let videos = state.store.find(&VideoFilter::default(), None)?;
    Ok(Json(ApiResponse::results(videos.len(), videos)))
}

/// Creates a video
///
/// `POST /api/v1/videos`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://videos.example.com/intro.mp4",
///   "title": "Intro",
///   "tags": ["rust"],
///   "thumbnail": "https://videos.example.com/intro.png",
///   "disabled": false
/// }
/// ```
///
/// # Response
///
/// - **201 Created** - the stored video, with its assigned `id`
/// - **400 Bad Request** - one message per missing field, or the decoder
///   message when the body is not a valid payload
pub async fn add_video(
    State(state): State<AppState>,
    payload: Result<Json<NewVideo>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Video>>), AppError> {
    // A body that does not decode is reported like a validation failure
    let Json(payload) = payload.map_err(|rejection| AppError::Validation(vec![rejection.body_text()]))?;

    let video = state.store.create(payload)?;
    tracing::info!(id = %video.id, title = %video.title, "video added");

    Ok((StatusCode::CREATED, Json(ApiResponse::data(video))))
}

/// Updates the fields present in the body
///
/// `POST /api/v1/videos/{id}`
///
/// The body is decoded as JSON whatever its content type; an empty body is
/// an empty patch.
///
/// # Response
///
/// - **200 OK** - the video after the update
/// - **404 Not Found** - no video with this id, whatever the body holds
/// - **400 Bad Request** - the video exists but the body is not a valid patch
pub async fn update_video(
    Path(id): Path<String>,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ApiResponse<Video>>, AppError> {
    let patch = match decode_patch(&body) {
        Ok(patch) => patch,
        Err(message) => {
            // Nothing is written on this path, so a plain lookup decides 404 vs 400
            state.store.find_by_id(&id)?.ok_or(AppError::NotFound)?;
            return Err(AppError::Validation(vec![message]));
        }
    };

    let video = state.store.update_by_id(&id, patch)?.ok_or(AppError::NotFound)?;
    tracing::info!(id = %video.id, "video updated");

    Ok(Json(ApiResponse::data(video)))
}

fn decode_patch(body: &[u8]) -> Result<VideoPatch, String> {
    // Empty body
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(VideoPatch::default());
    }
    serde_json::from_slice(body).map_err(|err| format!("Failed to deserialize the JSON body: {}", err))
}

/// Deletes a video
///
/// `DELETE /api/v1/videos/{id}`
///
/// # Response
///
/// - **200 OK** - `data` is an empty object
/// - **404 Not Found** - no video with this id
pub async fn delete_video(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Empty>>, AppError> {
    state.store.delete_by_id(&id)?.ok_or(AppError::NotFound)?;
    tracing::info!(id = %id, "video deleted");

    Ok(Json(ApiResponse::data(Empty {})))
}

fn listing<T>(listing: Listing<T>) -> Json<ApiResponse<Vec<T>>> {
    Json(ApiResponse::results(listing.results_count, listing.items))
}

fn newest_active(lister: &dyn VideoLister) -> ListResponse<Video> {
    Ok(listing(lister.newest_active()?))
}

fn by_tags(lister: &dyn VideoLister, params: &TagParams) -> ListResponse<Video> {
    let tags = parse_tags(params.tags.as_deref());
    tracing::debug!(?tags, "listing videos by tag");
    Ok(listing(lister.by_tags(&tags)?))
}

fn thumbnails(lister: &dyn VideoLister) -> ListResponse<Thumbnail> {
    Ok(listing(lister.thumbnails()?))
}

fn count_disabled(lister: &dyn VideoLister) -> CountResponse {
    Ok(Json(ApiResponse::count(lister.count_disabled()?)))
}

/// `GET /api/v1/videos/queryVideos`
pub async fn query_videos(State(state): State<AppState>) -> ListResponse<Video> {
    newest_active(state.query.as_ref())
}

/// `GET /api/v1/videos/queryByTags?tags=a,b`
pub async fn query_by_tags(
    State(state): State<AppState>,
    Query(params): Query<TagParams>,
) -> ListResponse<Video> {
    by_tags(state.query.as_ref(), &params)
}

/// `GET /api/v1/videos/queryThumbnails`
pub async fn query_thumbnails(State(state): State<AppState>) -> ListResponse<Thumbnail> {
    thumbnails(state.query.as_ref())
}

/// `GET /api/v1/videos/queryDisabled`
pub async fn query_disabled_videos(State(state): State<AppState>) -> CountResponse {
    count_disabled(state.query.as_ref())
}

/// `GET /api/v1/videos/filterVideos`
pub async fn filter_videos(State(state): State<AppState>) -> ListResponse<Video> {
    newest_active(state.filter.as_ref())
}

/// `GET /api/v1/videos/filterByTags?tags=a,b`
pub async fn filter_by_tags(
    State(state): State<AppState>,
    Query(params): Query<TagParams>,
) -> ListResponse<Video> {
    by_tags(state.filter.as_ref(), &params)
}

/// `GET /api/v1/videos/filterThumbnails`
pub async fn filter_thumbnails(State(state): State<AppState>) -> ListResponse<Thumbnail> {
    thumbnails(state.filter.as_ref())
}

/// `GET /api/v1/videos/filterDisabled`
pub async fn filter_disabled_videos(State(state): State<AppState>) -> CountResponse {
    count_disabled(state.filter.as_ref())
}
