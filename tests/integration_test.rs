//! Integration tests for the video API
//!
//! These tests drive the full router against a temporary database:
//! - HTTP routing and status codes
//! - Response envelope shape
//! - Query-style and filter-style listings

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tower::ServiceExt;

use video_api::database::{AppState, RedbVideoStore};
use video_api::route::create_app;
use video_api::model::{NewVideo, Thumbnail, Video, VideoPatch};
use video_api::store::{SortOrder, StoreError, StoreResult, VideoFilter, VideoRepository};

const BASE: &str = "/api/v1/videos";

/// Helper function to create a test application with a temporary database
fn setup_test_app() -> (axum::Router, Arc<dyn VideoRepository>, NamedTempFile) {
    let temp_db = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = temp_db.path().to_str().unwrap();

    let store: Arc<dyn VideoRepository> =
        Arc::new(RedbVideoStore::open(db_path).expect("Failed to initialize test database"));
    let app = create_app(AppState::new(store.clone()));

    (app, store, temp_db)
}

/// Helper function to parse response body as JSON
async fn response_json(body: Body) -> Value {
    let bytes = body
        .collect()
        .await
        .expect("Failed to read response body")
        .to_bytes();

    serde_json::from_slice(&bytes).expect("Failed to parse JSON")
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, response_json(response.into_body()).await)
}

fn video_payload(title: &str, date: &str, tags: &[&str], disabled: bool) -> Value {
    json!({
        "url": format!("https://videos.example.com/{}.mp4", title),
        "title": title,
        "tags": tags,
        "thumbnail": format!("https://videos.example.com/{}.png", title),
        "date_added": date,
        "disabled": disabled
    })
}

async fn create(app: &axum::Router, payload: Value) -> Value {
    let (status, body) = send(app, "POST", BASE, Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"].clone()
}

fn titles(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_root_greeting() {
    let (app, _store, _temp_db) = setup_test_app();

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"Welcome to Simple Video API");
}

#[tokio::test]
async fn test_create_video_success() {
    let (app, _store, _temp_db) = setup_test_app();

    let payload = video_payload("intro", "2026-01-02T00:00:00Z", &["rust", "axum"], false);
    let (status, body) = send(&app, "POST", BASE, Some(payload)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["title"], "intro");
    assert_eq!(body["data"]["tags"], json!(["rust", "axum"]));
    assert_eq!(body["data"]["disabled"], false);
    assert!(!body["data"]["id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_video_defaults_date_added() {
    let (app, _store, _temp_db) = setup_test_app();

    let video = create(
        &app,
        json!({
            "url": "https://videos.example.com/a.mp4",
            "title": "a",
            "thumbnail": "a.png",
            "disabled": true
        }),
    )
    .await;

    assert!(video["date_added"].is_string());
    assert_eq!(video["tags"], json!([]));
}

#[tokio::test]
async fn test_create_video_reports_every_missing_field() {
    let (app, _store, _temp_db) = setup_test_app();

    let (status, body) = send(&app, "POST", BASE, Some(json!({ "title": "only a title" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(
        body["error"],
        json!([
            "Path `url` is required.",
            "Path `thumbnail` is required.",
            "Path `disabled` is required."
        ])
    );
}

#[tokio::test]
async fn test_create_video_rejects_malformed_body() {
    let (app, _store, _temp_db) = setup_test_app();

    let mut payload = video_payload("bad", "2026-01-01T00:00:00Z", &[], false);
    payload["disabled"] = json!("yes");

    let (status, body) = send(&app, "POST", BASE, Some(payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_get_videos_lists_everything() {
    let (app, _store, _temp_db) = setup_test_app();
    create(&app, video_payload("shown", "2026-01-01T00:00:00Z", &[], false)).await;
    create(&app, video_payload("hidden", "2026-01-02T00:00:00Z", &[], true)).await;

    let (status, body) = send(&app, "GET", BASE, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["resultsCount"], 2);
    assert_eq!(titles(&body), vec!["shown", "hidden"]);
}

#[tokio::test]
async fn test_update_round_trip() {
    let (app, store, _temp_db) = setup_test_app();
    let video = create(&app, video_payload("before", "2026-01-01T00:00:00Z", &["a"], false)).await;
    let id = video["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        &format!("{}/{}", BASE, id),
        Some(json!({ "title": "after", "disabled": true })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["id"], id);
    assert_eq!(body["data"]["title"], "after");

    let stored = store.find_by_id(id).unwrap().unwrap();
    assert_eq!(stored.title, "after");
    assert_eq!(stored.disabled, Some(true));
    assert_eq!(stored.url, video["url"].as_str().unwrap());
    assert_eq!(stored.tags, vec!["a"]);
}

#[tokio::test]
async fn test_update_missing_video() {
    let (app, _store, _temp_db) = setup_test_app();
    let uri = format!("{}/nonexistent", BASE);

    for payload in [
        json!({}),
        json!({ "title": "x" }),
        json!({ "title": 5 }),
        video_payload("x", "2026-01-01T00:00:00Z", &[], false),
    ] {
        let (status, body) = send(&app, "POST", &uri, Some(payload.clone())).await;

        assert_eq!(status, StatusCode::NOT_FOUND, "{}", payload);
        assert_eq!(body, json!({ "success": false, "error": "Video not found." }));
    }

    // Empty body without a content type
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri.as_str())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response.into_body()).await;
    assert_eq!(body["error"], "Video not found.");
}

#[tokio::test]
async fn test_update_existing_video_body_handling() {
    let (app, _store, _temp_db) = setup_test_app();
    let video = create(&app, video_payload("kept", "2026-01-01T00:00:00Z", &["a"], false)).await;
    let uri = format!("{}/{}", BASE, video["id"].as_str().unwrap());

    // An empty body is an empty patch
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri.as_str())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response.into_body()).await;
    assert_eq!(body["data"], video);

    // A mistyped field is rejected once the video is known to exist
    let (status, body) = send(&app, "POST", &uri, Some(json!({ "title": 5 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"].as_array().unwrap().len(), 1);

    let (_, all) = send(&app, "GET", BASE, None).await;
    assert_eq!(all["data"][0]["title"], "kept");
}

#[tokio::test]
async fn test_delete_twice() {
    let (app, _store, _temp_db) = setup_test_app();
    let video = create(&app, video_payload("gone", "2026-01-01T00:00:00Z", &[], false)).await;
    let uri = format!("{}/{}", BASE, video["id"].as_str().unwrap());

    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "data": {} }));

    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Video not found.");
}

async fn seed_listing_fixture(app: &axum::Router) {
    create(app, video_payload("old", "2026-01-01T00:00:00Z", &["a", "c"], false)).await;
    create(app, video_payload("hidden", "2026-01-09T00:00:00Z", &["a"], true)).await;
    create(app, video_payload("new", "2026-01-03T00:00:00Z", &["c"], false)).await;
    create(app, video_payload("mid", "2026-01-02T00:00:00Z", &["b"], false)).await;
}

#[tokio::test]
async fn test_query_videos_newest_first() {
    let (app, _store, _temp_db) = setup_test_app();
    seed_listing_fixture(&app).await;

    let (status, body) = send(&app, "GET", &format!("{}/queryVideos", BASE), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resultsCount"], 3);
    assert_eq!(titles(&body), vec!["new", "mid", "old"]);
}

#[tokio::test]
async fn test_filter_videos_storage_order() {
    let (app, _store, _temp_db) = setup_test_app();
    seed_listing_fixture(&app).await;

    let (status, body) = send(&app, "GET", &format!("{}/filterVideos", BASE), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resultsCount"], 3);
    assert_eq!(titles(&body), vec!["old", "new", "mid"]);
}

#[tokio::test]
async fn test_by_tags_matches_any_tag() {
    let (app, _store, _temp_db) = setup_test_app();
    seed_listing_fixture(&app).await;

    for route in ["queryByTags", "filterByTags"] {
        let (status, body) = send(&app, "GET", &format!("{}/{}?tags=a,b", BASE, route), None).await;

        assert_eq!(status, StatusCode::OK, "{}", route);
        assert_eq!(body["resultsCount"], 2, "{}", route);
        assert_eq!(titles(&body), vec!["old", "mid"], "{}", route);
    }
}

#[tokio::test]
async fn test_by_tags_without_param_is_empty() {
    let (app, _store, _temp_db) = setup_test_app();
    seed_listing_fixture(&app).await;

    for route in ["queryByTags", "filterByTags"] {
        let (status, body) = send(&app, "GET", &format!("{}/{}", BASE, route), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["resultsCount"], 0);
    }
}

#[tokio::test]
async fn test_thumbnails_shape() {
    let (app, _store, _temp_db) = setup_test_app();
    seed_listing_fixture(&app).await;

    let (_, query) = send(&app, "GET", &format!("{}/queryThumbnails", BASE), None).await;
    let (_, filter) = send(&app, "GET", &format!("{}/filterThumbnails", BASE), None).await;

    let expected = json!([
        { "thumbnail": "https://videos.example.com/old.png" },
        { "thumbnail": "https://videos.example.com/new.png" },
        { "thumbnail": "https://videos.example.com/mid.png" }
    ]);

    assert_eq!(query["data"], expected);
    assert_eq!(query["resultsCount"], 3);

    assert_eq!(filter["data"], expected);
    assert_eq!(filter["resultsCount"], 4);
}

#[tokio::test]
async fn test_disabled_counts_only() {
    let (app, _store, _temp_db) = setup_test_app();
    seed_listing_fixture(&app).await;

    for route in ["queryDisabled", "filterDisabled"] {
        let (status, body) = send(&app, "GET", &format!("{}/{}", BASE, route), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true, "resultsCount": 1 }));
    }
}

#[tokio::test]
async fn test_video_without_disabled_flag() {
    let (app, _store, _temp_db) = setup_test_app();
    seed_listing_fixture(&app).await;

    let (_, all) = send(&app, "GET", BASE, None).await;
    let new_id = all["data"][2]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        &format!("{}/{}", BASE, new_id),
        Some(json!({ "disabled": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].get("disabled").is_none());

    // Still listed as active by both strategies.
    let (_, query) = send(&app, "GET", &format!("{}/queryVideos", BASE), None).await;
    assert_eq!(titles(&query), vec!["new", "mid", "old"]);
    let (_, filter) = send(&app, "GET", &format!("{}/filterVideos", BASE), None).await;
    assert_eq!(titles(&filter), vec!["old", "new", "mid"]);

    // Only the store-side count also treats it as disabled.
    let (_, query) = send(&app, "GET", &format!("{}/queryDisabled", BASE), None).await;
    assert_eq!(query["resultsCount"], 2);
    let (_, filter) = send(&app, "GET", &format!("{}/filterDisabled", BASE), None).await;
    assert_eq!(filter["resultsCount"], 1);
}

/// Store whose every call fails, to observe the 500 envelope
struct BrokenStore;

fn broken<T>() -> StoreResult<T> {
    Err(StoreError::Document(
        serde_json::from_str::<Value>("{\"internal detail\"").unwrap_err(),
    ))
}

impl VideoRepository for BrokenStore {
    fn create(&self, _fields: NewVideo) -> StoreResult<Video> {
        broken()
    }

    fn find(&self, _filter: &VideoFilter, _sort: Option<SortOrder>) -> StoreResult<Vec<Video>> {
        broken()
    }

    fn find_thumbnails(&self, _filter: &VideoFilter) -> StoreResult<Vec<Thumbnail>> {
        broken()
    }

    fn count(&self, _filter: &VideoFilter) -> StoreResult<usize> {
        broken()
    }

    fn find_by_id(&self, _id: &str) -> StoreResult<Option<Video>> {
        broken()
    }

    fn update_by_id(&self, _id: &str, _patch: VideoPatch) -> StoreResult<Option<Video>> {
        broken()
    }

    fn delete_by_id(&self, _id: &str) -> StoreResult<Option<Video>> {
        broken()
    }
}

#[tokio::test]
async fn test_store_failure_returns_generic_server_error() {
    let app = create_app(AppState::new(Arc::new(BrokenStore)));

    let requests = [
        ("GET", BASE.to_string(), None),
        ("POST", BASE.to_string(), Some(video_payload("x", "2026-01-01T00:00:00Z", &[], false))),
        ("POST", format!("{}/any", BASE), Some(json!({ "title": "y" }))),
        ("DELETE", format!("{}/any", BASE), None),
        ("GET", format!("{}/queryVideos", BASE), None),
        ("GET", format!("{}/filterThumbnails", BASE), None),
        ("GET", format!("{}/queryDisabled", BASE), None),
    ];

    for (method, uri, payload) in requests {
        let (status, body) = send(&app, method, &uri, payload).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{} {}", method, uri);
        assert_eq!(body, json!({ "success": false, "error": "Server Error" }));
    }
}
