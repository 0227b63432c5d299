//! Integration tests for the Vidrelay HTTP surface.
//!
//! Drive the real router with a scripted upstream: no network access,
//! exact control over upstream outcomes, and observable call counts.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use bytes::Bytes;
use serde_json::{Value, json};
use tower::ServiceExt;
use vidrelay_core::config::RetryConfig;
use vidrelay_core::test_support::{
    ScriptedSource, bare_playable_response, bot_denial, denied_response, playable_response,
};
use vidrelay_core::youtube::{FixedIdentity, Resolver, RetryPolicy};
use vidrelay_web::{AppState, build_router};

const WATCH_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

fn router_with(source: Arc<ScriptedSource>) -> Router {
    let resolver = Resolver::new(
        source,
        Arc::new(FixedIdentity::default()),
        RetryPolicy::from_config(&RetryConfig::no_delays()),
    );
    build_router(AppState::with_resolver(resolver))
}

async fn post_json(router: Router, path: &str, body: Value) -> axum::http::Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    router.oneshot(request).await.unwrap()
}

async fn body_json(response: axum::http::Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_reports_service_fields() {
    let router = router_with(Arc::new(ScriptedSource::new()));
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "OK");
    assert_eq!(body["service"], "Vidrelay API");
    assert!(body["timestamp"].is_string());
    assert!(body["version"].is_string());
    assert_eq!(body.as_object().unwrap().len(), 4);
}

#[tokio::test]
async fn test_extract_missing_url() {
    let source = Arc::new(ScriptedSource::new());
    let response = post_json(router_with(source.clone()), "/extract", json!({})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "MISSING_URL");
    assert_eq!(source.player_calls(), 0);
}

#[tokio::test]
async fn test_extract_blank_url_is_treated_as_missing() {
    let source = Arc::new(ScriptedSource::new());
    let response = post_json(
        router_with(source.clone()),
        "/extract",
        json!({"url": ""}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "MISSING_URL");
    assert_eq!(source.player_calls(), 0);
}

#[tokio::test]
async fn test_extract_non_string_url() {
    let source = Arc::new(ScriptedSource::new());
    let response = post_json(
        router_with(source.clone()),
        "/extract",
        json!({"url": 1234}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "INVALID_URL_TYPE");
    assert_eq!(source.player_calls(), 0);
}

#[tokio::test]
async fn test_extract_rejects_non_url_without_network_call() {
    let source = Arc::new(ScriptedSource::new());
    let response = post_json(
        router_with(source.clone()),
        "/extract",
        json!({"url": "not a url"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "EXTRACTION_FAILED");
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("Invalid YouTube URL format")
    );
    // Validation failed before any upstream attempt was made.
    assert_eq!(source.player_calls(), 0);
}

#[tokio::test]
async fn test_extract_returns_normalized_metadata() {
    let source = Arc::new(ScriptedSource::new());
    source.push_player(Ok(playable_response("dQw4w9WgXcQ", "Never Gonna")));

    let response = post_json(
        router_with(source.clone()),
        "/extract",
        json!({"url": WATCH_URL}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);

    let data = &body["data"];
    assert_eq!(data["title"], "Never Gonna");
    assert_eq!(data["author"], "A Channel");
    assert_eq!(data["videoId"], "dQw4w9WgXcQ");
    assert_eq!(data["videoUrl"], WATCH_URL);
    assert_eq!(data["type"], "video");
    assert_eq!(data["duration"], 212);
    assert_eq!(data["viewCount"], 31415);
    assert_eq!(source.player_calls(), 1);
}

#[tokio::test]
async fn test_extract_falls_back_to_constructed_thumbnail() {
    let source = Arc::new(ScriptedSource::new());
    source.push_player(Ok(bare_playable_response("dQw4w9WgXcQ")));

    let response = post_json(router_with(source), "/extract", json!({"url": WATCH_URL})).await;

    let body = body_json(response).await;
    let image_url = body["data"]["imageUrl"].as_str().unwrap();
    assert!(image_url.contains("dQw4w9WgXcQ"));
    assert_eq!(
        image_url,
        "https://img.youtube.com/vi/dQw4w9WgXcQ/maxresdefault.jpg"
    );
}

#[tokio::test]
async fn test_extract_reports_upstream_blocking_after_exhaustion() {
    let source = Arc::new(ScriptedSource::new());
    for _ in 0..5 {
        source.push_player(Ok(bot_denial()));
    }

    let response = post_json(
        router_with(source.clone()),
        "/extract",
        json!({"url": WATCH_URL}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "EXTRACTION_FAILED");
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("blocking automated access")
    );
    assert_eq!(source.player_calls(), 5);
}

#[tokio::test]
async fn test_download_invalid_format_code() {
    let source = Arc::new(ScriptedSource::new());
    let response = post_json(
        router_with(source.clone()),
        "/download",
        json!({"url": "not a url"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "INVALID_URL_FORMAT");
    assert_eq!(source.player_calls(), 0);
    assert_eq!(source.stream_opens(), 0);
}

#[tokio::test]
async fn test_download_rejects_foreign_host() {
    let source = Arc::new(ScriptedSource::new());
    let response = post_json(
        router_with(source),
        "/download",
        json!({"url": "https://evil.example/youtube.com/watch?v=dQw4w9WgXcQ"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "INVALID_YOUTUBE_URL");
}

#[tokio::test]
async fn test_download_private_video_fails_with_download_code() {
    let source = Arc::new(ScriptedSource::new());
    source.push_player(Ok(denied_response(
        "LOGIN_REQUIRED",
        Some("This video is private"),
    )));

    let response = post_json(
        router_with(source.clone()),
        "/download",
        json!({"url": WATCH_URL}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "DOWNLOAD_FAILED");
    assert!(body["error"].as_str().unwrap().contains("private"));
    assert_eq!(source.stream_opens(), 0);
}

#[tokio::test]
async fn test_download_without_viable_rendition() {
    let source = Arc::new(ScriptedSource::new());
    let mut response = playable_response("dQw4w9WgXcQ", "Audio Only");
    if let Some(data) = response.streaming_data.as_mut() {
        data.formats.clear();
        data.adaptive_formats[0].mime_type = Some("audio/webm; codecs=\"opus\"".to_string());
    }
    source.push_player(Ok(response));

    let reply = post_json(
        router_with(source.clone()),
        "/download",
        json!({"url": WATCH_URL}),
    )
    .await;

    assert_eq!(reply.status(), StatusCode::BAD_REQUEST);
    let body = body_json(reply).await;
    assert_eq!(body["code"], "DOWNLOAD_FAILED");
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("No suitable video format found")
    );
    assert_eq!(source.stream_opens(), 0);
}

#[tokio::test]
async fn test_download_streams_selected_rendition() {
    let source = Arc::new(ScriptedSource::new());
    source.push_player(Ok(playable_response("dQw4w9WgXcQ", "Never Gonna")));
    // Five 1000-byte chunks matching the rendition's advertised length.
    let chunks: Vec<_> = (0..5u8)
        .map(|index| Ok(Bytes::from(vec![index; 1000])))
        .collect();
    source.set_stream(chunks, Some(5000));

    let response = post_json(
        router_with(source.clone()),
        "/download",
        json!({"url": WATCH_URL, "type": "video"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "video/mp4"
    );
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"youtube-Never Gonna-"));
    assert!(disposition.ends_with(".mp4\""));
    assert_eq!(
        response.headers().get(header::CONTENT_LENGTH).unwrap(),
        "5000"
    );
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-cache"
    );

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(bytes.len(), 5000);
    assert_eq!(&bytes[..1000], vec![0u8; 1000].as_slice());
    assert_eq!(&bytes[4000..], vec![4u8; 1000].as_slice());

    assert_eq!(source.player_calls(), 1);
    assert_eq!(source.stream_opens(), 1);
}

#[tokio::test]
async fn test_download_omits_content_length_when_unknown() {
    let source = Arc::new(ScriptedSource::new());
    let mut player = playable_response("dQw4w9WgXcQ", "Live-ish");
    if let Some(data) = player.streaming_data.as_mut() {
        data.formats[0].content_length = None;
    }
    source.push_player(Ok(player));
    source.set_stream(vec![Ok(Bytes::from_static(b"abc"))], None);

    let response = post_json(
        router_with(source),
        "/download",
        json!({"url": WATCH_URL}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::CONTENT_LENGTH).is_none());
}

#[tokio::test]
async fn test_requests_are_independent() {
    // Two sequential requests against one source: the second resolve
    // consumes its own scripted outcome, nothing is cached or shared.
    let source = Arc::new(ScriptedSource::new());
    source.push_player(Ok(playable_response("dQw4w9WgXcQ", "First")));
    source.push_player(Ok(playable_response("dQw4w9WgXcQ", "Second")));

    let router = router_with(source.clone());

    let first = post_json(router.clone(), "/extract", json!({"url": WATCH_URL})).await;
    let second = post_json(router, "/extract", json!({"url": WATCH_URL})).await;

    assert_eq!(body_json(first).await["data"]["title"], "First");
    assert_eq!(body_json(second).await["data"]["title"], "Second");
    assert_eq!(source.player_calls(), 2);
}
