//! API endpoint integration tests

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use callbell::announce::Announcement;
use callbell::Config;
use tower::ServiceExt;

mod common;
use common::{setup_relay, setup_relay_with};

/// Send a JSON POST through the router
async fn post_json(
    router: &Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// Send a GET through the router
async fn get_json(router: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn press(button: &str) -> serde_json::Value {
    serde_json::json!({ "type": button })
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let relay = setup_relay();

    let (status, json) = get_json(&relay.router, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn ready_endpoint_reports_checks() {
    let relay = setup_relay();

    let (status, json) = get_json(&relay.router, "/ready").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["checks"]["journal"]["status"], "ok");
    assert_eq!(json["checks"]["announcer"]["status"], "ok");
}

#[tokio::test]
async fn ready_degrades_when_announcer_is_gone() {
    let relay = setup_relay();
    drop(relay.announcements);

    let (status, json) = get_json(&relay.router, "/ready").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["announcer"]["status"], "fail");
}

#[tokio::test]
async fn latest_starts_with_placeholder() {
    let relay = setup_relay();

    let (status, json) = get_json(&relay.router, "/latest").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["latest"]["type"], "-");
    assert_eq!(json["latest"]["message"], "-");
    assert_eq!(json["latest"]["timestamp"], "-");
    assert_eq!(json["history"].as_array().unwrap().len(), 0);
    // All configured buttons are present at zero from startup.
    assert_eq!(json["counts"]["VOICE"], 0);
    assert_eq!(json["counts"]["MEDICINE"], 0);
}

#[tokio::test]
async fn press_is_recorded_and_counted() {
    let relay = setup_relay();

    let (status, json) = post_json(&relay.router, "/emergency", &press("MEDICINE")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "received");

    let (_, json) = get_json(&relay.router, "/latest").await;
    assert_eq!(json["latest"]["type"], "MEDICINE");
    assert_eq!(json["latest"]["message"], "MEDICINE button pressed");
    assert_eq!(json["latest"]["location"], "Unknown");
    assert_eq!(json["counts"]["MEDICINE"], 1);
    assert_eq!(json["counts"]["VOICE"], 0);
    assert_eq!(json["history"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn press_resolves_speech_for_dashboard() {
    let relay = setup_relay();

    post_json(&relay.router, "/emergency", &press("MEDICINE")).await;

    let (_, json) = get_json(&relay.router, "/latest").await;
    assert_eq!(
        json["latest"]["speech"],
        "It is time to take your medicine. Please don't forget."
    );
    assert!(json["latest"]["audio"].is_null());
}

#[tokio::test]
async fn audio_button_resolves_clip_url() {
    let relay = setup_relay();

    post_json(&relay.router, "/emergency", &press("CHIME")).await;

    let (_, json) = get_json(&relay.router, "/latest").await;
    assert_eq!(json["latest"]["audio"], "/static/chime.mp3");
}

#[tokio::test]
async fn press_reports_device_location() {
    let relay = setup_relay();

    post_json(
        &relay.router,
        "/emergency",
        &serde_json::json!({ "type": "VOICE", "location": "bedroom" }),
    )
    .await;

    let (_, json) = get_json(&relay.router, "/latest").await;
    assert_eq!(json["latest"]["location"], "bedroom");
}

#[tokio::test]
async fn unknown_button_kept_in_history_but_not_counted() {
    let mut relay = setup_relay();

    let (status, json) = post_json(&relay.router, "/emergency", &press("DOORBELL")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "received");

    let (_, json) = get_json(&relay.router, "/latest").await;
    assert_eq!(json["latest"]["type"], "DOORBELL");
    assert!(json["counts"].get("DOORBELL").is_none());
    assert_eq!(json["history"].as_array().unwrap().len(), 1);

    // Nothing to announce for an unregistered button.
    assert!(relay.announcements.try_recv().is_err());
}

#[tokio::test]
async fn history_is_bounded_and_counters_survive_eviction() {
    let mut config = Config::default();
    config.journal.history_size = 3;
    let relay = setup_relay_with(&config);

    for _ in 0..5 {
        post_json(&relay.router, "/emergency", &press("VOICE")).await;
    }

    let (_, json) = get_json(&relay.router, "/latest").await;
    assert_eq!(json["history"].as_array().unwrap().len(), 3);
    assert_eq!(json["counts"]["VOICE"], 5);
}

#[tokio::test]
async fn history_is_ordered_oldest_first() {
    let relay = setup_relay();

    post_json(&relay.router, "/emergency", &press("VOICE")).await;
    post_json(&relay.router, "/emergency", &press("MEDICINE")).await;
    post_json(&relay.router, "/emergency", &press("MUSIC")).await;

    let (_, json) = get_json(&relay.router, "/latest").await;
    let history = json["history"].as_array().unwrap();
    assert_eq!(history[0]["type"], "VOICE");
    assert_eq!(history[1]["type"], "MEDICINE");
    assert_eq!(history[2]["type"], "MUSIC");
    assert_eq!(json["latest"]["type"], "MUSIC");
}

#[tokio::test]
async fn press_enqueues_speech_announcement() {
    let mut relay = setup_relay();

    post_json(&relay.router, "/emergency", &press("MEDICINE")).await;

    let announcement = relay.announcements.recv().await.unwrap();
    assert_eq!(
        announcement,
        Announcement::Speak("It is time to take your medicine. Please don't forget.".to_string())
    );
}

#[tokio::test]
async fn audio_button_enqueues_clip_announcement() {
    let mut relay = setup_relay();

    post_json(&relay.router, "/emergency", &press("CHIME")).await;

    let announcement = relay.announcements.recv().await.unwrap();
    assert_eq!(
        announcement,
        Announcement::PlayFile(std::path::PathBuf::from("static/chime.mp3"))
    );
}

#[tokio::test]
async fn quote_button_enqueues_a_configured_quote() {
    let config = Config::default();
    let mut relay = setup_relay_with(&config);

    post_json(&relay.router, "/emergency", &press("QUOTE")).await;

    match relay.announcements.recv().await.unwrap() {
        Announcement::Speak(text) => assert!(config.quotes.contains(&text)),
        other => panic!("unexpected announcement: {other:?}"),
    }
}

#[tokio::test]
async fn announcements_arrive_in_press_order() {
    let mut relay = setup_relay();

    post_json(&relay.router, "/emergency", &press("VOICE")).await;
    post_json(&relay.router, "/emergency", &press("MUSIC")).await;

    assert!(matches!(
        relay.announcements.recv().await.unwrap(),
        Announcement::Speak(text) if text.starts_with("Hello")
    ));
    assert!(matches!(
        relay.announcements.recv().await.unwrap(),
        Announcement::Speak(text) if text.starts_with("Playing")
    ));
}

#[tokio::test]
async fn dashboard_page_is_served() {
    let relay = setup_relay();

    let response = relay
        .router
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let page = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(page.contains("Callbell Dashboard"));
    assert!(page.contains("/latest"));
}

#[tokio::test]
async fn malformed_press_is_rejected() {
    let relay = setup_relay();

    let response = relay
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/emergency")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"no_type\": true}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
