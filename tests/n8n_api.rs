mod common;

use axum::http::StatusCode;
use common::{API_KEY, RecordingRelay, TestApp, build_test_app, get, json_request, post_json, send};
use serde_json::{Value, json};

async fn seeded(api_key: Option<&str>, relay: RecordingRelay) -> (TestApp, i64) {
    let t = build_test_app(api_key, relay).await;
    let (status, body) = post_json(&t.app, "/populate-database", json!({})).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let webinar_id = body["webinar_id"].as_i64().unwrap();
    (t, webinar_id)
}

async fn relay_post(t: &TestApp, uri: &str, body: Value) -> (StatusCode, Value) {
    send(&t.app, json_request("POST", uri, body, None)).await
}

async fn enroll(t: &TestApp, user_id: i64, webinar_id: i64) -> i64 {
    let (status, body) = relay_post(
        t,
        "/api/n8n/enroll",
        json!({"user_id": user_id, "webinar_id": webinar_id}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "success");

    let participant: i64 = sqlx::query_scalar(
        "SELECT id FROM participants WHERE user_id = ? AND webinar_id = ?",
    )
    .bind(user_id)
    .bind(webinar_id)
    .fetch_one(&t.pool)
    .await
    .unwrap();
    participant
}

#[tokio::test]
async fn test_guard_rejects_missing_or_wrong_key() {
    let t = build_test_app(Some(API_KEY), RecordingRelay::default()).await;

    let (status, body) = get(&t.app, "/api/n8n/reminders").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or missing API key");

    let request = json_request("POST", "/api/n8n/send-progress/1", json!({}), Some("wrong"));
    let (status, _) = send(&t.app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = axum::http::Request::get("/api/n8n/reminders")
        .header("x-api-key", API_KEY)
        .body(axum::body::Body::empty())
        .unwrap();
    let (status, body) = send(&t.app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);

    // Health stays open.
    let (status, body) = get(&t.app, "/api/n8n/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "n8n-integration");
    assert_eq!(body["n8n_api_key_configured"], true);
}

#[tokio::test]
async fn test_guard_disabled_without_key() {
    let t = build_test_app(None, RecordingRelay::default()).await;
    let (status, _) = get(&t.app, "/api/n8n/reminders").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_enrollment_is_idempotent() {
    let (t, webinar_id) = seeded(None, RecordingRelay::default()).await;

    let first = enroll(&t, 42, webinar_id).await;
    let second = enroll(&t, 42, webinar_id).await;
    assert_eq!(first, second);

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM participants")
        .fetch_one(&t.pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);
    assert_eq!(t.relay.event_names(), vec!["enrollment_confirmation"]);

    let (status, body) = get(&t.app, &format!("/api/participants/{first}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completion_status"], "enrolled");
    assert_eq!(body["current_day"], 1);
}

#[tokio::test]
async fn test_enrollment_for_unknown_webinar() {
    let t = build_test_app(None, RecordingRelay::default()).await;
    let (status, _) = relay_post(&t, "/api/n8n/enroll", json!({"user_id": 1, "webinar_id": 77})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(t.relay.events().is_empty());
}

#[tokio::test]
async fn test_progress_to_completion() {
    let (t, webinar_id) = seeded(None, RecordingRelay::default()).await;
    let participant = enroll(&t, 42, webinar_id).await;

    let (status, body) = relay_post(
        &t,
        "/api/n8n/update-progress",
        json!({"participant_id": participant, "day_completed": 2}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = relay_post(
        &t,
        "/api/n8n/update-progress",
        json!({"participant_id": participant, "day_completed": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Failed to update progress");

    let (status, _) = relay_post(
        &t,
        "/api/n8n/update-progress",
        json!({"participant_id": participant, "day_completed": 12}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get(&t.app, &format!("/api/participants/{participant}")).await;
    assert_eq!(body["current_day"], 10);
    assert_eq!(body["completion_status"], "completed");

    let (status, _) = relay_post(
        &t,
        "/api/n8n/update-progress",
        json!({"participant_id": participant, "day_completed": 10}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let names = t.relay.event_names();
    assert_eq!(
        names,
        vec![
            "enrollment_confirmation",
            "participant_progress",
            "webinar_completion",
            "participant_progress",
        ]
    );

    let events = t.relay.events();
    let last = &events[3];
    assert_eq!(last["participant"]["current_day"], 10);
    assert_eq!(last["participant"]["webinar_title"], "10-Day Anti-Stress Journey");
    assert_eq!(last["progress_percentage"], 100.0);
    assert_eq!(events[2]["participant"]["total_days"], 10);
}

#[tokio::test]
async fn test_progress_for_unknown_participant() {
    let t = build_test_app(None, RecordingRelay::default()).await;
    let (status, _) = relay_post(
        &t,
        "/api/n8n/update-progress",
        json!({"participant_id": 5, "day_completed": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_send_progress_includes_responses() {
    let (t, webinar_id) = seeded(None, RecordingRelay::default()).await;
    let participant = enroll(&t, 42, webinar_id).await;

    let (status, body) = post_json(
        &t.app,
        &format!("/api/participants/{participant}/responses"),
        json!({"day_number": 1, "question_id": 0, "response_text": "A little tense"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = relay_post(&t, &format!("/api/n8n/send-progress/{participant}"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let events = t.relay.events();
    let progress = events.last().unwrap();
    assert_eq!(progress["event"], "participant_progress");
    assert_eq!(progress["responses"][0]["response_text"], "A little tense");
    assert_eq!(progress["progress_percentage"], 10.0);
    assert!(progress["event_id"].is_string());

    let (status, _) = relay_post(&t, "/api/n8n/send-completion/999", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_send_reports_delivery_failure() {
    let (t, webinar_id) = seeded(None, RecordingRelay::failing()).await;
    let participant = enroll(&t, 42, webinar_id).await;

    let (status, body) = relay_post(&t, &format!("/api/n8n/send-completion/{participant}"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "failed");
    assert_eq!(body["message"], "Failed to send completion event");
}

#[tokio::test]
async fn test_webhook_dispatch() {
    let (t, webinar_id) = seeded(None, RecordingRelay::default()).await;

    let (status, body) = relay_post(
        &t,
        "/api/n8n/webhook",
        json!({"event": "enrollment_data", "data": {"user_id": 9, "webinar_id": webinar_id, "enrollment_date": "2024-05-01T09:30:00"}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "Enrollment processed");

    let (status, body) = relay_post(
        &t,
        "/api/n8n/webhook",
        json!({"event": "content_update", "data": {"webinar_id": webinar_id, "day_number": 2, "content": {"morning": {"greeting": "Hello again"}}}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (_, day) = get(&t.app, &format!("/api/webinars/{webinar_id}/days/2")).await;
    assert_eq!(day["content"]["morning"]["greeting"], "Hello again");
    assert!(day["content"]["evening"].is_null());

    let (status, body) = relay_post(&t, "/api/n8n/webhook", json!({"event": "unsubscribe", "data": {}})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Unknown event type: unsubscribe");
}

#[tokio::test]
async fn test_update_content_rejects_empty_object() {
    let (t, webinar_id) = seeded(None, RecordingRelay::default()).await;
    let (status, _) = relay_post(
        &t,
        "/api/n8n/update-content",
        json!({"webinar_id": webinar_id, "day_number": 1, "content": {}}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = relay_post(
        &t,
        "/api/n8n/update-content",
        json!({"webinar_id": webinar_id, "day_number": 11, "content": {"morning": {}}}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reminders_list_quiet_participants() {
    let (t, webinar_id) = seeded(None, RecordingRelay::default()).await;

    let (status, _) = relay_post(
        &t,
        "/api/n8n/enroll",
        json!({"user_id": 1, "webinar_id": webinar_id, "enrollment_date": "2020-01-01T00:00:00Z"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    enroll(&t, 2, webinar_id).await;

    let (status, body) = get(&t.app, "/api/n8n/reminders").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["count"], 1);
    assert_eq!(body["reminders"][0]["user_id"], 1);
    assert_eq!(body["reminders"][0]["completion_status"], "enrolled");
}

#[tokio::test]
async fn test_malformed_bodies_are_json_bad_requests() {
    let (t, webinar_id) = seeded(None, RecordingRelay::default()).await;

    let (status, body) = relay_post(&t, "/api/n8n/enroll", json!({"webinar_id": webinar_id})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "400 Bad Request");
    assert!(body["message"].as_str().unwrap().contains("user_id"));

    let (status, body) = relay_post(&t, "/api/n8n/update-progress", json!({"participant_id": 1})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("day_completed"));

    let (status, body) = relay_post(&t, "/api/n8n/send-progress/abc", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
    assert!(t.relay.event_names().is_empty());
}

#[tokio::test]
async fn test_huge_day_completed_completes_participant() {
    let (t, webinar_id) = seeded(None, RecordingRelay::default()).await;
    let participant = enroll(&t, 42, webinar_id).await;

    let (status, body) = relay_post(
        &t,
        "/api/n8n/update-progress",
        json!({"participant_id": participant, "day_completed": i64::MAX}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (_, body) = get(&t.app, &format!("/api/participants/{participant}")).await;
    assert_eq!(body["current_day"], 10);
    assert_eq!(body["completion_status"], "completed");
}
