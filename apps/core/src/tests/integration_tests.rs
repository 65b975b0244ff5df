//! Integration Tests
//!
//! End-to-end tests that drive the HTTP router against a trained model and a
//! temporary SQLite store.

use crate::brain::analyzer::{OUT_OF_SCOPE_LABEL, OUT_OF_SCOPE_MESSAGE};
use crate::brain::corpus::TRAINING_EXAMPLES;
use crate::brain::training::train;
use crate::brain::StressAnalyzer;
use crate::database::{Store, StoreConfig};
use crate::server::{router, AppState};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

// ============================================================================
// Test Fixtures
// ============================================================================

/// Build the full application on a fresh store. The directory must outlive
/// the router.
async fn create_test_app() -> (TempDir, Router) {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = Store::new(&StoreConfig::Sqlite {
        path: dir.path().join("data").join("stress_chat.db"),
    })
    .expect("Failed to create store");
    store.ensure_schema().await.expect("Failed to prepare schema");
    store.seed_resources().await.expect("Failed to seed resources");

    let (model, _) = train(TRAINING_EXAMPLES);
    let knowledge = json!([{ "topic": "breathing", "summary": "Slow breaths calm the body." }]);
    let state = AppState::new(StressAnalyzer::new(model), knowledge, store);

    let static_dir = dir.path().join("static");
    std::fs::create_dir_all(&static_dir).expect("Failed to create static dir");
    std::fs::write(static_dir.join("style.css"), "body { margin: 0; }").unwrap();

    (dir, router(state, Some(static_dir)))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_form(uri: &str, pairs: &[(&str, &str)]) -> Request<Body> {
    let body = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

const BOUNDARY: &str = "escapestress-test-boundary";

/// Text parts are `(name, value)`; a part named `upload` is sent as a file.
fn post_multipart(uri: &str, parts: &[(&str, &str)]) -> Request<Body> {
    let mut body = String::new();
    for (name, value) in parts {
        body.push_str(&format!("--{}\r\n", BOUNDARY));
        if *name == "upload" {
            body.push_str(
                "Content-Disposition: form-data; name=\"upload\"; filename=\"notes.txt\"\r\n",
            );
            body.push_str("Content-Type: text/plain\r\n");
        } else {
            body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{}\"\r\n",
                name
            ));
        }
        body.push_str(&format!("\r\n{}\r\n", value));
    }
    body.push_str(&format!("--{}--\r\n", BOUNDARY));

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

// ============================================================================
// Chat Flow
// ============================================================================

#[cfg(test)]
mod chat_flow_tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let (_dir, app) = create_test_app().await;

        let (status, body) = send(&app, post_form("/get", &[("msg", "   ")])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Empty message");

        let (status, body) = send(&app, post_json("/get", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Empty message");
    }

    #[tokio::test]
    async fn test_missing_body_rejected() {
        let (_dir, app) = create_test_app().await;
        let request = Request::builder()
            .method("POST")
            .uri("/get")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_content_type_rejected() {
        let (_dir, app) = create_test_app().await;
        let request = Request::builder()
            .method("POST")
            .uri("/get")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("msg=I feel anxious"))
            .unwrap();

        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(body["error"].as_str().is_some_and(|e| e.contains("text/plain")));

        let (_, history) = send(&app, get("/history")).await;
        assert_eq!(history, json!([]));
    }

    #[tokio::test]
    async fn test_multipart_chat_is_analysed() {
        let (_dir, app) = create_test_app().await;

        let (status, body) = send(
            &app,
            post_multipart(
                "/get",
                &[
                    ("upload", "ignored"),
                    ("msg", "I am feeling anxious and overwhelmed"),
                ],
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stress_type"], "Anxiety");

        let (_, history) = send(&app, get("/history")).await;
        assert_eq!(history[0]["user"], "I am feeling anxious and overwhelmed");
    }

    #[tokio::test]
    async fn test_multipart_without_msg_rejected() {
        let (_dir, app) = create_test_app().await;

        let (status, body) = send(&app, post_multipart("/get", &[("other", "x")])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Empty message");
    }

    #[tokio::test]
    async fn test_out_of_scope_is_deflected_and_not_logged() {
        let (_dir, app) = create_test_app().await;

        let (status, body) =
            send(&app, post_form("/get", &[("msg", "Tell me a joke about cats")])).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["label"], OUT_OF_SCOPE_LABEL);
        assert_eq!(body["message"], OUT_OF_SCOPE_MESSAGE);
        assert!(body.get("confidence").is_none());

        let (_, history) = send(&app, get("/history")).await;
        assert_eq!(history, json!([]));
    }

    #[tokio::test]
    async fn test_in_scope_chat_full_payload() {
        let (_dir, app) = create_test_app().await;

        let (status, body) = send(
            &app,
            post_form("/get", &[("msg", "I am feeling anxious and overwhelmed")]),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        assert_eq!(body["stress_type"], "Anxiety");
        assert!(body["label"].is_string());
        assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
        assert_eq!(body["tips"].as_array().map(Vec::len), Some(3));
        assert_eq!(body["action_plan"].as_array().map(Vec::len), Some(3));
        assert_eq!(body["guide"]["type"], "breathing");

        let confidence = body["confidence"].as_object().unwrap();
        assert_eq!(confidence.len(), 6);
        let total: f64 = confidence.values().filter_map(Value::as_f64).sum();
        assert!((total - 1.0).abs() < 1e-6);

        let categories: Vec<&str> = body["resources"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|r| r["category"].as_str())
            .collect();
        assert_eq!(categories, vec!["Anxiety", "general"]);
    }

    #[tokio::test]
    async fn test_chat_appears_in_history() {
        let (_dir, app) = create_test_app().await;

        let (_, first) =
            send(&app, post_json("/get", json!({ "msg": "I can't sleep at night" }))).await;
        let (_, second) =
            send(&app, post_json("/get", json!({ "msg": "I have a deadline for my exam" }))).await;
        assert_eq!(second["intent"], "workload");
        assert!(second["guide"].is_null());

        let (status, history) = send(&app, get("/history")).await;
        assert_eq!(status, StatusCode::OK);
        let rows = history.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["user"], "I have a deadline for my exam");
        assert_eq!(rows[0]["bot"], second["message"]);
        assert_eq!(rows[0]["label"], second["label"]);
        assert_eq!(rows[1]["user"], "I can't sleep at night");
        assert_eq!(rows[1]["label"], first["label"]);
    }

    #[tokio::test]
    async fn test_message_is_trimmed_before_logging() {
        let (_dir, app) = create_test_app().await;

        send(&app, post_form("/get", &[("msg", "   I feel stressed   ")])).await;
        let (_, history) = send(&app, get("/history")).await;
        assert_eq!(history[0]["user"], "I feel stressed");
    }
}

// ============================================================================
// Journal Flow
// ============================================================================

#[cfg(test)]
mod journal_flow_tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_entry_rejected() {
        let (_dir, app) = create_test_app().await;

        let (status, body) = send(&app, post_json("/journal", json!({ "entry": "" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Empty entry");

        let (status, body) = send(&app, post_form("/journal", &[])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Empty entry");
    }

    #[tokio::test]
    async fn test_whitespace_entry_stored_verbatim() {
        let (_dir, app) = create_test_app().await;

        let (status, saved) = send(&app, post_json("/journal", json!({ "entry": "  " }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(saved["status"], "ok");

        let (_, recent) = send(&app, get("/journal/recent")).await;
        assert_eq!(recent[0]["entry"], "  ");
    }

    #[tokio::test]
    async fn test_multipart_journal_entry() {
        let (_dir, app) = create_test_app().await;

        let (status, saved) =
            send(&app, post_multipart("/journal", &[("entry", "Today was ok")])).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(saved["status"], "ok");

        let (_, recent) = send(&app, get("/journal/recent")).await;
        assert_eq!(recent.as_array().map(Vec::len), Some(1));
        assert_eq!(recent[0]["entry"], "Today was ok");
    }

    #[tokio::test]
    async fn test_journal_round_trip() {
        let (_dir, app) = create_test_app().await;

        let (status, saved) =
            send(&app, post_json("/journal", json!({ "entry": "Grateful for tea" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(saved["status"], "ok");
        let created_at = saved["created_at"].as_str().unwrap().to_string();
        assert!(chrono::NaiveDateTime::parse_from_str(&created_at, "%Y-%m-%dT%H:%M:%S%.f").is_ok());

        send(&app, post_form("/journal", &[("entry", "Second thought")])).await;

        let (status, recent) = send(&app, get("/journal/recent")).await;
        assert_eq!(status, StatusCode::OK);
        let entries = recent.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["entry"], "Second thought");
        assert_eq!(entries[1]["entry"], "Grateful for tea");
        assert_eq!(entries[1]["created_at"], created_at.as_str());
    }
}

// ============================================================================
// Static and Auxiliary Endpoints
// ============================================================================

#[cfg(test)]
mod endpoint_tests {
    use super::*;

    #[tokio::test]
    async fn test_index_serves_html() {
        let (_dir, app) = create_test_app().await;
        let response = app.clone().oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
        assert!(content_type.starts_with("text/html"));
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let page = String::from_utf8_lossy(&bytes);
        assert!(page.contains("<html"));

        for endpoint in [
            "/get",
            "/journal",
            "/journal/recent",
            "/user",
            "/resources_db",
            "/breathing",
            "/knowledge",
            "/log_action",
        ] {
            assert!(
                page.contains(&format!("'{}'", endpoint)),
                "index page never calls {}",
                endpoint
            );
        }
    }

    #[tokio::test]
    async fn test_static_files_served() {
        let (_dir, app) = create_test_app().await;
        let response = app.clone().oneshot(get("/static/style.css")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health() {
        let (_dir, app) = create_test_app().await;
        let (status, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_breathing_steps() {
        let (_dir, app) = create_test_app().await;
        let (status, body) = send(&app, get("/breathing")).await;
        assert_eq!(status, StatusCode::OK);

        let steps = body["steps"].as_array().unwrap();
        assert_eq!(steps.len(), 5);
        assert!(steps.iter().all(|s| s["text"].is_string()));
    }

    #[tokio::test]
    async fn test_resources_db_lists_seeded_links() {
        let (_dir, app) = create_test_app().await;
        let (status, body) = send(&app, get("/resources_db")).await;
        assert_eq!(status, StatusCode::OK);

        let links = body.as_array().unwrap();
        assert_eq!(links.len(), 6);
        assert_eq!(links[0]["category"], "Anxiety");
        assert!(links.iter().all(|l| l["id"].is_i64()));
    }

    #[tokio::test]
    async fn test_knowledge_is_served() {
        let (_dir, app) = create_test_app().await;
        let (status, body) = send(&app, get("/knowledge")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["topic"], "breathing");
    }

    #[tokio::test]
    async fn test_create_user() {
        let (_dir, app) = create_test_app().await;

        let (status, body) = send(
            &app,
            post_form("/user", &[("name", "Sam"), ("email", "sam@example.org")]),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Sam");
        assert_eq!(body["email"], "sam@example.org");
    }

    #[tokio::test]
    async fn test_create_user_accepts_long_fields() {
        let (_dir, app) = create_test_app().await;
        let name = "x".repeat(500);
        let email = format!("{}@example.org", "y".repeat(400));

        let (status, body) =
            send(&app, post_json("/user", json!({ "name": name, "email": email }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], name.as_str());
        assert_eq!(body["email"], email.as_str());
    }

    #[tokio::test]
    async fn test_create_user_from_multipart() {
        let (_dir, app) = create_test_app().await;

        let (status, body) = send(
            &app,
            post_multipart("/user", &[("name", "Sam"), ("email", "sam@example.org")]),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Sam");
        assert_eq!(body["email"], "sam@example.org");
    }

    #[tokio::test]
    async fn test_log_action() {
        let (_dir, app) = create_test_app().await;

        let (status, body) = send(
            &app,
            post_json(
                "/log_action",
                json!({ "action_type": "playlist", "details": "Calmful" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "logged");

        let (status, _) = send(&app, post_json("/log_action", json!({}))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_malformed_json_is_client_error() {
        let (_dir, app) = create_test_app().await;
        let request = Request::builder()
            .method("POST")
            .uri("/journal")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
}
