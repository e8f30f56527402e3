use std::sync::Arc;

use agent_core::{Config, EmbeddingConfig, RagConfig, ServerConfig};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use server::create_app;
use server::state::AppState;
use tempfile::TempDir;
use tower::ServiceExt;

fn test_state() -> (Arc<AppState>, TempDir, TempDir) {
    let notes = TempDir::new().unwrap();
    let snapshots = TempDir::new().unwrap();

    let config = Config {
        embedding: EmbeddingConfig {
            provider: "fallback".to_string(),
            model: None,
            dimensions: Some(16),
        },
        rag: RagConfig {
            notes_dir: notes.path().display().to_string(),
            snapshot_dir: snapshots.path().join("store").display().to_string(),
            ..RagConfig::default()
        },
        ..Config::default()
    };

    (Arc::new(AppState::without_classifier(config)), notes, snapshots)
}

fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn should_report_uninitialized_status_on_startup() {
    let (state, _notes, _snapshots) = test_state();
    let app = create_app(state);

    let response = app
        .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["initialized"], false);
}

#[tokio::test]
async fn should_reject_empty_chat_message() {
    let (state, _notes, _snapshots) = test_state();
    let app = create_app(state);

    let response = app
        .oneshot(json_request("/chat", serde_json::json!({"message": ""})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Empty message");
}

#[tokio::test]
async fn should_reject_whitespace_only_chat_message() {
    let (state, _notes, _snapshots) = test_state();
    let app = create_app(state);

    let response = app
        .oneshot(json_request("/chat", serde_json::json!({"message": "   \n  "})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn should_serve_chat_page_with_session_id() {
    let (state, _notes, _snapshots) = test_state();
    let app = create_app(state.clone());

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let page = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(!page.contains("{{session_id}}"));
    assert_eq!(state.sessions.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_sweep_expired_sessions_on_page_load() {
    let (state, _notes, _snapshots) = test_state();
    let config = Config {
        server: ServerConfig {
            session_ttl_secs: 0,
            ..ServerConfig::default()
        },
        ..state.config.clone()
    };
    let state = Arc::new(AppState::without_classifier(config));
    let app = create_app(state.clone());

    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Each page load reaps the previous, already-expired session.
    assert_eq!(state.sessions.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_serve_draw_page() {
    let (state, _notes, _snapshots) = test_state();
    let app = create_app(state);

    let response = app
        .oneshot(Request::builder().uri("/draw").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn should_fail_predict_without_classifier() {
    let (state, _notes, _snapshots) = test_state();
    let app = create_app(state);

    let response = app
        .oneshot(json_request(
            "/predict",
            serde_json::json!({"image": "data:image/png;base64,AAAA"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Digit model not available");
}

#[tokio::test]
async fn should_return_not_found_for_unknown_route() {
    let (state, _notes, _snapshots) = test_state();
    let app = create_app(state);

    let response = app
        .oneshot(Request::builder().uri("/missing").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
