//! Exercises `VisionClient` against a local stand-in for the Responses API.

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use copilot_driver_vision::{
    Classifier, ClassifyError, Verdict, VisionAuth, VisionClient, VisionConfig, VisionEndpoint,
    KEEP_BUTTON_PROMPT,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone)]
struct Backend {
    reply: Arc<dyn Fn() -> Response + Send + Sync>,
    seen: Arc<Mutex<Vec<Seen>>>,
}

#[derive(Debug, Clone)]
struct Seen {
    headers: HeaderMap,
    query: HashMap<String, String>,
    body: Value,
}

async fn responses(
    State(backend): State<Backend>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    backend.seen.lock().unwrap().push(Seen {
        headers,
        query,
        body,
    });
    (backend.reply)()
}

async fn spawn_backend(backend: Backend) -> String {
    let app = Router::new()
        .route("/openai/responses", post(responses))
        .route("/v1/responses", post(responses))
        .with_state(backend);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn azure_config(base: &str) -> VisionConfig {
    VisionConfig {
        endpoint: VisionEndpoint::Azure {
            endpoint: base.to_string(),
            api_version: "2025-03-01-preview".to_string(),
        },
        auth: VisionAuth::AzureApiKey("test-key".to_string()),
        model: "computer-use-preview".to_string(),
        display_width: 1920,
        display_height: 1080,
        environment: "windows".to_string(),
        timeout: Duration::from_secs(10),
    }
}

fn message_reply(text: &'static str) -> Arc<dyn Fn() -> Response + Send + Sync> {
    Arc::new(move || {
        Json(json!({
            "id": "resp_test",
            "output": [{
                "type": "message",
                "role": "assistant",
                "content": [{ "type": "output_text", "text": text }]
            }]
        }))
        .into_response()
    })
}

#[tokio::test]
async fn test_classify_reads_verdict_from_message_text() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let base = spawn_backend(Backend {
        reply: message_reply("Here you go:\n```json\n{\"button\": \"enabled\"}\n```"),
        seen: seen.clone(),
    })
    .await;

    let client = VisionClient::new(azure_config(&base)).unwrap();
    let object = client.classify("iVBORw0KGgo=", KEEP_BUTTON_PROMPT).await.unwrap();
    assert!(Verdict::read(&object, "button").is("enabled"));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let request = &seen[0];
    assert_eq!(request.headers.get("api-key").unwrap(), "test-key");
    assert_eq!(request.query.get("api-version").unwrap(), "2025-03-01-preview");
    assert_eq!(request.body["model"], "computer-use-preview");
    assert_eq!(
        request.body["input"][0]["content"][1]["image_url"],
        "data:image/png;base64,iVBORw0KGgo="
    );
}

#[tokio::test]
async fn test_bearer_auth_for_openai_endpoint() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let base = spawn_backend(Backend {
        reply: message_reply("{\"installation_status\":\"in_progress\"}"),
        seen: seen.clone(),
    })
    .await;

    let mut config = azure_config(&base);
    config.endpoint = VisionEndpoint::OpenAi {
        base_url: format!("{base}/v1"),
    };
    config.auth = VisionAuth::Bearer("sk-test".to_string());

    let client = VisionClient::new(config).unwrap();
    let object = client.classify("AAAA", "prompt").await.unwrap();
    assert!(Verdict::read(&object, "installation_status").is("in_progress"));

    let seen = seen.lock().unwrap();
    assert_eq!(
        seen[0].headers.get("authorization").unwrap(),
        "Bearer sk-test"
    );
}

#[tokio::test]
async fn test_non_success_status_is_typed() {
    let base = spawn_backend(Backend {
        reply: Arc::new(|| (StatusCode::TOO_MANY_REQUESTS, "slow down").into_response()),
        seen: Arc::new(Mutex::new(Vec::new())),
    })
    .await;

    let client = VisionClient::new(azure_config(&base)).unwrap();
    let err = client.classify("AAAA", "prompt").await.unwrap_err();
    match err {
        ClassifyError::Status { status, body } => {
            assert_eq!(status, 429);
            assert_eq!(body, "slow down");
        }
        other => panic!("expected status error, got {other:?}"),
    }
    assert!(ClassifyError::Status {
        status: 429,
        body: String::new()
    }
    .is_recoverable());
}

#[tokio::test]
async fn test_free_text_answer_is_unparseable() {
    let base = spawn_backend(Backend {
        reply: message_reply("I can't tell from this screenshot."),
        seen: Arc::new(Mutex::new(Vec::new())),
    })
    .await;

    let client = VisionClient::new(azure_config(&base)).unwrap();
    let err = client.classify("AAAA", "prompt").await.unwrap_err();
    assert!(matches!(err, ClassifyError::Unparseable { .. }));
}

#[tokio::test]
async fn test_body_without_text_falls_back_to_braced_span() {
    let base = spawn_backend(Backend {
        reply: Arc::new(|| {
            "garbage before {\"button\": \"disabled\"} garbage after".into_response()
        }),
        seen: Arc::new(Mutex::new(Vec::new())),
    })
    .await;

    let client = VisionClient::new(azure_config(&base)).unwrap();
    let text = client.request_text("AAAA", "prompt").await.unwrap();
    assert_eq!(text, "{\"button\": \"disabled\"}");
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = VisionClient::new(azure_config(&format!("http://{addr}"))).unwrap();
    let err = client.classify("AAAA", "prompt").await.unwrap_err();
    assert!(matches!(err, ClassifyError::Transport(_)));
}
