//! Integration tests for the webhook gateway
//!
//! Each test starts a stub automation backend and the real gateway router on
//! ephemeral ports, then drives the gateway over HTTP.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use toolhub_gateway::config::{GatewayConfig, WebhookEntry};
use toolhub_gateway::executor::Executor;
use toolhub_gateway::registry::{FieldKind, Registry};
use toolhub_gateway::server::{self, AppState};
use toolhub_gateway::status::StatusPoller;
use toolhub_gateway::validator::Validator;

/// Requests seen by the stub backend: (path, headers, body)
type Seen = Arc<Mutex<Vec<(String, HeaderMap, Value)>>>;

async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Stub n8n: every route records the call and replies with a fixed body
async fn spawn_backend(routes: Vec<(&'static str, StatusCode, Value)>, seen: Seen) -> String {
    let mut app = Router::new();
    for (name, status, reply) in routes {
        let path = format!("/{name}");
        app = app.route(
            &path,
            post(move |State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>| {
                let reply = reply.clone();
                async move {
                    seen.lock().unwrap().push((name.to_string(), headers, body));
                    (status, Json(reply))
                }
            }),
        );
    }
    spawn(app.with_state(seen)).await
}

async fn spawn_gateway(config: GatewayConfig) -> String {
    let registry = Arc::new(Registry::from_config(&config));
    let executor = Arc::new(Executor::new(
        Validator::new(config.uploads),
        config.upstream.timeout(),
    ));
    let poller = StatusPoller::new(executor.clone(), &registry, &config.status);
    let state = AppState {
        registry,
        executor,
        status: poller.handle(),
    };
    spawn(server::router(state, config.server.body_limit_bytes)).await
}

fn config_for(backend: &str) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.upstream.base_url = format!("{backend}/");
    config.upstream.access_client_id = "client-id".into();
    config.upstream.access_client_secret = "client-secret".into();
    config.upstream.timeout_ms = 2_000;
    config
}

async fn post_json(url: &str, body: Value) -> (StatusCode, Value) {
    let response = reqwest::Client::new().post(url).json(&body).send().await.unwrap();
    let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn test_unknown_webhook_is_404() {
    let gateway = spawn_gateway(config_for("http://127.0.0.1:9")).await;

    let (status, body) = post_json(&format!("{gateway}/api/webhook/unknown-name"), json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Unknown webhook: unknown-name"}));
}

#[tokio::test]
async fn test_empty_summarizer_text_is_rejected() {
    let seen = Seen::default();
    let backend = spawn_backend(
        vec![("summarizer", StatusCode::OK, json!({"output": {"sanitized": "never"}}))],
        seen.clone(),
    )
    .await;
    let gateway = spawn_gateway(config_for(&backend)).await;

    let (status, body) = post_json(&format!("{gateway}/api/webhook/summarizer"), json!({"text": ""})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("Either text or attachments are required"), "{message}");
    assert!(seen.lock().unwrap().is_empty(), "invalid request must not reach the backend");
}

#[tokio::test]
async fn test_summarizer_passthrough_and_credentials() {
    let seen = Seen::default();
    let backend = spawn_backend(
        vec![("summarizer", StatusCode::OK, json!({"output": {"sanitized": "Hi."}}))],
        seen.clone(),
    )
    .await;
    let gateway = spawn_gateway(config_for(&backend)).await;

    let (status, body) = post_json(
        &format!("{gateway}/api/webhook/summarizer"),
        json!({"text": "hello world"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"output": {"sanitized": "Hi."}}));
    assert_eq!(toolhub_normalizer::summary(&body), "Hi.");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (path, headers, forwarded) = &seen[0];
    assert_eq!(path, "summarizer");
    assert_eq!(forwarded, &json!({"text": "hello world"}));
    assert_eq!(headers.get("cf-access-client-id").unwrap(), "client-id");
    assert_eq!(headers.get("cf-access-client-secret").unwrap(), "client-secret");
}

#[tokio::test]
async fn test_idea_generator_response_normalizes() {
    let reply = json!([{"output": [{
        "title": "X",
        "description": "Y",
        "price_point": "$",
        "time_to_make": 30
    }]}]);
    let backend = spawn_backend(vec![("generate_idea", StatusCode::OK, reply)], Seen::default()).await;
    let gateway = spawn_gateway(config_for(&backend)).await;

    let (status, body) = post_json(
        &format!("{gateway}/api/webhook/generate_idea"),
        json!({"context": "crafts", "my_thoughts": "handmade", "quantity": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let ideas = toolhub_normalizer::ideas(&body);
    assert_eq!(ideas.len(), 1);
    assert_eq!(ideas[0].title, "X");
    assert_eq!(ideas[0].time_to_make, 30.0);
}

#[tokio::test]
async fn test_upstream_timeout_is_generic_500() {
    let slow = Router::new().route(
        "/summarizer",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({"output": {"sanitized": "late"}}))
        }),
    );
    let backend = spawn(slow).await;
    let mut config = config_for(&backend);
    config.upstream.timeout_ms = 200;
    let gateway = spawn_gateway(config).await;

    let (status, body) = post_json(
        &format!("{gateway}/api/webhook/summarizer"),
        json!({"text": "hello"}),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Internal server error"}));
}

#[tokio::test]
async fn test_upstream_error_status_is_not_leaked() {
    let backend = spawn_backend(
        vec![("analyzer", StatusCode::BAD_GATEWAY, json!({"message": "workflow crashed at node 7"}))],
        Seen::default(),
    )
    .await;
    let gateway = spawn_gateway(config_for(&backend)).await;

    let (status, body) = post_json(
        &format!("{gateway}/api/webhook/analyzer"),
        json!({"region": "EU", "industry": "retail", "analysis_depth": 3, "keywords": "shoes"}),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Internal server error"}));
}

#[tokio::test]
async fn test_invalid_json_body_is_400() {
    let gateway = spawn_gateway(config_for("http://127.0.0.1:9")).await;

    let response = reqwest::Client::new()
        .post(format!("{gateway}/api/webhook/summarizer"))
        .header("content-type", "application/json")
        .body("{\"text\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"error": "Invalid JSON body"}));
}

#[tokio::test]
async fn test_discovery_lists_builtin_and_configured_webhooks() {
    let mut config = config_for("http://127.0.0.1:9");
    config.webhooks.push(WebhookEntry {
        name: "translate".into(),
        required: vec!["text".into()],
        types: BTreeMap::from([("text".to_string(), FieldKind::String)]),
        timeout_ms: None,
    });
    let gateway = spawn_gateway(config).await;

    let body: Value = reqwest::get(format!("{gateway}/api/webhook"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = body["availableWebhooks"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    for expected in ["summarizer", "generate_idea", "analyzer", "chat-gpt-2", "status", "translate"] {
        assert!(names.contains(&expected), "missing {expected} in {names:?}");
    }
    assert_eq!(
        body["message"],
        "Use POST /api/webhook/[webhookName] to execute a webhook"
    );
}

#[tokio::test]
async fn test_status_reflects_poller() {
    let backend = spawn_backend(
        vec![("status", StatusCode::OK, json!({"code": 201}))],
        Seen::default(),
    )
    .await;
    let config = config_for(&backend);
    let registry = Arc::new(Registry::from_config(&config));
    let executor = Arc::new(Executor::new(Validator::default(), config.upstream.timeout()));
    let poller = StatusPoller::new(executor.clone(), &registry, &config.status);
    let state = AppState {
        registry,
        executor,
        status: poller.handle(),
    };
    let gateway = spawn(server::router(state, config.server.body_limit_bytes)).await;

    let before: Value = reqwest::get(format!("{gateway}/api/status")).await.unwrap().json().await.unwrap();
    assert_eq!(before["state"], "unknown");

    let cancel = CancellationToken::new();
    let task = tokio::spawn(poller.run(cancel.clone()));

    let mut after = Value::Null;
    for _ in 0..50 {
        after = reqwest::get(format!("{gateway}/api/status")).await.unwrap().json().await.unwrap();
        if after["state"] == "connected" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(after["state"], "connected");
    assert_eq!(after["consecutiveFailures"], 0);
    assert!(after["checkedAt"].is_string());

    cancel.cancel();
    task.await.unwrap();
}

#[tokio::test]
async fn test_session_cookie_issue_and_reuse() {
    let gateway = spawn_gateway(config_for("http://127.0.0.1:9")).await;
    let client = reqwest::Client::new();

    let first = client.get(format!("{gateway}/api/session")).send().await.unwrap();
    let cookie = first
        .headers()
        .get("set-cookie")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("chat_uuid="));
    assert!(cookie.contains("Max-Age=43200"));
    let issued: Value = first.json().await.unwrap();
    assert_eq!(issued["issued"], true);
    let uuid = issued["uuid"].as_str().unwrap().to_string();

    let again = client
        .get(format!("{gateway}/api/session"))
        .header("cookie", format!("chat_uuid={uuid}"))
        .send()
        .await
        .unwrap();
    assert!(again.headers().get("set-cookie").is_none());
    let reused: Value = again.json().await.unwrap();
    assert_eq!(reused["uuid"], uuid.as_str());
    assert_eq!(reused["issued"], false);

    let reset: Value = client
        .post(format!("{gateway}/api/session/reset"))
        .header("cookie", format!("chat_uuid={uuid}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reset["issued"], true);
    assert_ne!(reset["uuid"], uuid.as_str());
}
