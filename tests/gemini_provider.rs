//! Runs the Gemini client against a local server that imitates the generateContent API.

use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use tcm_advisor::invoker::{
    ApiKey, GeminiGenerator, GenerationError, GenerationParams, TextGenerator,
};

#[derive(Clone, Default)]
struct Seen {
    requests: Arc<Mutex<Vec<(String, Option<String>, Value)>>>,
}

async fn generate_content(
    State(seen): State<Seen>,
    Path(model_call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let key = headers
        .get("x-goog-api-key")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    seen.requests
        .lock()
        .unwrap()
        .push((model_call.clone(), key.clone(), body.clone()));

    let prompt = body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    match prompt.as_str() {
        "quota" => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({"error": {"code": 429, "message": "quota exceeded", "status": "RESOURCE_EXHAUSTED"}})),
        ),
        "blocked" => (StatusCode::OK, Json(json!({"candidates": []}))),
        _ => (
            StatusCode::OK,
            Json(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "Echo: "}, {"text": prompt}]},
                    "finishReason": "STOP"
                }]
            })),
        ),
    }
}

async fn spawn_fake_gemini() -> (String, Seen) {
    let seen = Seen::default();
    let app = Router::new()
        .route("/v1beta/models/:model_call", post(generate_content))
        .with_state(seen.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://127.0.0.1:{}/v1beta", port), seen)
}

fn key() -> ApiKey {
    ApiKey::new("test-key").unwrap()
}

#[tokio::test]
async fn sends_prompt_and_reads_answer() {
    let (base, seen) = spawn_fake_gemini().await;
    let generator = GeminiGenerator::new(base);

    let text = generator
        .generate(&key(), "gemini-1.5-flash", "What is Qi?", &GenerationParams::default())
        .await
        .unwrap();
    assert_eq!(text, "Echo: What is Qi?");

    let requests = seen.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let (model_call, api_key, body) = &requests[0];
    assert_eq!(model_call, "gemini-1.5-flash:generateContent");
    assert_eq!(api_key.as_deref(), Some("test-key"));
    assert_eq!(body["contents"][0]["role"], "user");
    assert!(body.get("generationConfig").is_none());
}

#[tokio::test]
async fn forwards_generation_params() {
    let (base, seen) = spawn_fake_gemini().await;
    let generator = GeminiGenerator::new(base);
    let params = GenerationParams {
        temperature: Some(0.5),
        max_output_tokens: Some(128),
    };

    generator
        .generate(&key(), "gemini-pro", "hi", &params)
        .await
        .unwrap();

    let requests = seen.requests.lock().unwrap();
    let config = &requests[0].2["generationConfig"];
    assert_eq!(config["maxOutputTokens"], 128);
    assert_eq!(config["temperature"], 0.5);
}

#[tokio::test]
async fn provider_error_message_is_surfaced() {
    let (base, _) = spawn_fake_gemini().await;
    let generator = GeminiGenerator::new(base);

    let err = generator
        .generate(&key(), "gemini-pro", "quota", &GenerationParams::default())
        .await
        .unwrap_err();
    match &err {
        GenerationError::Api { status, message } => {
            assert_eq!(*status, 429);
            assert_eq!(message, "quota exceeded");
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(err.to_string(), "quota exceeded");
}

#[tokio::test]
async fn empty_candidates_are_an_error() {
    let (base, _) = spawn_fake_gemini().await;
    let generator = GeminiGenerator::new(base);

    let err = generator
        .generate(&key(), "gemini-pro", "blocked", &GenerationParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::EmptyResponse));
}

#[tokio::test]
async fn unreachable_provider_is_a_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let generator = GeminiGenerator::new(format!("http://127.0.0.1:{}/v1beta", port));

    let err = generator
        .generate(&key(), "gemini-pro", "hi", &GenerationParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Network(_)));
}
