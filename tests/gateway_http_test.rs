use async_trait::async_trait;
use std::sync::Arc;
use tokio::time::{Duration, sleep};

use carescout::config::CarescoutConfig;
use carescout::engine::ChatEngine;
use carescout::error::{ChatError, ExtractionError};
use carescout::extractor::FactExtractor;
use carescout::gateway;
use carescout::generation::Generator;
use carescout::index::Document;
use carescout::profile::PartialProfile;
use carescout::retriever::{DocumentRetriever, ScoredDocument};

struct NoFactsExtractor;

#[async_trait]
impl FactExtractor for NoFactsExtractor {
    async fn extract(&self, _message: &str) -> Result<PartialProfile, ExtractionError> {
        Ok(PartialProfile::default())
    }
}

struct OneDocRetriever;

#[async_trait]
impl DocumentRetriever for OneDocRetriever {
    async fn retrieve(&self, _query: &str, _k: usize) -> Result<Vec<ScoredDocument>, ChatError> {
        Ok(vec![ScoredDocument {
            document: Document {
                content: "Domov Sue Ryder, Praha 4, tel. 244 029 111".to_string(),
                source: "sue_ryder.txt".to_string(),
                tag: "domovy".to_string(),
            },
            score: 0.9,
        }])
    }
}

struct UnavailableRetriever;

#[async_trait]
impl DocumentRetriever for UnavailableRetriever {
    async fn retrieve(&self, _query: &str, _k: usize) -> Result<Vec<ScoredDocument>, ChatError> {
        Err(ChatError::IndexUnavailable("index is empty".into()))
    }
}

struct EchoGenerator;

#[async_trait]
impl Generator for EchoGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, ChatError> {
        Ok("Doporučuji Domov Sue Ryder.".to_string())
    }
}

struct FailingGenerator;

#[async_trait]
impl Generator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, ChatError> {
        Err(ChatError::GenerationFailed("upstream 500".into()))
    }
}

fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .expect("bind ephemeral")
        .local_addr()
        .expect("local addr")
        .port()
}

fn loopback_config(port: u16) -> CarescoutConfig {
    let mut config = CarescoutConfig::default();
    config.gateway.bind = "127.0.0.1".to_string();
    config.gateway.port = port;
    config
}

fn healthy_engine() -> ChatEngine {
    ChatEngine::new(
        Arc::new(NoFactsExtractor),
        Arc::new(OneDocRetriever),
        Arc::new(EchoGenerator),
        3,
    )
}

async fn wait_for_health(port: u16) {
    let client = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{port}/health");

    for _ in 0..80 {
        if let Ok(resp) = client.get(&url).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        sleep(Duration::from_millis(50)).await;
    }

    panic!("gateway did not become healthy at {url}");
}

fn spawn_gateway(port: u16, engine: ChatEngine) -> tokio::task::JoinHandle<()> {
    let config = loopback_config(port);
    tokio::spawn(async move {
        let _ = gateway::run(config, engine).await;
    })
}

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let port = free_port();
    let gateway = spawn_gateway(port, healthy_engine());
    wait_for_health(port).await;

    let response = reqwest::get(format!("http://127.0.0.1:{port}/health"))
        .await
        .expect("health response");
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.text().await.expect("health body"), "ok");

    gateway.abort();
    let _ = gateway.await;
}

#[tokio::test]
async fn chat_returns_response_json() {
    let port = free_port();
    let gateway = spawn_gateway(port, healthy_engine());
    wait_for_health(port).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://127.0.0.1:{port}/chat"))
        .json(&serde_json::json!({
            "message": "Potřebuji domov pro seniory v Praze.",
            "history": [],
        }))
        .send()
        .await
        .expect("chat response");

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("chat body");
    assert_eq!(
        body.get("response").and_then(|r| r.as_str()),
        Some("Doporučuji Domov Sue Ryder.")
    );

    gateway.abort();
    let _ = gateway.await;
}

#[tokio::test]
async fn chat_maps_unavailable_index_to_503() {
    let port = free_port();
    let engine = ChatEngine::new(
        Arc::new(NoFactsExtractor),
        Arc::new(UnavailableRetriever),
        Arc::new(EchoGenerator),
        3,
    );
    let gateway = spawn_gateway(port, engine);
    wait_for_health(port).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://127.0.0.1:{port}/chat"))
        .json(&serde_json::json!({ "message": "anything" }))
        .send()
        .await
        .expect("chat response");

    assert_eq!(response.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);
    let body = response.text().await.expect("error body");
    assert!(body.contains("similarity index unavailable"));

    gateway.abort();
    let _ = gateway.await;
}

#[tokio::test]
async fn chat_maps_generation_failure_to_502() {
    let port = free_port();
    let engine = ChatEngine::new(
        Arc::new(NoFactsExtractor),
        Arc::new(OneDocRetriever),
        Arc::new(FailingGenerator),
        3,
    );
    let gateway = spawn_gateway(port, engine);
    wait_for_health(port).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://127.0.0.1:{port}/chat"))
        .json(&serde_json::json!({ "message": "anything" }))
        .send()
        .await
        .expect("chat response");

    assert_eq!(response.status(), reqwest::StatusCode::BAD_GATEWAY);
    let body = response.text().await.expect("error body");
    assert!(body.contains("generation failed"));
    assert!(body.contains("upstream 500"));

    gateway.abort();
    let _ = gateway.await;
}

#[tokio::test]
async fn reset_is_idempotent_and_accepts_empty_body() {
    let port = free_port();
    let gateway = spawn_gateway(port, healthy_engine());
    wait_for_health(port).await;

    let client = reqwest::Client::new();
    for _ in 0..2 {
        let response = client
            .post(format!("http://127.0.0.1:{port}/reset"))
            .send()
            .await
            .expect("reset response");
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: serde_json::Value = response.json().await.expect("reset body");
        assert_eq!(body.get("status").and_then(|s| s.as_str()), Some("facts reset"));
    }

    // Explicit session id works too
    let response = client
        .post(format!("http://127.0.0.1:{port}/reset"))
        .json(&serde_json::json!({ "session_id": "s42" }))
        .send()
        .await
        .expect("reset response");
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    gateway.abort();
    let _ = gateway.await;
}
