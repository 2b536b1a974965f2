use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use journey_agent::{
    AgentRequest, AgentRunner, ConversationSummarizer, LeadRecorder, LifecycleStream, TitleGenerator, LEADS_BUCKET,
};
use journey_api::{build_router, AppState, Config};
use journey_persist::{ConversationStore, HashStore, InMemoryConversationStore, InMemoryHashStore};
use journey_types::{ChatMessage, LifecycleEvent};
use serde_json::{json, Map, Value};
use tempfile::TempDir;
use tower::ServiceExt;

struct IdleAgent;

#[async_trait]
impl AgentRunner for IdleAgent {
    async fn stream_events(&self, _request: AgentRequest) -> Result<LifecycleStream> {
        Ok(Box::pin(futures::stream::empty::<Result<LifecycleEvent>>()))
    }
}

struct NoTitle;

#[async_trait]
impl TitleGenerator for NoTitle {
    async fn generate_title(&self, _user_message: &str, _assistant_message: &str) -> Result<String> {
        Ok(String::new())
    }
}

struct NoSummary;

#[async_trait]
impl ConversationSummarizer for NoSummary {
    async fn summarize(&self, _messages: &[ChatMessage]) -> Result<Option<Map<String, Value>>> {
        Ok(None)
    }
}

struct TestApp {
    router: Router,
    conversations: Arc<InMemoryConversationStore>,
    hashes: Arc<InMemoryHashStore>,
    _assets: TempDir,
}

fn test_config(assets_dir: &std::path::Path) -> Config {
    let raw = format!(
        r#"
        [server]
        host = "127.0.0.1"
        port = 0

        [cors]
        enabled = true
        origins = ["*"]

        [llm]
        model = "gpt-4o-mini"

        [chat]
        company_name = "Cloudify"
        chatbot_name = "Journey"
        company_motto = "Your cloud, simplified"

        [paths]
        data_dir = "data"
        assets_dir = {:?}

        [logging]
        level = "info"
        format = "pretty"
        "#,
        assets_dir.display().to_string()
    );
    toml::from_str(&raw).unwrap()
}

fn test_app() -> TestApp {
    let assets = tempfile::tempdir().unwrap();
    std::fs::write(
        assets.path().join("chat.html"),
        "<title>@@@company_name@@@ | @@@chatbot_name@@@</title><p>@@@company_moto@@@</p>",
    )
    .unwrap();
    std::fs::write(assets.path().join("chat.css"), "body { margin: 0; }").unwrap();

    let conversations = Arc::new(InMemoryConversationStore::new());
    let hashes = Arc::new(InMemoryHashStore::new());
    let leads = Arc::new(LeadRecorder::new(
        conversations.clone(),
        Arc::new(NoSummary),
        hashes.clone(),
    ));

    let state = AppState::new(
        test_config(assets.path()),
        conversations.clone(),
        Arc::new(IdleAgent),
        Arc::new(NoTitle),
        leads,
    );

    TestApp {
        router: build_router(Arc::new(state)),
        conversations,
        hashes,
        _assets: assets,
    }
}

async fn get(router: &Router, uri: &str) -> (StatusCode, String) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_health_reports_storage() {
    let app = test_app();

    let (status, body) = get(&app.router, "/health").await;
    assert_eq!(status, StatusCode::OK);

    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["memory"], "connected");
    assert_eq!(body["active_connections"], 0);
}

#[tokio::test]
async fn test_chat_page_fills_placeholders() {
    let app = test_app();

    let (status, body) = get(&app.router, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<title>Cloudify | Journey</title>"));
    assert!(body.contains("Your cloud, simplified"));
    assert!(!body.contains("@@@"));
}

#[tokio::test]
async fn test_missing_page_is_not_found() {
    let app = test_app();

    let (status, body) = get(&app.router, "/leads_generated").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["error"], "Asset not found: leads_generated.html");
}

#[tokio::test]
async fn test_static_assets_are_served() {
    let app = test_app();

    let (status, body) = get(&app.router, "/assets/chat.css").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "body { margin: 0; }");
}

#[tokio::test]
async fn test_unknown_thread_is_not_created_by_lookup() {
    let app = test_app();

    let (status, body) = get(&app.router, "/threads/ghost").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["error"], "Thread not found: ghost");

    assert!(app.conversations.session("ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn test_thread_messages_in_order() {
    let app = test_app();
    app.conversations
        .append("t-1", ChatMessage::human("Do you migrate databases?").with_user("u-1"))
        .await
        .unwrap();
    app.conversations
        .append("t-1", ChatMessage::assistant("Yes, with zero downtime cutovers."))
        .await
        .unwrap();

    let (status, body) = get(&app.router, "/threads/t-1").await;
    assert_eq!(status, StatusCode::OK);
    let thread: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(thread["thread_name"], "New Conversation");
    assert_eq!(thread["message_count"], 2);

    let (status, body) = get(&app.router, "/threads/t-1/messages").await;
    assert_eq!(status, StatusCode::OK);
    let listing: Value = serde_json::from_str(&body).unwrap();
    let messages = listing["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "human");
    assert_eq!(messages[1]["content"], "Yes, with zero downtime cutovers.");
}

#[tokio::test]
async fn test_lead_datalist_lists_stored_leads() {
    let app = test_app();
    app.hashes
        .hset(
            LEADS_BUCKET,
            "Acme_2030-03-04 11:00_Priya Raman",
            json!({ "customer_name": "Ana", "thread_id": "t-1" }).to_string(),
        )
        .await
        .unwrap();

    let (status, body) = get(&app.router, "/get_lead_datalist").await;
    assert_eq!(status, StatusCode::OK);
    let leads: Vec<Value> = serde_json::from_str(&body).unwrap();
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0]["customer_name"], "Ana");
}

#[tokio::test]
async fn test_openapi_document_lists_routes() {
    let app = test_app();

    let (status, body) = get(&app.router, "/api/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    let doc: Value = serde_json::from_str(&body).unwrap();
    assert!(doc["paths"].get("/health").is_some());
    assert!(doc["paths"].get("/threads/{thread_id}/messages").is_some());
}
