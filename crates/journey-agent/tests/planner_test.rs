use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use futures::StreamExt;
use journey_agent::tools::{Scratchpad, StoreConversationDataTool};
use journey_agent::{AgentRequest, AgentRunner, PlannerAgent, PromptContext, ToolRegistry};
use journey_llm::{ChatClient, ChatRequest, ChatResponse, EventStream, StreamEvent};
use journey_types::{last_assistant_content, ChatMessage, EventKind, LLMConfig, LifecycleEvent, RunConfig};

/// Replays one canned stream per model call; the last script repeats.
struct ScriptedClient {
    scripts: Mutex<VecDeque<Vec<StreamEvent>>>,
}

impl ScriptedClient {
    fn new(scripts: Vec<Vec<StreamEvent>>) -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(scripts.into()),
        })
    }
}

#[async_trait]
impl ChatClient for ScriptedClient {
    async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse> {
        anyhow::bail!("not scripted")
    }

    async fn chat_stream(&self, _request: ChatRequest) -> Result<EventStream> {
        let events = {
            let mut scripts = self.scripts.lock().unwrap();
            if scripts.len() > 1 {
                scripts.pop_front().unwrap()
            } else {
                scripts.front().cloned().unwrap_or_default()
            }
        };
        Ok(Box::pin(async_stream::stream! {
            for event in events {
                yield Ok(event);
            }
        }))
    }
}

fn text(content: &str) -> StreamEvent {
    StreamEvent::Message {
        content: content.to_string(),
    }
}

fn tool_call(id: &str, name: &str, arguments: &str) -> StreamEvent {
    StreamEvent::ToolCall {
        index: 0,
        id: Some(id.to_string()),
        name: Some(name.to_string()),
        arguments: Some(arguments.to_string()),
    }
}

fn done() -> StreamEvent {
    StreamEvent::Done {
        finish_reason: Some("stop".to_string()),
    }
}

fn agent(client: Arc<ScriptedClient>, tools: ToolRegistry) -> PlannerAgent {
    PlannerAgent::new(client, Arc::new(tools), LLMConfig::default(), PromptContext::default())
}

async fn collect(agent: &PlannerAgent, request: AgentRequest) -> Vec<Result<LifecycleEvent>> {
    agent.stream_events(request).await.unwrap().collect().await
}

fn request() -> AgentRequest {
    AgentRequest::new(vec![ChatMessage::human("Hi there")], "thread-1", "user-1")
}

#[tokio::test]
async fn test_direct_answer_streams_tokens_then_chain_end() {
    let client = ScriptedClient::new(vec![vec![text("Hel"), text("lo"), done()]]);
    let agent = agent(client, ToolRegistry::new());

    let events: Vec<LifecycleEvent> = collect(&agent, request())
        .await
        .into_iter()
        .map(|e| e.unwrap())
        .collect();

    let kinds: Vec<EventKind> = events.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::StepStart,
            EventKind::TokenChunk,
            EventKind::TokenChunk,
            EventKind::StepEnd,
            EventKind::ChainEnd
        ]
    );

    let chunks: String = events.iter().filter_map(|e| e.token_chunk()).collect();
    assert_eq!(chunks, "Hello");

    let final_messages = events.last().unwrap().output_messages().unwrap();
    assert_eq!(last_assistant_content(final_messages), Some("Hello"));
}

#[tokio::test]
async fn test_tool_round_trip_reports_tool_events() {
    let client = ScriptedClient::new(vec![
        vec![
            tool_call("call-1", "store_conversation_data", r#"{"key":"company","value":"Acme"}"#),
            done(),
        ],
        vec![text("Noted."), done()],
    ]);
    let pad = Arc::new(Scratchpad::new());
    let mut tools = ToolRegistry::new();
    tools.register(StoreConversationDataTool::new(pad.clone()));
    let agent = agent(client, tools);

    let events: Vec<LifecycleEvent> = collect(&agent, request())
        .await
        .into_iter()
        .map(|e| e.unwrap())
        .collect();

    let tool_start = events.iter().find(|e| e.kind == EventKind::ToolStart).unwrap();
    assert_eq!(tool_start.name(), "store_conversation_data");
    assert_eq!(tool_start.run_id, "call-1");
    assert!(tool_start.is_tool_event());
    assert_eq!(tool_start.data.input.as_ref().unwrap()["value"], "Acme");

    let tool_end = events.iter().find(|e| e.kind == EventKind::ToolEnd).unwrap();
    assert_eq!(tool_end.data.output.as_ref().unwrap()["status"], "stored");

    assert_eq!(pad.get("thread-1", "company").await, Some(serde_json::json!("Acme")));

    let final_messages = events.last().unwrap().output_messages().unwrap();
    assert_eq!(last_assistant_content(final_messages), Some("Noted."));
}

#[tokio::test]
async fn test_unknown_tool_does_not_fail_run() {
    let client = ScriptedClient::new(vec![
        vec![tool_call("call-9", "no_such_tool", "{}"), done()],
        vec![text("Sorry about that."), done()],
    ]);
    let agent = agent(client, ToolRegistry::new());

    let events = collect(&agent, request()).await;
    assert!(events.iter().all(|e| e.is_ok()));

    let tool_end = events
        .iter()
        .map(|e| e.as_ref().unwrap())
        .find(|e| e.kind == EventKind::ToolEnd)
        .unwrap();
    assert!(tool_end.data.output.as_ref().unwrap()["error"]
        .as_str()
        .unwrap()
        .contains("not found"));
}

#[tokio::test]
async fn test_recursion_limit_ends_with_error() {
    let client = ScriptedClient::new(vec![vec![
        tool_call("call-loop", "get_conversation_data", "{}"),
        done(),
    ]]);
    let agent = agent(client, ToolRegistry::new());
    let request = request().with_config(RunConfig::default().with_recursion_limit(3));

    let events = collect(&agent, request).await;
    let last = events.last().unwrap();
    assert!(last.as_ref().unwrap_err().to_string().contains("Recursion limit"));
    assert!(events
        .iter()
        .filter_map(|e| e.as_ref().ok())
        .all(|e| e.kind != EventKind::ChainEnd));
}
