use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::client::{ChatClient, ChatOptions, ChatRequest, ChatResponse, EventStream, TokenUsage};
use crate::streaming::parse_sse_stream;
use crate::types::{Message, ToolCall};

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Chat Completions client over plain HTTP.
///
/// Works against any OpenAI-compatible endpoint; point `with_base_url` at a
/// proxy or a local mock server.
pub struct OpenAIClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .context("Invalid API key format")?,
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: OPENAI_API_BASE.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_payload(
        &self,
        model: &str,
        messages: &[Message],
        options: &ChatOptions,
        stream: bool,
    ) -> Result<Value> {
        let mut payload = Map::new();
        payload.insert("model".into(), json!(model));
        payload.insert("messages".into(), serde_json::to_value(messages)?);
        payload.insert("stream".into(), json!(stream));

        if stream {
            payload.insert("stream_options".into(), json!({ "include_usage": true }));
        }
        if let Some(temp) = options.temperature {
            payload.insert("temperature".into(), json!(temp));
        }
        if let Some(max_tokens) = options.max_tokens {
            payload.insert("max_tokens".into(), json!(max_tokens));
        }
        if let Some(tools) = &options.tools {
            payload.insert("tools".into(), serde_json::to_value(tools)?);
        }
        if let Some(tool_choice) = &options.tool_choice {
            payload.insert("tool_choice".into(), serde_json::to_value(tool_choice)?);
        }

        Ok(Value::Object(payload))
    }

    async fn post(&self, payload: &Value) -> Result<reqwest::Response> {
        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .json(payload)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI API error ({}): {}", status, error_text);
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatClient for OpenAIClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let payload = self.build_payload(&request.model, &request.messages, &request.options, false)?;
        let response = self.post(&payload).await?;

        let raw: CompletionResponse = response
            .json()
            .await
            .context("Failed to parse response")?;

        let choice = raw.choices.into_iter().next();
        let (content, tool_calls, finish_reason) = match choice {
            Some(c) => (c.message.content, c.message.tool_calls, c.finish_reason),
            None => (None, None, None),
        };

        Ok(ChatResponse {
            content,
            tool_calls,
            finish_reason,
            usage: raw.usage.map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
        })
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<EventStream> {
        let payload = self.build_payload(&request.model, &request.messages, &request.options, true)?;
        let response = self.post(&payload).await?;

        tracing::debug!(model = %request.model, "Opened chat completion stream");
        Ok(parse_sse_stream(response.bytes_stream()))
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
