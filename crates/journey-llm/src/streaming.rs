use std::collections::VecDeque;
use std::fmt::Display;

use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::client::{EventStream, TokenUsage};

/// Decoded delta of a streamed chat completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Message {
        content: String,
    },

    /// Fragment of a tool call; `index` groups fragments of the same call.
    ToolCall {
        index: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        arguments: Option<String>,
    },

    Usage {
        usage: TokenUsage,
    },

    Done {
        #[serde(skip_serializing_if = "Option::is_none")]
        finish_reason: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
struct ChatStreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    usage: Option<ChunkUsage>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: Delta,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Delta {
    content: Option<String>,
    tool_calls: Option<Vec<ToolCallDelta>>,
}

#[derive(Debug, Deserialize)]
struct ToolCallDelta {
    index: u32,
    id: Option<String>,
    function: Option<FunctionDelta>,
}

#[derive(Debug, Deserialize)]
struct FunctionDelta {
    name: Option<String>,
    arguments: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChunkUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

impl ChatStreamChunk {
    fn into_events(self) -> Vec<StreamEvent> {
        let mut events = Vec::new();

        if let Some(choice) = self.choices.into_iter().next() {
            if let Some(content) = choice.delta.content.filter(|c| !c.is_empty()) {
                events.push(StreamEvent::Message { content });
            }

            for call in choice.delta.tool_calls.unwrap_or_default() {
                let (name, arguments) = match call.function {
                    Some(f) => (f.name, f.arguments),
                    None => (None, None),
                };
                events.push(StreamEvent::ToolCall {
                    index: call.index,
                    id: call.id,
                    name,
                    arguments,
                });
            }

            if let Some(finish_reason) = choice.finish_reason {
                events.push(StreamEvent::Done {
                    finish_reason: Some(finish_reason),
                });
            }
        }

        if let Some(usage) = self.usage {
            events.push(StreamEvent::Usage {
                usage: TokenUsage {
                    input_tokens: usage.prompt_tokens,
                    output_tokens: usage.completion_tokens,
                    total_tokens: usage.total_tokens,
                },
            });
        }

        events
    }
}

/// Turn a raw SSE byte stream (`data: {...}` lines) into completion deltas.
///
/// Lines may be split across network chunks; bytes are buffered until a
/// newline arrives. The stream ends at `data: [DONE]` or when the body closes.
pub fn parse_sse_stream<S, B, E>(body: S) -> EventStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut chunks = Box::pin(body);
        let mut buffer: VecDeque<u8> = VecDeque::with_capacity(8192);

        'read: while let Some(chunk) = chunks.next().await {
            let bytes = match chunk {
                Ok(bytes) => bytes,
                Err(e) => {
                    yield Err(anyhow::anyhow!("Stream error: {}", e));
                    break;
                }
            };
            buffer.extend(bytes.as_ref());

            while let Some(newline) = buffer.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=newline).collect();
                let Ok(line) = std::str::from_utf8(&line) else {
                    tracing::warn!("Skipping non UTF-8 SSE line");
                    continue;
                };

                let Some(data) = line.trim().strip_prefix("data:") else {
                    continue;
                };
                let data = data.trim_start();

                if data == "[DONE]" {
                    yield Ok(StreamEvent::Done { finish_reason: None });
                    break 'read;
                }

                match serde_json::from_str::<ChatStreamChunk>(data) {
                    Ok(chunk) => {
                        for event in chunk.into_events() {
                            yield Ok(event);
                        }
                    }
                    Err(e) => yield Err(anyhow::anyhow!("Failed to parse chat chunk: {}", e)),
                }
            }
        }
    })
}
