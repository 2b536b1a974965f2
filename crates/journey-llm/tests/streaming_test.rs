use futures::{stream, StreamExt};
use journey_llm::{parse_sse_stream, StreamEvent, TokenUsage};

fn body(chunks: &[&str]) -> impl futures::Stream<Item = Result<Vec<u8>, std::io::Error>> {
    stream::iter(
        chunks
            .iter()
            .map(|c| Ok(c.as_bytes().to_vec()))
            .collect::<Vec<_>>(),
    )
}

async fn collect(chunks: &[&str]) -> Vec<anyhow::Result<StreamEvent>> {
    parse_sse_stream(body(chunks)).collect().await
}

#[tokio::test]
async fn test_content_deltas_in_order() {
    let events = collect(&[
        "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"},\"finish_reason\":null}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"lo\"},\"finish_reason\":null}]}\n\n",
        "data: [DONE]\n\n",
    ])
    .await;

    let events: Vec<StreamEvent> = events.into_iter().map(|e| e.unwrap()).collect();
    assert_eq!(
        events,
        vec![
            StreamEvent::Message { content: "Hel".into() },
            StreamEvent::Message { content: "lo".into() },
            StreamEvent::Done { finish_reason: None },
        ]
    );
}

#[tokio::test]
async fn test_line_split_across_chunks() {
    let events = collect(&[
        "data: {\"choices\":[{\"delta\":{\"con",
        "tent\":\"joined\"},\"finish_reason\":null}]}\n",
        "data: [DONE]\n",
    ])
    .await;

    assert!(matches!(
        events[0].as_ref().unwrap(),
        StreamEvent::Message { content } if content == "joined"
    ));
}

#[tokio::test]
async fn test_tool_call_fragments_and_usage() {
    let events = collect(&[
        "data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"id\":\"call_1\",\"function\":{\"name\":\"book_appointment\",\"arguments\":\"\"}}]},\"finish_reason\":null}]}\n",
        "data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"function\":{\"arguments\":\"{}\"}}]},\"finish_reason\":\"tool_calls\"}]}\n",
        "data: {\"choices\":[],\"usage\":{\"prompt_tokens\":5,\"completion_tokens\":2,\"total_tokens\":7}}\n",
    ])
    .await;

    let events: Vec<StreamEvent> = events.into_iter().map(|e| e.unwrap()).collect();
    assert_eq!(events.len(), 4);
    assert!(matches!(
        &events[0],
        StreamEvent::ToolCall { index: 0, id: Some(id), name: Some(name), .. }
            if id == "call_1" && name == "book_appointment"
    ));
    assert!(matches!(
        &events[2],
        StreamEvent::Done { finish_reason: Some(reason) } if reason == "tool_calls"
    ));
    assert_eq!(
        events[3],
        StreamEvent::Usage {
            usage: TokenUsage {
                input_tokens: 5,
                output_tokens: 2,
                total_tokens: 7,
            }
        }
    );
}

#[tokio::test]
async fn test_malformed_chunk_yields_error_and_continues() {
    let events = collect(&[
        "data: {broken\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"ok\"},\"finish_reason\":null}]}\n",
    ])
    .await;

    assert_eq!(events.len(), 2);
    assert!(events[0].is_err());
    assert!(events[1].is_ok());
}

#[tokio::test]
async fn test_comment_and_event_lines_are_ignored() {
    let events = collect(&[": keep-alive\n", "event: ping\n", "data: [DONE]\n"]).await;
    assert_eq!(events.len(), 1);
}
